use crate::error::Result;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting config and report files.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a list of records from a `.json` file, or YAML for any other
/// extension.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let data = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return Ok(serde_json::from_str(&data)?);
    }
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Rec {
        name: String,
    }

    #[test]
    fn atomic_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.json");
        atomic_write(&path, b"[]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn read_records_by_extension() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("r.json");
        let yaml = dir.path().join("r.yaml");
        std::fs::write(&json, r#"[{"name": "a"}]"#).unwrap();
        std::fs::write(&yaml, "- name: b\n").unwrap();
        let a: Vec<Rec> = read_records(&json).unwrap();
        let b: Vec<Rec> = read_records(&yaml).unwrap();
        assert_eq!(a, vec![Rec { name: "a".into() }]);
        assert_eq!(b, vec![Rec { name: "b".into() }]);
    }

    #[test]
    fn empty_yaml_is_an_empty_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.yaml");
        std::fs::write(&path, "").unwrap();
        let recs: Vec<Rec> = read_records(&path).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let res: Result<Vec<Rec>> = read_records(&dir.path().join("nope.yaml"));
        assert!(res.is_err());
    }
}
