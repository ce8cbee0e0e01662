use anyhow::Context;
use std::path::Path;
use trainlog_core::{config::Config, paths};

pub fn run(root: &Path, school: Option<&str>) -> anyhow::Result<()> {
    let path = paths::config_path(root);
    if path.exists() {
        println!("Config already exists at {}; left unchanged.", path.display());
        return Ok(());
    }

    let config = match school {
        Some(name) => Config::new(name),
        None => Config::default(),
    };
    config
        .save(root)
        .with_context(|| format!("failed to write {}", path.display()))?;
    std::fs::create_dir_all(paths::reports_dir(root))
        .context("failed to create reports directory")?;

    println!("Initialized trainlog in {}", paths::trainlog_dir(root).display());
    Ok(())
}
