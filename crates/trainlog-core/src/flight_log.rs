use crate::code::normalize_log_code;
use crate::duration::parse_duration;
use crate::error::{Result, TrainlogError};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

const MCC_PREFIX: &str = "MCC";

// ---------------------------------------------------------------------------
// FlightLogRecord (input)
// ---------------------------------------------------------------------------

/// A raw flight-log row. `pilot_field` may name one student or, on MCC
/// flights, a whole crew.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightLogRecord {
    #[serde(default)]
    pub pilot_field: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub flight_date: Option<NaiveDate>,
    /// `"H:MM[:SS]"`
    #[serde(default)]
    pub block_duration: Option<String>,
}

impl FlightLogRecord {
    pub fn is_mcc(&self) -> bool {
        self.task_name
            .as_deref()
            .is_some_and(|name| name.to_ascii_uppercase().starts_with(MCC_PREFIX))
    }
}

// ---------------------------------------------------------------------------
// ExpandedLogRecord
// ---------------------------------------------------------------------------

/// One flight-log row narrowed to exactly one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedLogRecord {
    pub student_code: String,
    pub task_name: String,
    pub flight_date: Option<NaiveDate>,
    /// Hours.
    pub block_duration: f64,
}

static CREW_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn crew_code_re() -> &'static Regex {
    CREW_CODE_RE.get_or_init(|| Regex::new(r"\d{3}[A-Za-z]{2}").unwrap())
}

/// Split raw records into per-student rows.
///
/// MCC flights credit the full block time to every crew code found in the
/// pilot field; all other flights yield exactly one row.
pub fn expand(records: &[FlightLogRecord]) -> Vec<ExpandedLogRecord> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let task_name = record.task_name.clone().unwrap_or_default();
        let block_duration = parse_duration(record.block_duration.as_deref());
        if record.is_mcc() {
            let pilots = record.pilot_field.as_deref().unwrap_or_default();
            for code in crew_code_re().find_iter(pilots) {
                out.push(ExpandedLogRecord {
                    student_code: code.as_str().to_string(),
                    task_name: task_name.clone(),
                    flight_date: record.flight_date,
                    block_duration,
                });
            }
        } else {
            out.push(ExpandedLogRecord {
                student_code: normalize_log_code(record.pilot_field.as_deref()),
                task_name,
                flight_date: record.flight_date,
                block_duration,
            });
        }
    }
    out
}

// ---------------------------------------------------------------------------
// FlightLogIndex
// ---------------------------------------------------------------------------

/// The expanded flight log, partitioned by student code. Built once per batch
/// and shared read-only across every student's reconciliation.
#[derive(Debug, Clone, Default)]
pub struct FlightLogIndex {
    by_student: HashMap<String, Vec<ExpandedLogRecord>>,
    raw_count: usize,
    expanded_count: usize,
}

impl FlightLogIndex {
    pub fn build(records: &[FlightLogRecord]) -> Self {
        Self::from_expanded(records.len(), expand(records))
    }

    fn from_expanded(raw_count: usize, expanded: Vec<ExpandedLogRecord>) -> Self {
        let expanded_count = expanded.len();
        let mut by_student: HashMap<String, Vec<ExpandedLogRecord>> = HashMap::new();
        for rec in expanded {
            by_student.entry(rec.student_code.clone()).or_default().push(rec);
        }
        tracing::debug!(
            raw = raw_count,
            expanded = expanded_count,
            students = by_student.len(),
            "flight log indexed"
        );
        Self {
            by_student,
            raw_count,
            expanded_count,
        }
    }

    /// Read and expand the flight-log dataset. An unreadable dataset is a hard
    /// failure; a readable but empty one is a valid, empty index.
    pub fn load(path: &Path) -> Result<Self> {
        let records: Vec<FlightLogRecord> =
            crate::io::read_records(path).map_err(|e| TrainlogError::FlightLogUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::build(&records))
    }

    /// Rows credited to `student_code`. Empty codes never match.
    pub fn for_student(&self, student_code: &str) -> &[ExpandedLogRecord] {
        if student_code.is_empty() {
            return &[];
        }
        self.by_student
            .get(student_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn raw_count(&self) -> usize {
        self.raw_count
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded_count
    }

    pub fn is_empty(&self) -> bool {
        self.expanded_count == 0
    }

    /// All expanded rows, grouped by student code in sorted code order.
    pub fn iter(&self) -> impl Iterator<Item = &ExpandedLogRecord> {
        let mut codes: Vec<&String> = self.by_student.keys().collect();
        codes.sort();
        codes
            .into_iter()
            .flat_map(move |code| self.by_student[code].iter())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rec(pilot: &str, task: &str, block: &str) -> FlightLogRecord {
        FlightLogRecord {
            pilot_field: Some(pilot.to_string()),
            task_name: Some(task.to_string()),
            flight_date: NaiveDate::from_ymd_opt(2025, 4, 1),
            block_duration: Some(block.to_string()),
        }
    }

    #[test]
    fn mcc_record_credits_every_crew_member_in_full() {
        let out = expand(&[rec("101AB 102CD", "MCC-3", "2:30")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].student_code, "101AB");
        assert_eq!(out[1].student_code, "102CD");
        for r in &out {
            assert_eq!(r.block_duration, 2.5);
            assert_eq!(r.task_name, "MCC-3");
        }
    }

    #[test]
    fn mcc_prefix_is_case_insensitive() {
        let out = expand(&[rec("Capt 305XY / FO 306ZZ", "mcc sim 1", "1:00")]);
        let codes: Vec<_> = out.iter().map(|r| r.student_code.as_str()).collect();
        assert_eq!(codes, vec!["305XY", "306ZZ"]);
    }

    #[test]
    fn mcc_record_without_codes_yields_nothing() {
        assert!(expand(&[rec("INSTRUCTOR ONLY", "MCC-1", "1:00")]).is_empty());
    }

    #[test]
    fn regular_record_yields_one_row() {
        let out = expand(&[rec("101AB-JANE DOE-C172", "SE-4", "1:15")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].student_code, "101AB");
        assert_eq!(out[0].block_duration, 1.25);
    }

    #[test]
    fn index_groups_by_student() {
        let idx = FlightLogIndex::build(&[
            rec("101AB-X", "SE-1", "1:00"),
            rec("101AB 202CD", "MCC-1", "2:00"),
            rec("202CD-Y", "SE-1", "1:00"),
        ]);
        assert_eq!(idx.raw_count(), 3);
        assert_eq!(idx.expanded_count(), 4);
        assert_eq!(idx.for_student("101AB").len(), 2);
        assert_eq!(idx.for_student("202CD").len(), 2);
        assert!(idx.for_student("999ZZ").is_empty());
        assert!(idx.for_student("").is_empty());
        assert_eq!(idx.iter().count(), 4);
    }

    #[test]
    fn load_missing_dataset_is_hard_failure() {
        let dir = TempDir::new().unwrap();
        let err = FlightLogIndex::load(&dir.path().join("log.yaml")).unwrap_err();
        assert!(matches!(err, TrainlogError::FlightLogUnavailable { .. }));
    }

    #[test]
    fn load_empty_dataset_is_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, "[]").unwrap();
        let idx = FlightLogIndex::load(&path).unwrap();
        assert!(idx.is_empty());
    }
}
