use crate::output::{hours, print_json, print_table};
use anyhow::Context;
use std::path::Path;
use trainlog_core::flight_log::{ExpandedLogRecord, FlightLogIndex};

pub fn run(log: &Path, student: Option<&str>, json: bool) -> anyhow::Result<()> {
    let index = FlightLogIndex::load(log).context("failed to load flight log")?;
    let rows: Vec<&ExpandedLogRecord> = match student {
        Some(code) => index.for_student(code).iter().collect(),
        None => index.iter().collect(),
    };

    if json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("No flight-log rows.");
        return Ok(());
    }
    let table = rows
        .iter()
        .map(|r| {
            vec![
                r.student_code.clone(),
                r.flight_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                r.task_name.clone(),
                hours(r.block_duration),
            ]
        })
        .collect();
    print_table(&["STUDENT", "DATE", "TASK", "BLOCK"], &["BLOCK"], table);
    println!();
    println!(
        "{} log record(s) expanded to {} row(s).",
        index.raw_count(),
        index.expanded_count()
    );
    Ok(())
}
