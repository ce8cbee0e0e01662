use super::Inputs;
use crate::output::{hours, print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, inputs: Inputs, json: bool) -> anyhow::Result<()> {
    let loaded = inputs.load(root)?;
    let reports = loaded
        .reconciler
        .reconcile_all(&loaded.plan, &loaded.index, loaded.execution);

    if json {
        let rows: Vec<_> = reports
            .iter()
            .map(|r| {
                serde_json::json!({
                    "student_code": r.student_code,
                    "program_type": r.program_type,
                    "totals": r.totals,
                    "status_counts": r.status_counts,
                    "completed": r.completed_count(),
                    "tasks": r.tasks.len(),
                })
            })
            .collect();
        return print_json(&rows);
    }

    if reports.is_empty() {
        println!("No students in the training plan.");
        return Ok(());
    }

    let rows = reports
        .iter()
        .map(|r| {
            vec![
                r.student_code.clone(),
                r.program_type.clone().unwrap_or_else(|| "-".to_string()),
                hours(r.totals.sum_planned),
                hours(r.totals.sum_realized),
                hours(r.totals.sum_difference),
                format!("{}/{}", r.completed_count(), r.tasks.len()),
                r.summarize(),
            ]
        })
        .collect();
    print_table(
        &[
            "STUDENT", "PROGRAM", "PLANNED", "REALIZED", "DIFF", "COVERED", "SUMMARY",
        ],
        &["PLANNED", "REALIZED", "DIFF", "COVERED"],
        rows,
    );
    Ok(())
}
