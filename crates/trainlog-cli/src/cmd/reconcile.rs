use super::Inputs;
use crate::output::{hours, print_json, print_table, write_json};
use anyhow::Context;
use std::path::Path;
use trainlog_core::report::StudentReport;

pub fn run(
    root: &Path,
    inputs: Inputs,
    students: &[String],
    out: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let loaded = inputs.load(root)?;
    let selected: Vec<String> = if students.is_empty() {
        loaded.plan.students().to_vec()
    } else {
        students.to_vec()
    };

    let reports = loaded
        .reconciler
        .reconcile_batch(&loaded.plan, &loaded.index, &selected, loaded.execution)
        .context("reconciliation failed")?;

    if let Some(path) = out {
        write_json(path, &reports)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    if json {
        return print_json(&reports);
    }

    if reports.is_empty() {
        println!("No students in the training plan.");
        return Ok(());
    }
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_report(report);
    }
    Ok(())
}

fn print_report(report: &StudentReport) {
    let program = report.program_type.as_deref().unwrap_or("unknown program");
    println!(
        "Student {} ({program}): {}",
        report.student_code,
        report.summarize()
    );
    println!();

    let rows: Vec<Vec<String>> = report
        .tasks
        .iter()
        .map(|t| {
            vec![
                t.task.task_name.clone(),
                t.task.category.to_string(),
                t.task.phase.clone().unwrap_or_else(|| "-".to_string()),
                t.task
                    .scheduled_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                hours(t.task.planned_duration),
                hours(t.realized_duration),
                hours(t.difference),
                t.status.to_string(),
            ]
        })
        .collect();
    print_table(
        &[
            "TASK", "CATEGORY", "PHASE", "DATE", "PLANNED", "REALIZED", "DIFF", "STATUS",
        ],
        &["PLANNED", "REALIZED", "DIFF"],
        rows,
    );

    if !report.phases.is_empty() {
        println!();
        let rows = report
            .phases
            .iter()
            .map(|p| {
                vec![
                    p.phase.clone(),
                    hours(p.sum_planned),
                    hours(p.sum_realized),
                    if p.is_complete { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        print_table(
            &["PHASE", "PLANNED", "REALIZED", "COMPLETE"],
            &["PLANNED", "REALIZED"],
            rows,
        );
    }

    let reached: Vec<&str> = report
        .milestones
        .iter()
        .filter(|m| m.reached)
        .map(|m| m.rule.as_str())
        .collect();
    if !reached.is_empty() {
        println!();
        println!("Milestones reached: {}", reached.join(", "));
    }

    if !report.unmatched_flights.is_empty() {
        println!();
        println!(
            "{} flight(s) credited no planned task:",
            report.unmatched_flights.len()
        );
        for f in &report.unmatched_flights {
            let date = f
                .flight_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  {date}  {}  {}", f.task_name, hours(f.block_duration));
        }
    }

    println!();
    println!(
        "Totals: planned {}  realized {}  difference {}",
        hours(report.totals.sum_planned),
        hours(report.totals.sum_realized),
        hours(report.totals.sum_difference),
    );
}
