use crate::classifier::ReconciledTask;
use crate::flight_log::ExpandedLogRecord;
use crate::milestone::MilestoneOutcome;
use crate::phase::PhaseSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub sum_planned: f64,
    pub sum_realized: f64,
    pub sum_difference: f64,
}

impl Totals {
    pub fn of(tasks: &[ReconciledTask]) -> Self {
        tasks.iter().fold(Totals::default(), |acc, t| Totals {
            sum_planned: acc.sum_planned + t.task.planned_duration,
            sum_realized: acc.sum_realized + t.realized_duration,
            sum_difference: acc.sum_difference + t.difference,
        })
    }
}

/// Everything the engine decided for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentReport {
    pub student_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_type: Option<String>,
    pub tasks: Vec<ReconciledTask>,
    pub phases: Vec<PhaseSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<MilestoneOutcome>,
    pub totals: Totals,
    /// Status label -> task count.
    pub status_counts: BTreeMap<String, usize>,
    /// Flights credited to no planned task.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmatched_flights: Vec<ExpandedLogRecord>,
}

impl StudentReport {
    pub fn new(
        student_code: impl Into<String>,
        program_type: Option<String>,
        tasks: Vec<ReconciledTask>,
        phases: Vec<PhaseSummary>,
        milestones: Vec<MilestoneOutcome>,
        unmatched_flights: Vec<ExpandedLogRecord>,
    ) -> Self {
        let mut status_counts = BTreeMap::new();
        for t in &tasks {
            *status_counts.entry(t.status.as_str().to_string()).or_insert(0) += 1;
        }
        Self {
            student_code: student_code.into(),
            program_type,
            totals: Totals::of(&tasks),
            tasks,
            phases,
            milestones,
            status_counts,
            unmatched_flights,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.status.is_complete()).count()
    }

    /// Human-readable summary: "12/20 covered, 3 missing, 1 pending"
    pub fn summarize(&self) -> String {
        let count = |label: &str| self.status_counts.get(label).copied().unwrap_or(0);
        format!(
            "{}/{} covered, {} missing, {} pending",
            self.completed_count(),
            self.tasks.len(),
            count("Missing"),
            count("PendingBehind"),
        )
    }
}
