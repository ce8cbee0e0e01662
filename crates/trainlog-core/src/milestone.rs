//! Task-group completion thresholds.
//!
//! A milestone rule sums realized time over a named group of tasks (matched
//! by normalized task name). Once the sum clears the threshold, every task in
//! the group still `Missing` or `PendingBehind` takes the rule's label.
//! Rules run in table order. A task already carrying a milestone label is
//! eligible again, so on overlapping groups the last satisfied rule wins.

use crate::classifier::ReconciledTask;
use crate::code::normalize_task;
use crate::types::TaskStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// MilestoneRule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRule {
    pub id: String,
    /// `None` applies to every program type, including unknown ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_types: Option<Vec<String>>,
    pub task_group: Vec<String>,
    pub threshold_hours: f64,
    pub result_label: String,
}

impl MilestoneRule {
    pub fn applies_to(&self, program_type: Option<&str>) -> bool {
        let Some(allowed) = &self.program_types else {
            return true;
        };
        let Some(pt) = program_type.map(str::trim) else {
            return false;
        };
        allowed.iter().any(|a| a.trim().eq_ignore_ascii_case(pt))
    }

    /// Normalized task codes of the group.
    pub fn group(&self) -> HashSet<String> {
        self.task_group
            .iter()
            .map(|t| normalize_task(Some(t)))
            .collect()
    }
}

fn numbered(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}-{i:02}")).collect()
}

/// Built-in rule table, in evaluation order.
pub fn default_rules() -> Vec<MilestoneRule> {
    vec![
        MilestoneRule {
            id: "mpl_basic".to_string(),
            program_types: Some(vec!["MPL".to_string()]),
            task_group: numbered("MPL BASIC", 9),
            threshold_hours: 14.5,
            result_label: "MPL_Basic_Complete".to_string(),
        },
        MilestoneRule {
            id: "entegre_cpl".to_string(),
            program_types: Some(vec!["ENTEGRE".to_string()]),
            task_group: numbered("CPL", 15),
            threshold_hours: 30.0,
            result_label: "CPL_Block_Complete".to_string(),
        },
        MilestoneRule {
            id: "entegre_ir".to_string(),
            program_types: Some(vec!["ENTEGRE".to_string()]),
            task_group: numbered("IR", 20),
            threshold_hours: 33.5,
            result_label: "IR_Block_Complete".to_string(),
        },
        MilestoneRule {
            id: "nav_block".to_string(),
            program_types: None,
            task_group: numbered("NAV", 14),
            threshold_hours: 20.0,
            result_label: "NAV_Block_Complete".to_string(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneOutcome {
    pub rule: String,
    pub realized_hours: f64,
    pub threshold_hours: f64,
    pub reached: bool,
    pub reclassified: usize,
}

pub fn apply(
    mut tasks: Vec<ReconciledTask>,
    rules: &[MilestoneRule],
    program_type: Option<&str>,
) -> (Vec<ReconciledTask>, Vec<MilestoneOutcome>) {
    let mut outcomes = Vec::new();
    for rule in rules.iter().filter(|r| r.applies_to(program_type)) {
        let group = rule.group();
        let in_group: Vec<usize> = tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| group.contains(&normalize_task(Some(&t.task.task_name))))
            .map(|(i, _)| i)
            .collect();
        let realized_hours: f64 = in_group.iter().map(|&i| tasks[i].realized_duration).sum();
        let reached = realized_hours >= rule.threshold_hours;

        let mut reclassified = 0;
        if reached {
            for &i in &in_group {
                if relabelable(&tasks[i].status) {
                    tasks[i].status = TaskStatus::Milestone(rule.result_label.clone());
                    reclassified += 1;
                }
            }
        }
        if reclassified > 0 {
            tracing::debug!(rule = %rule.id, reclassified, "milestone reached");
        }
        outcomes.push(MilestoneOutcome {
            rule: rule.id.clone(),
            realized_hours,
            threshold_hours: rule.threshold_hours,
            reached,
            reclassified,
        });
    }
    (tasks, outcomes)
}

fn relabelable(status: &TaskStatus) -> bool {
    status.is_outstanding() || matches!(status, TaskStatus::Milestone(_))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
