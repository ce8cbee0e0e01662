use crate::classifier::ReconciledTask;
use crate::code::normalize_task;
use crate::types::TaskStatus;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// SkillTestSet
// ---------------------------------------------------------------------------

/// Accepted spellings of the regulatory skill-test task. Matching tasks always
/// need an actual flight, so phase completion never covers for them.
#[derive(Debug, Clone, Default)]
pub struct SkillTestSet {
    normalized: HashSet<String>,
}

impl SkillTestSet {
    pub fn new<S: AsRef<str>>(spellings: &[S]) -> Self {
        Self {
            normalized: spellings
                .iter()
                .map(|s| normalize_task(Some(s.as_ref())))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, task_name: &str) -> bool {
        self.normalized.contains(&normalize_task(Some(task_name)))
    }
}

// ---------------------------------------------------------------------------
// PhaseSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub phase: String,
    pub sum_planned: f64,
    pub sum_realized: f64,
    pub is_complete: bool,
}

/// Per-phase totals, in order of first appearance. Tasks without a phase are
/// left out.
pub fn summarize(tasks: &[ReconciledTask]) -> Vec<PhaseSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, (f64, f64)> = HashMap::new();
    for t in tasks {
        let Some(phase) = t.task.phase.as_deref() else {
            continue;
        };
        let entry = sums.entry(phase).or_insert_with(|| {
            order.push(phase);
            (0.0, 0.0)
        });
        entry.0 += t.task.planned_duration;
        entry.1 += t.realized_duration;
    }
    order
        .into_iter()
        .map(|phase| {
            let (sum_planned, sum_realized) = sums[phase];
            PhaseSummary {
                phase: phase.to_string(),
                sum_planned,
                sum_realized,
                is_complete: sum_realized - sum_planned >= 0.0,
            }
        })
        .collect()
}

/// Reclassify deficient tasks inside every complete phase to the matching
/// `PhaseComplete_*` status. Skill-test tasks keep their status.
pub fn roll_up(
    mut tasks: Vec<ReconciledTask>,
    skill_tests: &SkillTestSet,
) -> (Vec<ReconciledTask>, Vec<PhaseSummary>) {
    let summaries = summarize(&tasks);
    let complete: HashSet<&str> = summaries
        .iter()
        .filter(|s| s.is_complete)
        .map(|s| s.phase.as_str())
        .collect();

    for t in &mut tasks {
        let in_complete_phase = t
            .task
            .phase
            .as_deref()
            .is_some_and(|p| complete.contains(p));
        if !in_complete_phase || !t.status.is_deficient() {
            continue;
        }
        if skill_tests.contains(&t.task.task_name) {
            tracing::debug!(
                student = %t.task.student_code,
                task = %t.task.task_name,
                "skill test kept out of phase completion"
            );
            continue;
        }
        t.status = if t.realized_duration == 0.0 {
            TaskStatus::PhaseCompleteNoFlight
        } else {
            TaskStatus::PhaseCompleteInsufficientDuration
        };
    }
    (tasks, summaries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlannedTask;

    fn task(
        name: &str,
        phase: Option<&str>,
        planned: f64,
        realized: f64,
        status: TaskStatus,
    ) -> ReconciledTask {
        let mut t = PlannedTask::new("101AB", name, planned);
        t.phase = phase.map(str::to_string);
        ReconciledTask {
            task: t,
            realized_duration: realized,
            difference: realized - planned,
            status,
        }
    }

    fn skill_tests() -> SkillTestSet {
        SkillTestSet::new(&["PPL (A) SKILL TEST", "PPL SKILL TEST"])
    }

    #[test]
    fn summary_sums_per_phase_and_skips_unphased() {
        let tasks = vec![
            task("A", Some("P1"), 1.0, 2.0, TaskStatus::Done),
            task("B", Some("P2"), 3.0, 0.0, TaskStatus::Missing),
            task("C", Some("P1"), 1.0, 0.0, TaskStatus::Missing),
            task("D", None, 5.0, 0.0, TaskStatus::Missing),
        ];
        let s = summarize(&tasks);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].phase, "P1");
        assert_eq!((s[0].sum_planned, s[0].sum_realized), (2.0, 2.0));
        assert!(s[0].is_complete);
        assert_eq!(s[1].phase, "P2");
        assert!(!s[1].is_complete);
    }

    #[test]
    fn complete_phase_absorbs_deficient_tasks() {
        let tasks = vec![
            task("A", Some("P1"), 1.0, 3.0, TaskStatus::Done),
            task("B", Some("P1"), 1.0, 0.0, TaskStatus::Missing),
            task("C", Some("P1"), 1.0, 0.5, TaskStatus::InsufficientDuration),
            task("D", Some("P1"), 0.0, 0.0, TaskStatus::TheoryOnly),
        ];
        let (out, _) = roll_up(tasks, &skill_tests());
        let labels: Vec<_> = out.iter().map(|t| t.status.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Done",
                "PhaseComplete_NoFlight",
                "PhaseComplete_InsufficientDuration",
                "TheoryOnly"
            ]
        );
    }

    #[test]
    fn pending_behind_is_absorbed_too() {
        let tasks = vec![
            task("A", Some("P1"), 1.0, 2.0, TaskStatus::Done),
            task("B", Some("P1"), 1.0, 0.0, TaskStatus::PendingBehind),
        ];
        let (out, _) = roll_up(tasks, &skill_tests());
        assert_eq!(out[1].status, TaskStatus::PhaseCompleteNoFlight);
    }

    #[test]
    fn incomplete_phase_and_unphased_tasks_are_untouched() {
        let tasks = vec![
            task("A", Some("P1"), 2.0, 1.0, TaskStatus::Done),
            task("B", Some("P1"), 1.0, 0.0, TaskStatus::Missing),
            task("C", None, 1.0, 0.0, TaskStatus::Missing),
        ];
        let (out, summaries) = roll_up(tasks, &skill_tests());
        assert!(!summaries[0].is_complete);
        assert_eq!(out[1].status, TaskStatus::Missing);
        assert_eq!(out[2].status, TaskStatus::Missing);
    }

    #[test]
    fn skill_test_is_never_promoted() {
        let tasks = vec![
            task("SE-1", Some("PPL"), 1.0, 10.0, TaskStatus::Done),
            task("ppl (a) skill-test", Some("PPL"), 1.5, 0.0, TaskStatus::Missing),
            task("PPL SKILL TEST", Some("PPL"), 1.5, 0.7, TaskStatus::InsufficientDuration),
        ];
        let (out, summaries) = roll_up(tasks, &skill_tests());
        assert!(summaries[0].is_complete);
        assert_eq!(out[1].status, TaskStatus::Missing);
        assert_eq!(out[2].status, TaskStatus::InsufficientDuration);
    }
}
