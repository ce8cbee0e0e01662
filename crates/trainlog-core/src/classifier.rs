use crate::matcher::TaskMatch;
use crate::plan::PlannedTask;
use crate::types::{TaskCategory, TaskStatus};
use serde::{Deserialize, Serialize};

/// Number of following non-PIC tasks inspected by the look-ahead pass.
pub const LOOKAHEAD_WINDOW: usize = 9;
/// `Done` tasks required inside the window to treat a gap as skipped-ahead.
pub const LOOKAHEAD_DONE_THRESHOLD: usize = 3;

// ---------------------------------------------------------------------------
// ReconciledTask (output)
// ---------------------------------------------------------------------------

/// A planned task decorated with its realized duration and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledTask {
    #[serde(flatten)]
    pub task: PlannedTask,
    pub realized_duration: f64,
    pub difference: f64,
    pub status: TaskStatus,
}

impl ReconciledTask {
    pub fn is_pic(&self) -> bool {
        self.task.category == TaskCategory::Pic
    }
}

// ---------------------------------------------------------------------------
// StatusRule
// ---------------------------------------------------------------------------

/// A fn-pointer rule; the first matching rule decides the first-pass status.
pub struct StatusRule {
    pub id: &'static str,
    pub condition: fn(&TaskMatch) -> bool,
    pub status: TaskStatus,
}

fn is_pic(m: &TaskMatch) -> bool {
    m.task.category == TaskCategory::Pic
}

/// First-pass rules, priority-ordered.
pub fn default_rules() -> Vec<StatusRule> {
    vec![
        StatusRule {
            id: "pic_flown",
            condition: |m| is_pic(m) && m.realized_duration > 0.0,
            status: TaskStatus::PicTask,
        },
        StatusRule {
            id: "pic_not_flown",
            condition: is_pic,
            status: TaskStatus::Missing,
        },
        StatusRule {
            id: "theory_only",
            condition: |m| m.task.planned_duration == 0.0,
            status: TaskStatus::TheoryOnly,
        },
        StatusRule {
            id: "done",
            condition: |m| m.difference() >= 0.0,
            status: TaskStatus::Done,
        },
        StatusRule {
            id: "insufficient_duration",
            condition: |m| m.task.planned_duration != 0.0 && m.realized_duration != 0.0,
            status: TaskStatus::InsufficientDuration,
        },
    ]
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier {
    rules: Vec<StatusRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    pub fn new(rules: Vec<StatusRule>) -> Self {
        Self { rules }
    }

    /// Status of a single task, independent of its neighbours.
    pub fn first_pass(&self, m: &TaskMatch) -> TaskStatus {
        self.rules
            .iter()
            .find(|rule| (rule.condition)(m))
            .map(|rule| {
                tracing::trace!(task = %m.task.task_name, rule = rule.id, "status rule matched");
                rule.status.clone()
            })
            .unwrap_or(TaskStatus::Missing)
    }

    /// Classify every task (input in plan order) and apply the look-ahead
    /// correction.
    pub fn classify(&self, matches: Vec<TaskMatch>) -> Vec<ReconciledTask> {
        let mut tasks: Vec<ReconciledTask> = matches
            .into_iter()
            .map(|m| {
                let status = self.first_pass(&m);
                ReconciledTask {
                    difference: m.difference(),
                    realized_duration: m.realized_duration,
                    task: m.task,
                    status,
                }
            })
            .collect();
        look_ahead(&mut tasks);
        tasks
    }
}

/// Reclassify unflown `Missing` non-PIC tasks to `PendingBehind` when enough
/// of the following non-PIC tasks are already `Done`.
fn look_ahead(tasks: &mut [ReconciledTask]) {
    let normal: Vec<usize> = (0..tasks.len()).filter(|&i| !tasks[i].is_pic()).collect();
    for (pos, &i) in normal.iter().enumerate() {
        let t = &tasks[i];
        if t.status != TaskStatus::Missing || t.realized_duration != 0.0 {
            continue;
        }
        let done_ahead = normal[pos + 1..]
            .iter()
            .take(LOOKAHEAD_WINDOW)
            .filter(|&&j| tasks[j].status == TaskStatus::Done)
            .count();
        if done_ahead >= LOOKAHEAD_DONE_THRESHOLD {
            tasks[i].status = TaskStatus::PendingBehind;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
