use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// TaskCategory
// ---------------------------------------------------------------------------

/// Matching discipline for a planned task. PIC tasks are credited by
/// chronological position, everything else by exact task name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskCategory {
    #[serde(rename = "PIC")]
    Pic,
    #[serde(rename = "normal")]
    Normal,
}

impl TaskCategory {
    /// Derive the category from a raw task name (`PIC`, case-insensitive).
    pub fn of(task_name: &str) -> Self {
        if contains_pic(task_name) {
            TaskCategory::Pic
        } else {
            TaskCategory::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskCategory::Pic => "PIC",
            TaskCategory::Normal => "normal",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn contains_pic(task_name: &str) -> bool {
    task_name.to_ascii_uppercase().contains("PIC")
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Closed status taxonomy. `as_str` is the single point producing the labels
/// downstream reports match on; they must not change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    PicTask,
    TheoryOnly,
    Done,
    InsufficientDuration,
    Missing,
    PendingBehind,
    PhaseCompleteNoFlight,
    PhaseCompleteInsufficientDuration,
    /// Bulk completion label assigned by a milestone rule.
    Milestone(String),
}

impl TaskStatus {
    pub fn fixed() -> &'static [TaskStatus] {
        &[
            TaskStatus::PicTask,
            TaskStatus::TheoryOnly,
            TaskStatus::Done,
            TaskStatus::InsufficientDuration,
            TaskStatus::Missing,
            TaskStatus::PendingBehind,
            TaskStatus::PhaseCompleteNoFlight,
            TaskStatus::PhaseCompleteInsufficientDuration,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::PicTask => "PIC_Task",
            TaskStatus::TheoryOnly => "TheoryOnly",
            TaskStatus::Done => "Done",
            TaskStatus::InsufficientDuration => "InsufficientDuration",
            TaskStatus::Missing => "Missing",
            TaskStatus::PendingBehind => "PendingBehind",
            TaskStatus::PhaseCompleteNoFlight => "PhaseComplete_NoFlight",
            TaskStatus::PhaseCompleteInsufficientDuration => "PhaseComplete_InsufficientDuration",
            TaskStatus::Milestone(label) => label,
        }
    }

    /// Statuses a completed phase is allowed to absorb.
    pub fn is_deficient(&self) -> bool {
        matches!(
            self,
            TaskStatus::InsufficientDuration | TaskStatus::Missing | TaskStatus::PendingBehind
        )
    }

    /// Statuses a satisfied milestone is allowed to absorb.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, TaskStatus::Missing | TaskStatus::PendingBehind)
    }

    /// True for every status that counts the task as covered.
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            TaskStatus::PicTask
                | TaskStatus::TheoryOnly
                | TaskStatus::Done
                | TaskStatus::PhaseCompleteNoFlight
                | TaskStatus::PhaseCompleteInsufficientDuration
                | TaskStatus::Milestone(_)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = std::convert::Infallible;

    /// Any label outside the fixed taxonomy is a milestone label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TaskStatus::fixed()
            .iter()
            .find(|status| status.as_str() == s)
            .cloned()
            .unwrap_or_else(|| TaskStatus::Milestone(s.to_string())))
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.parse() {
            Ok(status) => Ok(status),
            Err(never) => match never {},
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
