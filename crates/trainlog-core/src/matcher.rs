//! Realized-duration matching for one student.
//!
//! Two disciplines coexist:
//! - PIC tasks are credited positionally: the i-th planned PIC task (plan
//!   order) receives the block time of the i-th PIC flight (date order).
//! - Every other task is credited the sum of block times of flights whose
//!   raw task name equals the planned raw task name exactly.

use crate::flight_log::ExpandedLogRecord;
use crate::plan::PlannedTask;
use crate::types::{contains_pic, TaskCategory};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMatch {
    pub task: PlannedTask,
    /// Hours.
    pub realized_duration: f64,
}

impl TaskMatch {
    pub fn difference(&self) -> f64 {
        self.realized_duration - self.task.planned_duration
    }
}

/// PIC flights in chronological order, undated flights last.
fn pic_flights(logs: &[ExpandedLogRecord]) -> Vec<&ExpandedLogRecord> {
    let mut flights: Vec<&ExpandedLogRecord> =
        logs.iter().filter(|r| contains_pic(&r.task_name)).collect();
    flights.sort_by_key(|r| (r.flight_date.is_none(), r.flight_date));
    flights
}

fn block_time_by_name(logs: &[ExpandedLogRecord]) -> HashMap<&str, f64> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for r in logs.iter().filter(|r| !r.task_name.is_empty()) {
        *sums.entry(r.task_name.as_str()).or_default() += r.block_duration;
    }
    sums
}

/// Compute realized duration for every planned task. `tasks` must already be
/// in plan order; the output keeps that order.
pub fn match_tasks(tasks: &[PlannedTask], logs: &[ExpandedLogRecord]) -> Vec<TaskMatch> {
    let mut pic = pic_flights(logs).into_iter();
    let by_name = block_time_by_name(logs);

    tasks
        .iter()
        .map(|task| {
            let realized_duration = match task.category {
                TaskCategory::Pic => pic.next().map(|r| r.block_duration).unwrap_or(0.0),
                TaskCategory::Normal => by_name
                    .get(task.task_name.as_str())
                    .copied()
                    .unwrap_or(0.0),
            };
            TaskMatch {
                task: task.clone(),
                realized_duration,
            }
        })
        .collect()
}

/// Flights that credited no planned task: surplus PIC flights and flights
/// whose name matches no planned non-PIC task.
pub fn unmatched_flights(
    tasks: &[PlannedTask],
    logs: &[ExpandedLogRecord],
) -> Vec<ExpandedLogRecord> {
    let planned_pic = tasks
        .iter()
        .filter(|t| t.category == TaskCategory::Pic)
        .count();
    let planned_names: HashSet<&str> = tasks
        .iter()
        .filter(|t| t.category == TaskCategory::Normal)
        .map(|t| t.task_name.as_str())
        .collect();

    let mut out: Vec<ExpandedLogRecord> = pic_flights(logs)
        .into_iter()
        .skip(planned_pic)
        .cloned()
        .collect();
    out.extend(
        logs.iter()
            .filter(|r| !contains_pic(&r.task_name))
            .filter(|r| r.task_name.is_empty() || !planned_names.contains(r.task_name.as_str()))
            .cloned(),
    );
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flight(task: &str, day: u32, hours: f64) -> ExpandedLogRecord {
        ExpandedLogRecord {
            student_code: "101AB".to_string(),
            task_name: task.to_string(),
            flight_date: NaiveDate::from_ymd_opt(2025, 5, day),
            block_duration: hours,
        }
    }

    fn realized(matches: &[TaskMatch]) -> Vec<f64> {
        matches.iter().map(|m| m.realized_duration).collect()
    }

    #[test]
    fn pic_tasks_are_matched_by_position() {
        let tasks = vec![
            PlannedTask::new("101AB", "SPIC-1", 1.0),
            PlannedTask::new("101AB", "SPIC-2", 1.0),
            PlannedTask::new("101AB", "SPIC-3", 1.0),
        ];
        // Logged out of order; names deliberately do not line up.
        let logs = vec![flight("PIC X", 9, 2.0), flight("PIC Y", 3, 1.5)];
        assert_eq!(realized(&match_tasks(&tasks, &logs)), vec![1.5, 2.0, 0.0]);
    }

    #[test]
    fn normal_tasks_sum_exact_name_matches() {
        let tasks = vec![
            PlannedTask::new("101AB", "SE-1", 1.0),
            PlannedTask::new("101AB", "SE-2", 1.0),
        ];
        let logs = vec![
            flight("SE-1", 1, 0.5),
            flight("SE-1", 2, 0.75),
            flight("SE 2", 3, 1.0), // normalizes equal, but raw names differ
        ];
        let m = match_tasks(&tasks, &logs);
        assert_eq!(realized(&m), vec![1.25, 0.0]);
        assert_eq!(m[0].difference(), 0.25);
        assert_eq!(m[1].difference(), -1.0);
    }

    #[test]
    fn pic_flights_do_not_credit_normal_tasks() {
        let tasks = vec![PlannedTask::new("101AB", "SE-1", 1.0)];
        let logs = vec![flight("PIC SE-1", 1, 1.0)];
        assert_eq!(realized(&match_tasks(&tasks, &logs)), vec![0.0]);
    }

    #[test]
    fn empty_log_matches_nothing() {
        let tasks = vec![
            PlannedTask::new("101AB", "SPIC-1", 1.0),
            PlannedTask::new("101AB", "", 1.0),
        ];
        assert_eq!(realized(&match_tasks(&tasks, &[])), vec![0.0, 0.0]);
    }

    #[test]
    fn unmatched_reports_surplus_and_unknown_flights() {
        let tasks = vec![
            PlannedTask::new("101AB", "SPIC-1", 1.0),
            PlannedTask::new("101AB", "SE-1", 1.0),
        ];
        let logs = vec![
            flight("PIC A", 1, 1.0),
            flight("PIC B", 2, 1.0),
            flight("SE-1", 3, 1.0),
            flight("SE-9", 4, 1.0),
        ];
        let names: Vec<_> = unmatched_flights(&tasks, &logs)
            .into_iter()
            .map(|r| r.task_name)
            .collect();
        assert_eq!(names, vec!["PIC B", "SE-9"]);
    }
}
