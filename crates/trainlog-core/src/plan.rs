use crate::code::normalize_plan_code;
use crate::duration::parse_duration;
use crate::error::{Result, TrainlogError};
use crate::types::TaskCategory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// PlanRow (input)
// ---------------------------------------------------------------------------

/// One row of the training plan as exported by the scheduling side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanRow {
    #[serde(default)]
    pub student_raw_id: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    /// `"H:MM"`
    #[serde(default)]
    pub planned_duration: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub program_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohort: Option<String>,
}

// ---------------------------------------------------------------------------
// PlannedTask
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub student_code: String,
    pub task_name: String,
    pub category: TaskCategory,
    pub phase: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    /// Hours.
    pub planned_duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohort: Option<String>,
}

impl PlannedTask {
    pub fn new(
        student_code: impl Into<String>,
        task_name: impl Into<String>,
        planned_duration: f64,
    ) -> Self {
        let task_name = task_name.into();
        Self {
            student_code: student_code.into(),
            category: TaskCategory::of(&task_name),
            task_name,
            phase: None,
            scheduled_date: None,
            planned_duration,
            program_type: None,
            cohort: None,
        }
    }

    pub fn from_row(row: &PlanRow) -> Self {
        let task_name = row.task_name.clone().unwrap_or_default();
        Self {
            student_code: normalize_plan_code(row.student_raw_id.as_deref()),
            category: TaskCategory::of(&task_name),
            task_name,
            phase: non_blank(row.phase.as_deref()),
            scheduled_date: row.scheduled_date,
            planned_duration: parse_duration(row.planned_duration.as_deref()),
            program_type: non_blank(row.program_type.as_deref()),
            cohort: non_blank(row.cohort.as_deref()),
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Plan ordering
// ---------------------------------------------------------------------------

/// Stable sort by `scheduled_date`, undated rows last. Both the PIC positional
/// match and the look-ahead pass depend on this order.
pub fn sort_plan_order(tasks: &mut [PlannedTask]) {
    tasks.sort_by_key(|t| (t.scheduled_date.is_none(), t.scheduled_date));
}

// ---------------------------------------------------------------------------
// TrainingPlan
// ---------------------------------------------------------------------------

/// Planned tasks grouped per student, each group in plan order. Students keep
/// the order in which they first appear in the input.
#[derive(Debug, Clone, Default)]
pub struct TrainingPlan {
    students: Vec<String>,
    tasks: HashMap<String, Vec<PlannedTask>>,
}

impl TrainingPlan {
    pub fn from_tasks(tasks: impl IntoIterator<Item = PlannedTask>) -> Self {
        let mut plan = TrainingPlan::default();
        for task in tasks {
            if task.student_code.is_empty() {
                tracing::warn!(task = %task.task_name, "plan row has no student code, skipped");
                continue;
            }
            if !plan.tasks.contains_key(&task.student_code) {
                plan.students.push(task.student_code.clone());
            }
            plan.tasks
                .entry(task.student_code.clone())
                .or_default()
                .push(task);
        }
        for group in plan.tasks.values_mut() {
            sort_plan_order(group);
        }
        plan
    }

    pub fn from_rows(rows: &[PlanRow]) -> Self {
        Self::from_tasks(rows.iter().map(PlannedTask::from_row))
    }

    /// Read plan rows from a YAML or JSON file (chosen by extension).
    pub fn load(path: &Path) -> Result<Self> {
        let rows: Vec<PlanRow> =
            crate::io::read_records(path).map_err(|e| TrainlogError::PlanUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_rows(&rows))
    }

    pub fn students(&self) -> &[String] {
        &self.students
    }

    pub fn tasks_for(&self, student_code: &str) -> Option<&[PlannedTask]> {
        self.tasks.get(student_code).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// First non-empty program type on the student's rows, else the program
    /// type their cohort maps to.
    pub fn program_type_for(
        &self,
        student_code: &str,
        cohorts: &HashMap<String, String>,
    ) -> Option<String> {
        let tasks = self.tasks.get(student_code)?;
        if let Some(pt) = tasks.iter().find_map(|t| t.program_type.clone()) {
            return Some(pt);
        }
        tasks
            .iter()
            .filter_map(|t| t.cohort.as_deref())
            .find_map(|c| cohorts.get(c).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn row(student: &str, task: &str, planned: &str, d: Option<u32>) -> PlanRow {
        PlanRow {
            student_raw_id: Some(student.to_string()),
            task_name: Some(task.to_string()),
            planned_duration: Some(planned.to_string()),
            scheduled_date: d.map(date),
            ..PlanRow::default()
        }
    }

    #[test]
    fn from_row_normalizes_and_parses() {
        let mut r = row("101AB - Jane Doe", "SPIC-1", "1:30", Some(4));
        r.phase = Some("  ".to_string());
        let t = PlannedTask::from_row(&r);
        assert_eq!(t.student_code, "101AB");
        assert_eq!(t.category, TaskCategory::Pic);
        assert_eq!(t.planned_duration, 1.5);
        assert_eq!(t.phase, None);
    }

    #[test]
    fn groups_students_in_first_seen_order() {
        let plan = TrainingPlan::from_rows(&[
            row("202CD - B", "SE-1", "1:00", Some(1)),
            row("101AB - A", "SE-1", "1:00", Some(1)),
            row("202CD - B", "SE-2", "1:00", Some(2)),
        ]);
        assert_eq!(plan.students(), &["202CD".to_string(), "101AB".to_string()]);
        assert_eq!(plan.tasks_for("202CD").unwrap().len(), 2);
    }

    #[test]
    fn plan_order_is_stable_by_date_with_undated_last() {
        let plan = TrainingPlan::from_rows(&[
            row("101AB", "C", "1:00", None),
            row("101AB", "B", "1:00", Some(5)),
            row("101AB", "A", "1:00", Some(2)),
            row("101AB", "B2", "1:00", Some(5)),
        ]);
        let names: Vec<_> = plan
            .tasks_for("101AB")
            .unwrap()
            .iter()
            .map(|t| t.task_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "B2", "C"]);
    }

    #[test]
    fn rows_without_student_are_dropped() {
        let mut r = row("x", "SE-1", "1:00", None);
        r.student_raw_id = None;
        let plan = TrainingPlan::from_rows(&[r]);
        assert!(plan.is_empty());
    }

    #[test]
    fn program_type_falls_back_to_cohort_lookup() {
        let mut r = row("101AB", "SE-1", "1:00", None);
        r.cohort = Some("2025-A".to_string());
        let plan = TrainingPlan::from_rows(&[r]);
        let cohorts = HashMap::from([("2025-A".to_string(), "MPL".to_string())]);
        assert_eq!(plan.program_type_for("101AB", &cohorts).as_deref(), Some("MPL"));
        assert_eq!(plan.program_type_for("101AB", &HashMap::new()), None);
    }
}
