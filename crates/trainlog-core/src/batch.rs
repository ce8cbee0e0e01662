use crate::classifier::Classifier;
use crate::config::Config;
use crate::error::{Result, TrainlogError};
use crate::flight_log::{ExpandedLogRecord, FlightLogIndex};
use crate::matcher;
use crate::milestone::{self, MilestoneRule};
use crate::phase::{self, SkillTestSet};
use crate::plan::{PlannedTask, TrainingPlan};
use crate::report::StudentReport;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    #[default]
    Sequential,
    /// One rayon task per student; results keep input order.
    Parallel,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// The full per-student pipeline: match, classify, phase roll-up, milestones.
/// Holds only read-only configuration, so one instance serves every student.
pub struct Reconciler {
    classifier: Classifier,
    milestones: Vec<MilestoneRule>,
    skill_tests: SkillTestSet,
    cohorts: HashMap<String, String>,
}

impl Reconciler {
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: Classifier::default(),
            milestones: config.milestones.clone(),
            skill_tests: config.skill_test_set(),
            cohorts: config.cohorts.clone(),
        }
    }

    /// Reconcile one student. `tasks` must be in plan order and `logs` must be
    /// that student's expanded flight rows.
    pub fn reconcile_student(
        &self,
        student_code: &str,
        tasks: &[PlannedTask],
        logs: &[ExpandedLogRecord],
        program_type: Option<&str>,
    ) -> StudentReport {
        let matches = matcher::match_tasks(tasks, logs);
        let classified = self.classifier.classify(matches);
        let (rolled, phases) = phase::roll_up(classified, &self.skill_tests);
        let (final_tasks, outcomes) = milestone::apply(rolled, &self.milestones, program_type);
        let unmatched = matcher::unmatched_flights(tasks, logs);

        tracing::debug!(
            student = student_code,
            tasks = tasks.len(),
            flights = logs.len(),
            unmatched = unmatched.len(),
            "student reconciled"
        );
        StudentReport::new(
            student_code,
            program_type.map(str::to_string),
            final_tasks,
            phases,
            outcomes,
            unmatched,
        )
    }

    fn reconcile_one(
        &self,
        plan: &TrainingPlan,
        index: &FlightLogIndex,
        student_code: &str,
    ) -> StudentReport {
        let tasks = plan.tasks_for(student_code).unwrap_or(&[]);
        let program_type = plan.program_type_for(student_code, &self.cohorts);
        self.reconcile_student(
            student_code,
            tasks,
            index.for_student(student_code),
            program_type.as_deref(),
        )
    }

    /// Reconcile `students` against a flight log that was read and expanded
    /// once. Every code must exist in the plan.
    pub fn reconcile_batch(
        &self,
        plan: &TrainingPlan,
        index: &FlightLogIndex,
        students: &[String],
        execution: Execution,
    ) -> Result<Vec<StudentReport>> {
        if let Some(unknown) = students.iter().find(|s| plan.tasks_for(s).is_none()) {
            return Err(TrainlogError::StudentNotFound(unknown.clone()));
        }
        tracing::info!(
            students = students.len(),
            flights = index.expanded_count(),
            ?execution,
            "reconciling batch"
        );

        Ok(self.run_students(plan, index, students, execution))
    }

    /// Reconcile every student in the plan, in plan order.
    pub fn reconcile_all(
        &self,
        plan: &TrainingPlan,
        index: &FlightLogIndex,
        execution: Execution,
    ) -> Vec<StudentReport> {
        self.run_students(plan, index, plan.students(), execution)
    }

    /// Results come back in the order of `students`, whichever execution
    /// mode runs them.
    fn run_students(
        &self,
        plan: &TrainingPlan,
        index: &FlightLogIndex,
        students: &[String],
        execution: Execution,
    ) -> Vec<StudentReport> {
        match execution {
            Execution::Sequential => students
                .iter()
                .map(|s| self.reconcile_one(plan, index, s))
                .collect(),
            Execution::Parallel => {
                use rayon::prelude::*;
                students
                    .par_iter()
                    .map(|s| self.reconcile_one(plan, index, s))
                    .collect()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// BatchCache
// ---------------------------------------------------------------------------

type CacheKey = (u64, Vec<String>);

/// Memoized batch results keyed by the student-code set and an explicit
/// generation counter. Entries never expire on their own; callers bump the
/// generation with [`BatchCache::invalidate`] when the inputs change.
#[derive(Default)]
pub struct BatchCache {
    generation: AtomicU64,
    entries: Mutex<HashMap<CacheKey, Arc<Vec<StudentReport>>>>,
}

impl BatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Drop all entries and start a new generation. Returns the new generation.
    pub fn invalidate(&self) -> u64 {
        let next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        next
    }

    /// Cached result for the (sorted, deduplicated) student set, computing it
    /// with `compute` on a miss. Errors are not cached.
    pub fn get_or_compute<F>(
        &self,
        students: &[String],
        compute: F,
    ) -> Result<Arc<Vec<StudentReport>>>
    where
        F: FnOnce(&[String]) -> Result<Vec<StudentReport>>,
    {
        let set: Vec<String> = students
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let key = (self.generation(), set);

        if let Some(hit) = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return Ok(Arc::clone(hit));
        }

        let reports = Arc::new(compute(&key.1)?);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, Arc::clone(&reports));
        Ok(reports)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
