pub mod config;
pub mod duration;
pub mod expand;
pub mod init;
pub mod reconcile;
pub mod summary;

use anyhow::Context;
use std::path::{Path, PathBuf};
use trainlog_core::{
    batch::{Execution, Reconciler},
    config::Config,
    flight_log::FlightLogIndex,
    plan::TrainingPlan,
};

/// Input files shared by the reconciling commands.
pub struct Inputs {
    pub plan: PathBuf,
    pub log: PathBuf,
    pub parallel: bool,
}

/// Everything loaded up front; the flight log is read and expanded once.
pub struct Loaded {
    pub plan: TrainingPlan,
    pub index: FlightLogIndex,
    pub reconciler: Reconciler,
    pub execution: Execution,
}

impl Inputs {
    pub fn load(&self, root: &Path) -> anyhow::Result<Loaded> {
        let config = Config::load_or_default(root)
            .and_then(Config::ensure_valid)
            .context("failed to load config")?;
        let plan = TrainingPlan::load(&self.plan).context("failed to load training plan")?;
        let index = FlightLogIndex::load(&self.log).context("failed to load flight log")?;
        tracing::info!(
            students = plan.len(),
            raw_flights = index.raw_count(),
            expanded_flights = index.expanded_count(),
            "inputs loaded"
        );
        Ok(Loaded {
            plan,
            index,
            reconciler: Reconciler::new(&config),
            execution: if self.parallel {
                Execution::Parallel
            } else {
                Execution::Sequential
            },
        })
    }
}
