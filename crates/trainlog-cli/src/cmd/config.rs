use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use trainlog_core::config::{Config, WarnLevel};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective config (built-in defaults when no file exists)
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    if json {
        return print_json(&config);
    }

    println!("School: {}", config.school.name);
    println!("Skill tests: {}", config.skill_tests.join(" | "));
    if !config.cohorts.is_empty() {
        let mut cohorts: Vec<_> = config.cohorts.iter().collect();
        cohorts.sort();
        println!("Cohorts:");
        for (cohort, program) in cohorts {
            println!("  {cohort:<16} {program}");
        }
    }
    println!();

    let rows = config
        .milestones
        .iter()
        .map(|m| {
            vec![
                m.id.clone(),
                m.program_types
                    .as_ref()
                    .map(|p| p.join(","))
                    .unwrap_or_else(|| "any".to_string()),
                m.task_group.len().to_string(),
                format!("{:.1}", m.threshold_hours),
                m.result_label.clone(),
            ]
        })
        .collect();
    print_table(
        &["MILESTONE", "PROGRAMS", "TASKS", "THRESHOLD", "LABEL"],
        &["TASKS", "THRESHOLD"],
        rows,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
