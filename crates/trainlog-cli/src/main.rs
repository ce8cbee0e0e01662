mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, duration::DurationSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "trainlog",
    about = "Reconcile flight-training plans against the flight log and classify every task",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .trainlog/)
    #[arg(long, global = true, env = "TRAINLOG_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config to .trainlog/config.yaml
    Init {
        /// School name recorded in the config
        #[arg(long)]
        school: Option<String>,
    },

    /// Reconcile students' plans against the flight log
    Reconcile {
        /// Training plan file (.yaml or .json)
        #[arg(long)]
        plan: PathBuf,
        /// Flight log file (.yaml or .json)
        #[arg(long)]
        log: PathBuf,
        /// Student code (repeatable; omit for every student in the plan)
        #[arg(long = "student")]
        students: Vec<String>,
        /// Reconcile students in parallel
        #[arg(long)]
        parallel: bool,
        /// Also write the JSON report to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// One line per student: totals and status counts
    Summary {
        #[arg(long)]
        plan: PathBuf,
        #[arg(long)]
        log: PathBuf,
        #[arg(long)]
        parallel: bool,
    },

    /// Show the flight log split into one row per student
    Expand {
        #[arg(long)]
        log: PathBuf,
        /// Only rows for this student code
        #[arg(long)]
        student: Option<String>,
    },

    /// Convert between "H:MM" strings and hours
    Duration {
        #[command(subcommand)]
        subcommand: DurationSubcommand,
    },

    /// Inspect and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { school } => cmd::init::run(&root, school.as_deref()),
        Commands::Reconcile {
            plan,
            log,
            students,
            parallel,
            out,
        } => cmd::reconcile::run(
            &root,
            cmd::Inputs { plan, log, parallel },
            &students,
            out.as_deref(),
            cli.json,
        ),
        Commands::Summary { plan, log, parallel } => {
            cmd::summary::run(&root, cmd::Inputs { plan, log, parallel }, cli.json)
        }
        Commands::Expand { log, student } => {
            cmd::expand::run(&log, student.as_deref(), cli.json)
        }
        Commands::Duration { subcommand } => cmd::duration::run(subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
