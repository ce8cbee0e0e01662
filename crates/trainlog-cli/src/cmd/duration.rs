use crate::output::print_json;
use clap::Subcommand;
use trainlog_core::duration::{format_duration, parse_duration};

#[derive(Subcommand)]
pub enum DurationSubcommand {
    /// Parse "H:MM[:SS]" into hours (malformed input is 0)
    Parse { value: String },
    /// Format hours as "HH:MM"
    Format {
        #[arg(allow_negative_numbers = true)]
        hours: f64,
    },
}

pub fn run(subcmd: DurationSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DurationSubcommand::Parse { value } => {
            let hours = parse_duration(Some(&value));
            if json {
                print_json(&serde_json::json!({ "input": value, "hours": hours }))?;
            } else {
                println!("{hours}");
            }
        }
        DurationSubcommand::Format { hours } => {
            let formatted = format_duration(hours);
            if json {
                print_json(&serde_json::json!({ "hours": hours, "formatted": formatted }))?;
            } else {
                println!("{formatted}");
            }
        }
    }
    Ok(())
}
