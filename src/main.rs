//! varstate - inspect named multi-variable states and test conditions
//!
//! Provides both a REPL and one-shot command execution.

mod commands;
mod config;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "varstate")]
#[command(about = "Inspect named multi-variable states and test conditions against them")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "VARSTATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// A DEFINITION is either an all-in-one state (`definitions#values`, e.g.
/// `color:red,green;mode:edit,view#red;view`) or `@name` for a state from
/// the configuration file.
#[derive(Subcommand)]
pub enum Commands {
    /// Start interactive REPL
    Repl {
        /// Initial state definition
        definition: Option<String>,
    },

    /// Show the identifier and description of a state
    Describe {
        /// State definition
        definition: String,
    },

    /// Print the parsed specification as JSON
    Spec {
        /// State definition
        definition: String,
    },

    /// Read a variable or dotted path
    Get {
        /// State definition
        definition: String,

        /// Variable name or dotted path
        variable: String,
    },

    /// Assign variables and print the resulting state
    Set {
        /// State definition
        definition: String,

        /// Assignments as name=value
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// List top-level variables whose names match a regular expression
    Vars {
        /// State definition
        definition: String,

        /// Regular expression matched against the whole name
        pattern: Option<String>,
    },

    /// Test a condition against a state
    Match {
        /// State definition
        definition: String,

        /// Condition, e.g. 'red || LHS:mode == RHS:edit'
        condition: String,

        /// Assignments applied before matching, as name=value
        #[arg(short, long = "set")]
        assignments: Vec<String>,
    },

    /// Check condition syntax without a state
    Check {
        /// Condition text
        condition: String,
    },

    /// Restore a state from its persisted form
    Restore {
        /// State definition
        definition: String,

        /// Comma-separated top-level values
        persisted: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return Err(e.into());
        }
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .init();

    match cli.command {
        None => repl::run(&config, None),
        Some(Commands::Repl { definition }) => repl::run(&config, definition.as_deref()),
        Some(cmd) => match commands::execute(&config, cmd) {
            Ok(output) => {
                println!("{}", output);
                Ok(())
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                std::process::exit(1);
            }
        },
    }
}
