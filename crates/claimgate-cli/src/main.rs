// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Claimgate: fail-closed claim verification gate.
//
// Entry point. Parses arguments, initialises logging on stderr, runs one
// subcommand, and maps the outcome onto the exit contract:
//   0  every claim covered / gate passed
//   1  at least one claim not covered / gate failed
//   2  fatal configuration or input error

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use claimgate_core::hints::explain_error;

#[derive(Debug, Parser)]
#[command(name = "claimgate")]
#[command(about = "Turn CI job results and evidence artifacts into a reproducible claim coverage gate")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Inputs shared by every registry-aware subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// JSON configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Claim registry (YAML)
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Job-result snapshot (JSON)
    #[arg(long)]
    pub jobs: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate every claim and write the status JSON and coverage matrix
    Evaluate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Directory evidence paths are resolved against
        #[arg(long)]
        evidence_root: Option<PathBuf>,

        /// Evidence manifest (JSON) used instead of probing the filesystem
        #[arg(long)]
        evidence_manifest: Option<PathBuf>,

        /// Status JSON output path
        #[arg(long)]
        status_json: Option<PathBuf>,

        /// Coverage matrix output path
        #[arg(long)]
        matrix_md: Option<PathBuf>,

        /// README whose coverage marker block should be refreshed
        #[arg(long)]
        readme: Option<PathBuf>,

        /// RFC 3339 timestamp to stamp into the outputs (omitted by default)
        #[arg(long)]
        generated_at: Option<String>,
    },

    /// Load and validate the claim registry only
    Validate {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Gate directly on job results, without the registry
    Gate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Job that must be present and successful (repeatable)
        #[arg(long = "require-job")]
        require_jobs: Vec<String>,

        /// Require every job in the snapshot to be successful
        #[arg(long)]
        all_jobs: bool,

        /// Accept `skipped` as passing
        #[arg(long)]
        allow_skipped: bool,
    },

    /// Suggest alias entries for required job ids that match nothing
    SuggestAliases {
        #[command(flatten)]
        inputs: InputArgs,

        /// Write the suggested `aliases:` YAML snippet here
        #[arg(long)]
        snippet_out: Option<PathBuf>,
    },

    /// Append the current coverage to the history and refresh its tables
    History {
        /// JSON configuration file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Status JSON written by `evaluate`
        #[arg(long)]
        status_json: Option<PathBuf>,

        /// History JSON file
        #[arg(long)]
        history_json: Option<PathBuf>,

        /// History Markdown table
        #[arg(long)]
        history_md: Option<PathBuf>,

        /// README whose history marker block should be refreshed
        #[arg(long)]
        readme: Option<PathBuf>,

        /// RFC 3339 timestamp for the new entry (defaults to now, UTC)
        #[arg(long)]
        timestamp: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match commands::run(cli.command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            let hint = explain_error(&e);
            eprintln!("error: {e}");
            eprintln!("  {}", hint.message);
            eprintln!("  hint ({}): {}", hint.kind.as_str(), hint.suggestion);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
