// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations. Each returns the process exit status on a
// completed run; fatal errors propagate to `main`.

use std::path::{Path, PathBuf};

use claimgate_core::EngineConfig;
use claimgate_core::error::{EXIT_NOT_COVERED, Result};
use claimgate_engine::{
    ClaimRegistry, GatePolicy, JobResultSet, load_and_evaluate, run_gate, suggest_aliases,
};
use claimgate_report::history::{CoverageHistory, HistoryEntry};
use claimgate_report::readme::{HISTORY_BEGIN, HISTORY_END, MATRIX_BEGIN, MATRIX_END};
use claimgate_report::{
    ReportRenderer, StatusDocument, matrix_summary_block, normalize_timestamp, now_timestamp,
    prepare_file_block, read_status, remove_stale_outputs, render_alias_snippet,
    render_suggestion_report, update_file_block, write_file,
};
use tracing::{info, warn};

use crate::{Command, InputArgs};

const EXIT_OK: u8 = 0;

pub fn run(command: Command) -> Result<u8> {
    match command {
        Command::Evaluate {
            inputs,
            evidence_root,
            evidence_manifest,
            status_json,
            matrix_md,
            readme,
            generated_at,
        } => {
            let mut config = resolve_config(&inputs)?;
            override_path(&mut config.evidence_root, evidence_root);
            if evidence_manifest.is_some() {
                config.evidence_manifest = evidence_manifest;
            }
            override_path(&mut config.status_json_path, status_json);
            override_path(&mut config.matrix_md_path, matrix_md);
            if readme.is_some() {
                config.readme_path = readme;
            }
            let generated_at = generated_at.as_deref().map(normalize_timestamp).transpose()?;
            evaluate(&config, generated_at)
        }
        Command::Validate { inputs } => validate(&resolve_config(&inputs)?),
        Command::Gate {
            inputs,
            require_jobs,
            all_jobs,
            allow_skipped,
        } => {
            let config = resolve_config(&inputs)?;
            let policy = GatePolicy {
                require_jobs,
                all_jobs,
                allow_skipped,
            };
            gate(&config, &policy)
        }
        Command::SuggestAliases {
            inputs,
            snippet_out,
        } => suggest(&resolve_config(&inputs)?, snippet_out.as_deref()),
        Command::History {
            config,
            status_json,
            history_json,
            history_md,
            readme,
            timestamp,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            override_path(&mut cfg.status_json_path, status_json);
            override_path(&mut cfg.history_json_path, history_json);
            override_path(&mut cfg.history_md_path, history_md);
            if readme.is_some() {
                cfg.readme_path = readme;
            }
            let ts = match timestamp {
                Some(raw) => normalize_timestamp(&raw)?,
                None => now_timestamp(),
            };
            history(&cfg, ts)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

fn resolve_config(inputs: &InputArgs) -> Result<EngineConfig> {
    let mut config = load_config(inputs.config.as_deref())?;
    override_path(&mut config.registry_path, inputs.registry.clone());
    override_path(&mut config.jobs_path, inputs.jobs.clone());
    Ok(config)
}

fn override_path(target: &mut PathBuf, flag: Option<PathBuf>) {
    if let Some(path) = flag {
        *target = path;
    }
}

/// Evaluate, then write both reports. Reports are only written after the
/// whole evaluation succeeded; a fatal error removes any previous ones.
pub fn evaluate(config: &EngineConfig, generated_at: Option<String>) -> Result<u8> {
    let evaluation = match load_and_evaluate(config) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            if let Err(cleanup) =
                remove_stale_outputs(&[&config.status_json_path, &config.matrix_md_path])
            {
                warn!(error = %cleanup, "could not remove stale reports");
            }
            return Err(e);
        }
    };

    let report = ReportRenderer::new(&evaluation)
        .generated_at(generated_at)
        .render()?;
    report.write_to(&config.status_json_path, &config.matrix_md_path)?;
    info!(
        json = %config.status_json_path.display(),
        markdown = %config.matrix_md_path.display(),
        "reports written"
    );

    if let Some(readme) = &config.readme_path {
        let body = matrix_summary_block(
            &report.document,
            &config.matrix_md_path.display().to_string(),
        );
        match update_file_block(readme, MATRIX_BEGIN, MATRIX_END, &body) {
            Ok(true) => info!(readme = %readme.display(), "README coverage block updated"),
            Ok(false) => info!(readme = %readme.display(), "README coverage block already current"),
            // The evaluation stands on its own; README upkeep never changes the verdict.
            Err(e) => warn!(readme = %readme.display(), error = %e, "README not updated"),
        }
    }

    print!("{}", summary_text(&report.document));
    Ok(if report.document.passed() {
        EXIT_OK
    } else {
        EXIT_NOT_COVERED
    })
}

/// Console summary: one verdict line, then one line per uncovered claim
/// naming exactly what is missing.
pub fn summary_text(doc: &StatusDocument) -> String {
    let mut out = format!(
        "[{}] {}/{} claims covered ({}%)\n",
        doc.summary.overall.as_str(),
        doc.summary.claims_covered,
        doc.summary.claims_total,
        doc.summary.coverage_percent
    );
    for claim in doc.claims.iter().filter(|c| !c.covered) {
        let mut missing = Vec::new();
        if !claim.missing_jobs.is_empty() {
            missing.push(format!("jobs: {}", claim.missing_jobs.join(", ")));
        }
        if !claim.missing_evidence.is_empty() {
            missing.push(format!("evidence: {}", claim.missing_evidence.join(", ")));
        }
        if !claim.missing_lemmas.is_empty() {
            missing.push(format!("lemmas: {}", claim.missing_lemmas.join(", ")));
        }
        out.push_str(&format!(
            "  {} ({}%) missing {}\n",
            claim.id,
            claim.coverage_percent,
            missing.join("; ")
        ));
    }
    out
}

fn validate(config: &EngineConfig) -> Result<u8> {
    let registry = ClaimRegistry::load(&config.registry_path)?;
    println!(
        "[OK] {}: {} claim(s), {} lemma(s), {} required job id(s), {} evidence path(s)",
        config.registry_path.display(),
        registry.claims().len(),
        registry.lemmas().len(),
        registry.required_job_ids().len(),
        registry.evidence_requirements().len()
    );
    Ok(EXIT_OK)
}

fn gate(config: &EngineConfig, policy: &GatePolicy) -> Result<u8> {
    let jobs = JobResultSet::load(&config.jobs_path)?;
    let report = run_gate(&jobs, policy)?;
    if report.passed() {
        println!("[GATE OK] {}", report.summary());
        Ok(EXIT_OK)
    } else {
        println!("[GATE FAIL] {}", report.summary());
        Ok(EXIT_NOT_COVERED)
    }
}

fn suggest(config: &EngineConfig, snippet_out: Option<&Path>) -> Result<u8> {
    let registry = ClaimRegistry::load(&config.registry_path)?;
    let jobs = JobResultSet::load(&config.jobs_path)?;
    let rows = suggest_aliases(&registry, &jobs);

    print!("{}", render_suggestion_report(&rows));
    match render_alias_snippet(&rows)? {
        Some(snippet) => {
            println!();
            print!("{snippet}");
            if let Some(path) = snippet_out {
                write_file(path, &snippet)?;
                info!(path = %path.display(), "alias snippet written");
            }
        }
        None => println!("\nno unique alias suggestions"),
    }
    Ok(EXIT_OK)
}

/// Record the current coverage. README markers are checked before any
/// file is written, so a broken README leaves the history untouched.
pub fn history(config: &EngineConfig, ts: String) -> Result<u8> {
    let status = read_status(&config.status_json_path)?;
    let mut history = CoverageHistory::load(&config.history_json_path)?;
    history.record(HistoryEntry::from_status(&status, ts));

    let readme_update = match &config.readme_path {
        Some(readme) => {
            let body = history.readme_block(config.history_readme_rows);
            prepare_file_block(readme, HISTORY_BEGIN, HISTORY_END, &body)?
                .map(|text| (readme, text))
        }
        None => None,
    };

    history.save(&config.history_json_path)?;
    write_file(
        &config.history_md_path,
        &history.render_markdown(config.history_md_rows),
    )?;
    if let Some((readme, text)) = readme_update {
        write_file(readme, &text)?;
        info!(readme = %readme.display(), "README history block updated");
    }
    Ok(EXIT_OK)
}
