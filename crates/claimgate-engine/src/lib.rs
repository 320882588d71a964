// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! claimgate-engine: turns untrusted CI evidence into claim coverage.
//!
//! Inputs are captured once (registry, job snapshot, evidence snapshot) and
//! evaluated without re-querying anything. Data flows strictly downstream:
//! matcher, requirement verdicts, lemma aggregation, claim aggregation.
//!
//! Fail-closed throughout: anything missing, ambiguous, or unreadable is an
//! unsatisfied requirement, and a malformed registry or snapshot aborts the
//! run before a single claim status exists.

pub mod evaluate;
pub mod evidence;
pub mod gate;
pub mod integrity;
pub mod jobs;
pub mod matcher;
pub mod registry;
pub mod suggest;

use claimgate_core::EngineConfig;
use claimgate_core::error::Result;
use claimgate_core::status::Evaluation;
use tracing::info;

// PUBLIC API: Re-export the pipeline stages
pub use evaluate::evaluate;
pub use evidence::EvidenceSnapshot;
pub use gate::{GateCheck, GatePolicy, GateReport, run_gate};
pub use integrity::hash_file;
pub use jobs::JobResultSet;
pub use matcher::MatchEngine;
pub use registry::{AliasTable, ClaimRegistry};
pub use suggest::{AliasSuggestion, SuggestionRow, suggest_aliases};

/// Load every input named by `config` and evaluate the registry.
///
/// Inputs are loaded in dependency order and any fatal error short-circuits
/// before evaluation starts.
pub fn load_and_evaluate(config: &EngineConfig) -> Result<Evaluation> {
    let registry = ClaimRegistry::load(&config.registry_path)?;
    let jobs = JobResultSet::load(&config.jobs_path)?;
    let requirements = registry.evidence_requirements();
    let evidence = match &config.evidence_manifest {
        Some(manifest) => EvidenceSnapshot::load_manifest(manifest, &requirements)?,
        None => EvidenceSnapshot::capture(&config.evidence_root, &requirements)?,
    };

    let evaluation = evaluate(&registry, &jobs, &evidence)?;
    info!(
        covered = evaluation.claims_covered(),
        total = evaluation.claims_total(),
        "claim evaluation complete"
    );
    Ok(evaluation)
}
