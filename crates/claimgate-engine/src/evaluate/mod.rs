// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Evaluation pipeline: requirement verdicts, lemma aggregation, claim
// aggregation. Pure functions of (registry, job snapshot, evidence snapshot).

pub mod claim;
pub mod lemma;
pub mod requirement;

pub use claim::ClaimEvaluator;
pub use lemma::LemmaEvaluator;
pub use requirement::RequirementEvaluator;

use claimgate_core::error::Result;
use claimgate_core::status::Evaluation;
use tracing::{debug, instrument};

use crate::evidence::EvidenceSnapshot;
use crate::jobs::JobResultSet;
use crate::registry::ClaimRegistry;

/// Evaluate every lemma once, then every claim against those lemma results.
///
/// Output order follows the registry (natural id order), never evaluation
/// order.
#[instrument(skip_all, fields(claims = registry.claims().len(), lemmas = registry.lemmas().len()))]
pub fn evaluate(
    registry: &ClaimRegistry,
    jobs: &JobResultSet,
    evidence: &EvidenceSnapshot,
) -> Result<Evaluation> {
    let requirements = RequirementEvaluator::new(registry, jobs, evidence);
    let lemma_eval = LemmaEvaluator::new(&requirements);

    let lemmas: Vec<_> = registry.lemmas().iter().map(|l| lemma_eval.evaluate(l)).collect();
    for lemma in &lemmas {
        debug!(lemma = %lemma.id, covered = lemma.covered, percent = lemma.coverage_percent, "lemma evaluated");
    }

    let claim_eval = ClaimEvaluator::new(&requirements, &lemmas);
    let claims = registry
        .claims()
        .iter()
        .map(|c| claim_eval.evaluate(c))
        .collect::<Result<Vec<_>>>()?;

    Ok(Evaluation {
        registry_version: registry.version(),
        snapshot: jobs.summary(),
        claims,
        lemmas,
    })
}
