// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lemma aggregation: logical AND over job and evidence requirements.

use claimgate_core::status::{LemmaStatus, floor_percent};
use claimgate_core::types::Lemma;

use super::requirement::RequirementEvaluator;

pub struct LemmaEvaluator<'r, 'a> {
    requirements: &'r RequirementEvaluator<'a>,
}

impl<'r, 'a> LemmaEvaluator<'r, 'a> {
    pub fn new(requirements: &'r RequirementEvaluator<'a>) -> Self {
        Self { requirements }
    }

    pub fn evaluate(&self, lemma: &Lemma) -> LemmaStatus {
        self.evaluate_unit(&lemma.id, &lemma.title, &lemma.required_jobs, &lemma.evidence_paths)
    }

    /// Evaluate an arbitrary requirement set as one unit. Direct-mode claims
    /// go through here too.
    pub fn evaluate_unit(
        &self,
        id: &str,
        title: &str,
        job_ids: &[String],
        evidence_paths: &[String],
    ) -> LemmaStatus {
        let jobs: Vec<_> = job_ids.iter().map(|j| self.requirements.job(j)).collect();
        let evidence: Vec<_> = evidence_paths
            .iter()
            .map(|p| self.requirements.evidence(p))
            .collect();

        let total = jobs.len() + evidence.len();
        let satisfied = jobs.iter().filter(|j| j.satisfied()).count()
            + evidence.iter().filter(|e| e.satisfied()).count();

        LemmaStatus {
            id: id.to_string(),
            title: title.to_string(),
            // A unit with no requirements proves nothing.
            covered: total > 0 && satisfied == total,
            coverage_percent: floor_percent(satisfied, total),
            jobs,
            evidence,
        }
    }
}
