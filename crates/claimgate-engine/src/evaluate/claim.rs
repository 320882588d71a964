// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Claim aggregation.
//
// Direct mode: the claim's own requirements are one unit, exactly as a
// lemma would be. Lemma mode: covered iff every referenced lemma is covered
// and any claim-level evidence is present; the percentage is the mean of
// the lemma percentages, rounded half up.

use std::collections::BTreeSet;

use claimgate_core::error::{ClaimgateError, Result};
use claimgate_core::status::{
    ClaimStatus, EvidenceOutcome, JobOutcome, LemmaStatus, mean_percent,
};
use claimgate_core::types::{Claim, EvaluationMode};

use super::lemma::LemmaEvaluator;
use super::requirement::RequirementEvaluator;

pub struct ClaimEvaluator<'r, 'a> {
    requirements: &'r RequirementEvaluator<'a>,
    lemmas: &'r [LemmaStatus],
}

impl<'r, 'a> ClaimEvaluator<'r, 'a> {
    /// `lemmas` are the already-evaluated lemma results; claims never
    /// re-evaluate a lemma.
    pub fn new(requirements: &'r RequirementEvaluator<'a>, lemmas: &'r [LemmaStatus]) -> Self {
        Self {
            requirements,
            lemmas,
        }
    }

    pub fn evaluate(&self, claim: &Claim) -> Result<ClaimStatus> {
        match claim.mode {
            EvaluationMode::Direct => Ok(self.direct(claim)),
            EvaluationMode::Lemma => self.via_lemmas(claim),
        }
    }

    fn direct(&self, claim: &Claim) -> ClaimStatus {
        let unit = LemmaEvaluator::new(self.requirements).evaluate_unit(
            &claim.id,
            &claim.title,
            &claim.required_jobs,
            &claim.evidence_paths,
        );
        build_status(claim, unit.covered, unit.coverage_percent, unit.jobs, unit.evidence, Vec::new())
    }

    fn via_lemmas(&self, claim: &Claim) -> Result<ClaimStatus> {
        let mut referenced = Vec::with_capacity(claim.required_lemmas.len());
        for id in &claim.required_lemmas {
            let lemma = self.lemmas.iter().find(|l| &l.id == id).ok_or_else(|| {
                ClaimgateError::Configuration(format!(
                    "claim `{}` references undefined lemma `{id}`",
                    claim.id
                ))
            })?;
            referenced.push(lemma);
        }
        if referenced.is_empty() {
            return Err(ClaimgateError::Configuration(format!(
                "claim `{}` is in lemma mode but references no lemmas",
                claim.id
            )));
        }

        // Flatten transitive requirements, first occurrence wins.
        let mut seen_jobs = BTreeSet::new();
        let mut jobs: Vec<JobOutcome> = Vec::new();
        let mut seen_paths = BTreeSet::new();
        let mut evidence: Vec<EvidenceOutcome> = Vec::new();
        for lemma in &referenced {
            for job in &lemma.jobs {
                if seen_jobs.insert(job.required.clone()) {
                    jobs.push(job.clone());
                }
            }
            for item in &lemma.evidence {
                if seen_paths.insert(item.path.clone()) {
                    evidence.push(item.clone());
                }
            }
        }

        let mut own_evidence_ok = true;
        for path in &claim.evidence_paths {
            let outcome = self.requirements.evidence(path);
            own_evidence_ok &= outcome.satisfied();
            if seen_paths.insert(outcome.path.clone()) {
                evidence.push(outcome);
            }
        }

        let missing_lemmas: Vec<String> = referenced
            .iter()
            .filter(|l| !l.covered)
            .map(|l| l.id.clone())
            .collect();
        let covered = missing_lemmas.is_empty() && own_evidence_ok;

        let percents: Vec<u8> = referenced.iter().map(|l| l.coverage_percent).collect();
        let percent = mean_percent(&percents);

        Ok(build_status(claim, covered, percent, jobs, evidence, missing_lemmas))
    }
}

fn build_status(
    claim: &Claim,
    covered: bool,
    coverage_percent: u8,
    jobs: Vec<JobOutcome>,
    evidence: Vec<EvidenceOutcome>,
    missing_lemmas: Vec<String>,
) -> ClaimStatus {
    ClaimStatus {
        id: claim.id.clone(),
        title: claim.title.clone(),
        mode: claim.mode,
        covered,
        coverage_percent,
        required_jobs: jobs.iter().map(|j| j.required.clone()).collect(),
        required_lemmas: claim.required_lemmas.clone(),
        required_evidence: evidence.iter().map(|e| e.path.clone()).collect(),
        missing_jobs: jobs
            .iter()
            .filter(|j| !j.satisfied())
            .map(|j| j.required.clone())
            .collect(),
        missing_evidence: evidence
            .iter()
            .filter(|e| !e.satisfied())
            .map(|e| e.path.clone())
            .collect(),
        missing_lemmas,
        jobs,
        evidence,
    }
}
