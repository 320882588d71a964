// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CI gate: pass/fail over raw job results, independent of the registry.
//
// Every named job (or, with `all_jobs`, every job in the snapshot) must
// resolve to one successful result. Reruns collapse to the latest attempt
// through the same matcher the claim evaluation uses; no aliases apply.

use std::collections::BTreeSet;

use claimgate_core::error::{ClaimgateError, Result};
use claimgate_core::status::{ReasonCode, Resolution};
use claimgate_core::types::{Conclusion, JobRequirement, normalize_job_name};
use tracing::{info, instrument};

use crate::jobs::JobResultSet;
use crate::matcher::MatchEngine;

/// What the gate demands of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatePolicy {
    /// Job names that must each be present and successful.
    pub require_jobs: Vec<String>,
    /// Require every job in the snapshot to be successful.
    pub all_jobs: bool,
    /// Accept `skipped` as a passing conclusion.
    pub allow_skipped: bool,
}

/// Result of checking one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateCheck {
    pub job: String,
    pub passed: bool,
    pub reason: ReasonCode,
    /// Conclusion of the resolved result, when exactly one resolved.
    pub conclusion: Option<Conclusion>,
}

/// Full gate report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    pub checks: Vec<GateCheck>,
}

impl GateReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &GateCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// One line per failing check, e.g. `tamarin=failure`.
    pub fn summary(&self) -> String {
        if self.passed() {
            return format!("all {} checked job(s) passed", self.checks.len());
        }
        self.failures()
            .map(|c| match c.conclusion {
                Some(conclusion) => format!("{}={conclusion}", c.job),
                None => format!("{}={}", c.job, c.reason),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Check `jobs` against `policy`.
///
/// A policy that checks nothing is a configuration error: an empty gate
/// would pass vacuously.
#[instrument(skip_all, fields(required = policy.require_jobs.len(), all_jobs = policy.all_jobs))]
pub fn run_gate(jobs: &JobResultSet, policy: &GatePolicy) -> Result<GateReport> {
    let names: Vec<String> = if policy.all_jobs {
        let distinct: BTreeSet<String> = jobs
            .results()
            .iter()
            .map(|r| r.normalized_name())
            .chain(policy.require_jobs.iter().map(|n| normalize_job_name(n)))
            .collect();
        distinct.into_iter().collect()
    } else {
        let mut seen = BTreeSet::new();
        policy
            .require_jobs
            .iter()
            .filter(|n| seen.insert(normalize_job_name(n)))
            .cloned()
            .collect()
    };

    if names.is_empty() {
        return Err(ClaimgateError::Configuration(
            "gate has nothing to check: pass --require-job or --all-jobs with a non-empty snapshot"
                .into(),
        ));
    }

    let engine = MatchEngine::new(jobs);
    let checks: Vec<GateCheck> = names
        .into_iter()
        .map(|job| {
            let resolution = engine.resolve(&JobRequirement {
                id: job.clone(),
                accepted: Vec::new(),
            });
            check(job, &resolution, policy.allow_skipped)
        })
        .collect();

    let report = GateReport { checks };
    info!(passed = report.passed(), checks = report.checks.len(), "gate evaluated");
    Ok(report)
}

fn check(job: String, resolution: &Resolution, allow_skipped: bool) -> GateCheck {
    let (reason, conclusion) = match resolution {
        Resolution::Resolved(m) => {
            let ok = m.conclusion.is_success()
                || (allow_skipped && m.conclusion == Conclusion::Skipped);
            let reason = if ok {
                ReasonCode::Satisfied
            } else {
                ReasonCode::NonSuccess
            };
            (reason, Some(m.conclusion))
        }
        Resolution::Missing => (ReasonCode::MissingJob, None),
        Resolution::Ambiguous(_) => (ReasonCode::AmbiguousMatch, None),
        Resolution::RecencyTie(_) => (ReasonCode::RecencyTie, None),
    };
    GateCheck {
        job,
        passed: reason.is_satisfied(),
        reason,
        conclusion,
    }
}
