// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Atomic requirement verdicts.
//
// A job requirement is satisfied iff it resolves to exactly one result whose
// conclusion is success. An evidence requirement is satisfied iff the
// snapshot saw it present and non-empty. Everything else carries a reason.

use claimgate_core::status::{EvidenceOutcome, EvidenceState, JobOutcome, ReasonCode, Resolution};

use crate::evidence::EvidenceSnapshot;
use crate::jobs::JobResultSet;
use crate::matcher::MatchEngine;
use crate::registry::ClaimRegistry;

pub struct RequirementEvaluator<'a> {
    registry: &'a ClaimRegistry,
    matcher: MatchEngine<'a>,
    evidence: &'a EvidenceSnapshot,
}

impl<'a> RequirementEvaluator<'a> {
    pub fn new(
        registry: &'a ClaimRegistry,
        jobs: &'a JobResultSet,
        evidence: &'a EvidenceSnapshot,
    ) -> Self {
        Self {
            registry,
            matcher: MatchEngine::new(jobs),
            evidence,
        }
    }

    pub fn job(&self, id: &str) -> JobOutcome {
        let requirement = self.registry.job_requirement(id);
        let resolution = self.matcher.resolve(&requirement);
        let reason = match &resolution {
            Resolution::Resolved(job) if job.conclusion.is_success() => ReasonCode::Satisfied,
            Resolution::Resolved(_) => ReasonCode::NonSuccess,
            Resolution::Missing => ReasonCode::MissingJob,
            Resolution::Ambiguous(_) => ReasonCode::AmbiguousMatch,
            Resolution::RecencyTie(_) => ReasonCode::RecencyTie,
        };
        JobOutcome {
            required: requirement.id,
            accepted: requirement.accepted,
            resolution,
            reason,
        }
    }

    pub fn evidence(&self, path: &str) -> EvidenceOutcome {
        // A path the snapshot never probed is as good as absent.
        let state = self.evidence.state(path).cloned().unwrap_or_default();
        let reason = evidence_reason(&state);
        EvidenceOutcome {
            path: path.to_string(),
            state,
            reason,
        }
    }
}

fn evidence_reason(state: &EvidenceState) -> ReasonCode {
    if state.error.is_some() {
        return ReasonCode::UnreadableEvidence;
    }
    if !state.exists {
        return ReasonCode::MissingEvidence;
    }
    let empty = match state.dir_entries {
        Some(entries) => entries == 0,
        None => state.size_bytes == 0,
    };
    if empty {
        ReasonCode::EmptyEvidence
    } else {
        ReasonCode::Satisfied
    }
}
