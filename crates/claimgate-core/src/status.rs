// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Evaluation outcomes: per-requirement verdicts, lemma and claim status.
//
// These are typed values only. Rendering to JSON or Markdown happens in
// `claimgate-report`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Conclusion, EvaluationMode, JobResult};

/// Why a requirement is (un)satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Satisfied,
    /// No job result matched the required id or any accepted alias.
    MissingJob,
    /// Several actual jobs matched and their conclusions disagree.
    AmbiguousMatch,
    /// Reruns of one job share the latest recency key but disagree.
    RecencyTie,
    /// Resolved to exactly one result whose conclusion is not success.
    NonSuccess,
    /// Evidence path (or every pattern match) is absent.
    MissingEvidence,
    /// Evidence exists but has zero length (or is an empty directory).
    EmptyEvidence,
    /// Evidence exists but could not be read.
    UnreadableEvidence,
}

impl ReasonCode {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Satisfied => "satisfied",
            Self::MissingJob => "missing_job",
            Self::AmbiguousMatch => "ambiguous_match",
            Self::RecencyTie => "recency_tie",
            Self::NonSuccess => "non_success",
            Self::MissingEvidence => "missing_evidence",
            Self::EmptyEvidence => "empty_evidence",
            Self::UnreadableEvidence => "unreadable_evidence",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job result as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedJob {
    pub name: String,
    pub conclusion: Conclusion,
    pub run_id: Option<u64>,
    pub run_attempt: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&JobResult> for MatchedJob {
    fn from(job: &JobResult) -> Self {
        Self {
            name: job.name.clone(),
            conclusion: job.conclusion,
            run_id: job.run_id,
            run_attempt: job.run_attempt,
            completed_at: job.completed_at,
        }
    }
}

/// What a required job id resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one authoritative result.
    Resolved(MatchedJob),
    /// Nothing matched.
    Missing,
    /// Distinct actual jobs matched with conflicting conclusions.
    Ambiguous(Vec<MatchedJob>),
    /// Most-recent reruns of one job disagree.
    RecencyTie(Vec<MatchedJob>),
}

impl Resolution {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolved(_) => "resolved",
            Self::Missing => "missing",
            Self::Ambiguous(_) => "ambiguous",
            Self::RecencyTie(_) => "recency_tie",
        }
    }

    /// Job results involved in the resolution, in deterministic order.
    pub fn candidates(&self) -> &[MatchedJob] {
        match self {
            Self::Resolved(job) => std::slice::from_ref(job),
            Self::Missing => &[],
            Self::Ambiguous(jobs) | Self::RecencyTie(jobs) => jobs,
        }
    }
}

/// Evaluation of one job requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub required: String,
    pub accepted: Vec<String>,
    pub resolution: Resolution,
    pub reason: ReasonCode,
}

impl JobOutcome {
    pub fn satisfied(&self) -> bool {
        self.reason.is_satisfied()
    }
}

/// What the evidence snapshot recorded for one path or pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceState {
    pub exists: bool,
    pub size_bytes: u64,
    /// SHA-256 of the file contents when the snapshot read it.
    pub sha256: Option<String>,
    /// Concrete paths a pattern expanded to (empty for plain paths).
    pub matches: Vec<String>,
    /// Entry count when the path is a directory.
    pub dir_entries: Option<u64>,
    /// Read failure text, if probing the path failed.
    pub error: Option<String>,
}

/// Evaluation of one evidence requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceOutcome {
    pub path: String,
    pub state: EvidenceState,
    pub reason: ReasonCode,
}

impl EvidenceOutcome {
    pub fn satisfied(&self) -> bool {
        self.reason.is_satisfied()
    }
}

/// Computed outcome for one lemma (or the direct unit of a claim).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LemmaStatus {
    pub id: String,
    pub title: String,
    pub covered: bool,
    /// Diagnostic only; `covered` never derives from it.
    pub coverage_percent: u8,
    pub jobs: Vec<JobOutcome>,
    pub evidence: Vec<EvidenceOutcome>,
}

impl LemmaStatus {
    pub fn missing_jobs(&self) -> impl Iterator<Item = &str> {
        self.jobs
            .iter()
            .filter(|j| !j.satisfied())
            .map(|j| j.required.as_str())
    }

    pub fn missing_evidence(&self) -> impl Iterator<Item = &str> {
        self.evidence
            .iter()
            .filter(|e| !e.satisfied())
            .map(|e| e.path.as_str())
    }
}

/// Computed outcome for one claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimStatus {
    pub id: String,
    pub title: String,
    pub mode: EvaluationMode,
    pub covered: bool,
    pub coverage_percent: u8,
    /// Job ids the claim depends on, transitively through lemmas, first
    /// occurrence order.
    pub required_jobs: Vec<String>,
    pub required_lemmas: Vec<String>,
    /// Evidence paths the claim depends on, transitively.
    pub required_evidence: Vec<String>,
    pub missing_jobs: Vec<String>,
    pub missing_evidence: Vec<String>,
    /// Referenced lemmas that are not covered.
    pub missing_lemmas: Vec<String>,
    /// One outcome per entry of `required_jobs`.
    pub jobs: Vec<JobOutcome>,
    /// One outcome per entry of `required_evidence`.
    pub evidence: Vec<EvidenceOutcome>,
}

/// Provenance of the job snapshot an evaluation ran against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub repo: Option<String>,
    pub run_id: Option<u64>,
    /// Every ingested record, sorted by name and then recency.
    pub jobs: Vec<MatchedJob>,
}

/// The complete result of one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub registry_version: u32,
    pub snapshot: SnapshotSummary,
    /// Sorted by claim id (natural order).
    pub claims: Vec<ClaimStatus>,
    /// Sorted by lemma id; empty when the registry defines no lemmas.
    pub lemmas: Vec<LemmaStatus>,
}

impl Evaluation {
    pub fn lemma_layer(&self) -> bool {
        !self.lemmas.is_empty()
    }

    pub fn claims_total(&self) -> usize {
        self.claims.len()
    }

    pub fn claims_covered(&self) -> usize {
        self.claims.iter().filter(|c| c.covered).count()
    }

    /// Whole-run percentage, rounded down so it only reads 100 when every
    /// claim is covered.
    pub fn coverage_percent(&self) -> u8 {
        floor_percent(self.claims_covered(), self.claims_total())
    }

    /// True only when the registry has claims and all are covered.
    pub fn all_covered(&self) -> bool {
        !self.claims.is_empty() && self.claims.iter().all(|c| c.covered)
    }
}

/// `floor(100 * part / total)`; an empty denominator yields 0.
pub fn floor_percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // part <= total, so the quotient fits in 0..=100
    ((part.min(total) * 100) / total) as u8
}

/// Mean of percentages, rounded half up; an empty slice yields 0.
pub fn mean_percent(values: &[u8]) -> u8 {
    if values.is_empty() {
        return 0;
    }
    let n = values.len();
    let sum: usize = values.iter().map(|v| usize::from(*v)).sum();
    // Mean of values in 0..=100 stays in range.
    ((sum + n / 2) / n) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_percent_never_rounds_up() {
        assert_eq!(floor_percent(2, 3), 66);
        assert_eq!(floor_percent(199, 200), 99);
        assert_eq!(floor_percent(4, 4), 100);
        assert_eq!(floor_percent(0, 0), 0);
    }

    #[test]
    fn mean_percent_rounds_half_up() {
        assert_eq!(mean_percent(&[100, 100, 0]), 67);
        assert_eq!(mean_percent(&[100, 0, 0]), 33);
        assert_eq!(mean_percent(&[50, 51]), 51);
        assert_eq!(mean_percent(&[100, 100]), 100);
        assert_eq!(mean_percent(&[]), 0);
    }

    #[test]
    fn empty_evaluation_is_not_covered() {
        let eval = Evaluation {
            registry_version: 1,
            snapshot: SnapshotSummary::default(),
            claims: Vec::new(),
            lemmas: Vec::new(),
        };
        assert!(!eval.all_covered());
        assert_eq!(eval.coverage_percent(), 0);
    }

    #[test]
    fn reason_codes_render_snake_case() {
        assert_eq!(ReasonCode::RecencyTie.to_string(), "recency_tie");
        assert_eq!(
            serde_json::to_string(&ReasonCode::MissingEvidence).unwrap(),
            "\"missing_evidence\""
        );
    }

    #[test]
    fn resolution_candidates() {
        let job = MatchedJob {
            name: "attack_replay".into(),
            conclusion: Conclusion::Success,
            run_id: Some(7),
            run_attempt: 1,
            completed_at: None,
        };
        assert_eq!(Resolution::Resolved(job.clone()).candidates(), &[job]);
        assert!(Resolution::Missing.candidates().is_empty());
    }
}
