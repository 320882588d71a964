// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structured status document: the stable, diffable record of one run.
//
// Field names are part of the public contract: third parties diff these
// documents across runs, so fields are only ever added, never renamed.
// Both the JSON output and the Markdown matrix render from this one value.

use chrono::{DateTime, Utc};
use claimgate_core::status::{
    ClaimStatus, Evaluation, EvidenceOutcome, JobOutcome, LemmaStatus, MatchedJob, ReasonCode,
    SnapshotSummary,
};
use claimgate_core::types::{Conclusion, EvaluationMode};
use serde::{Deserialize, Serialize};

/// Version of the status document layout.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDocument {
    pub schema_version: u32,
    pub registry_version: u32,
    /// Only present when the caller supplied a timestamp explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub summary: Summary,
    #[serde(default)]
    pub snapshot: SnapshotRecord,
    pub claims: Vec<ClaimRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lemmas: Vec<LemmaRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub claims_covered: usize,
    pub claims_total: usize,
    pub coverage_percent: u8,
    pub overall: Verdict,
    pub lemma_layer: bool,
}

/// Where the job results came from, and every record as ingested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<u64>,
    pub jobs: Vec<MatchRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub id: String,
    pub title: String,
    pub mode: EvaluationMode,
    pub covered: bool,
    pub coverage_percent: u8,
    pub required_jobs: Vec<String>,
    pub required_evidence: Vec<String>,
    pub required_lemmas: Vec<String>,
    pub missing_jobs: Vec<String>,
    pub missing_evidence: Vec<String>,
    pub missing_lemmas: Vec<String>,
    pub jobs: Vec<JobRecord>,
    pub evidence: Vec<EvidenceRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LemmaRecord {
    pub id: String,
    pub title: String,
    pub covered: bool,
    pub coverage_percent: u8,
    pub required_jobs: Vec<String>,
    pub required_evidence: Vec<String>,
    pub missing_jobs: Vec<String>,
    pub missing_evidence: Vec<String>,
    pub jobs: Vec<JobRecord>,
    pub evidence: Vec<EvidenceRecord>,
}

/// How one required job id was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub required: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accepted: Vec<String>,
    /// `resolved`, `missing`, `ambiguous`, or `recency_tie`.
    pub resolution: String,
    pub matched: Vec<MatchRecord>,
    pub satisfied: bool,
    pub reason: ReasonCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub name: String,
    pub conclusion: Conclusion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<u64>,
    pub run_attempt: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
    pub path: String,
    pub exists: bool,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir_entries: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub satisfied: bool,
    pub reason: ReasonCode,
}

impl StatusDocument {
    pub fn from_evaluation(evaluation: &Evaluation, generated_at: Option<String>) -> Self {
        let overall = if evaluation.all_covered() {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        Self {
            schema_version: SCHEMA_VERSION,
            registry_version: evaluation.registry_version,
            generated_at,
            summary: Summary {
                claims_covered: evaluation.claims_covered(),
                claims_total: evaluation.claims_total(),
                coverage_percent: evaluation.coverage_percent(),
                overall,
                lemma_layer: evaluation.lemma_layer(),
            },
            snapshot: SnapshotRecord::from(&evaluation.snapshot),
            claims: evaluation.claims.iter().map(ClaimRecord::from).collect(),
            lemmas: evaluation.lemmas.iter().map(LemmaRecord::from).collect(),
        }
    }

    pub fn passed(&self) -> bool {
        self.summary.overall == Verdict::Pass
    }
}

impl From<&SnapshotSummary> for SnapshotRecord {
    fn from(s: &SnapshotSummary) -> Self {
        Self {
            repo: s.repo.clone(),
            run_id: s.run_id,
            jobs: s.jobs.iter().map(MatchRecord::from).collect(),
        }
    }
}

impl From<&ClaimStatus> for ClaimRecord {
    fn from(c: &ClaimStatus) -> Self {
        Self {
            id: c.id.clone(),
            title: c.title.clone(),
            mode: c.mode,
            covered: c.covered,
            coverage_percent: c.coverage_percent,
            required_jobs: c.required_jobs.clone(),
            required_evidence: c.required_evidence.clone(),
            required_lemmas: c.required_lemmas.clone(),
            missing_jobs: c.missing_jobs.clone(),
            missing_evidence: c.missing_evidence.clone(),
            missing_lemmas: c.missing_lemmas.clone(),
            jobs: c.jobs.iter().map(JobRecord::from).collect(),
            evidence: c.evidence.iter().map(EvidenceRecord::from).collect(),
        }
    }
}

impl From<&LemmaStatus> for LemmaRecord {
    fn from(l: &LemmaStatus) -> Self {
        Self {
            id: l.id.clone(),
            title: l.title.clone(),
            covered: l.covered,
            coverage_percent: l.coverage_percent,
            required_jobs: l.jobs.iter().map(|j| j.required.clone()).collect(),
            required_evidence: l.evidence.iter().map(|e| e.path.clone()).collect(),
            missing_jobs: l.missing_jobs().map(str::to_string).collect(),
            missing_evidence: l.missing_evidence().map(str::to_string).collect(),
            jobs: l.jobs.iter().map(JobRecord::from).collect(),
            evidence: l.evidence.iter().map(EvidenceRecord::from).collect(),
        }
    }
}

impl From<&JobOutcome> for JobRecord {
    fn from(j: &JobOutcome) -> Self {
        Self {
            required: j.required.clone(),
            accepted: j.accepted.clone(),
            resolution: j.resolution.kind().to_string(),
            matched: j.resolution.candidates().iter().map(MatchRecord::from).collect(),
            satisfied: j.satisfied(),
            reason: j.reason,
        }
    }
}

impl From<&MatchedJob> for MatchRecord {
    fn from(m: &MatchedJob) -> Self {
        Self {
            name: m.name.clone(),
            conclusion: m.conclusion,
            run_id: m.run_id,
            run_attempt: m.run_attempt,
            completed_at: m.completed_at,
        }
    }
}

impl From<&EvidenceOutcome> for EvidenceRecord {
    fn from(e: &EvidenceOutcome) -> Self {
        Self {
            path: e.path.clone(),
            exists: e.state.exists,
            size_bytes: e.state.size_bytes,
            sha256: e.state.sha256.clone(),
            matches: e.state.matches.clone(),
            dir_entries: e.state.dir_entries,
            error: e.state.error.clone(),
            satisfied: e.satisfied(),
            reason: e.reason,
        }
    }
}
