// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: claims, lemmas, requirements, and job results.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a claim's coverage is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// The claim's own jobs and evidence are evaluated as one unit.
    Direct,
    /// The claim is covered iff every referenced lemma is covered.
    Lemma,
}

impl EvaluationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Lemma => "lemma",
        }
    }
}

/// One normative guarantee subject to continuous verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub id: String,
    pub title: String,
    pub mode: EvaluationMode,
    /// Direct job requirements. Always empty in lemma mode.
    pub required_jobs: Vec<String>,
    /// Referenced lemmas. Always empty in direct mode.
    pub required_lemmas: Vec<String>,
    /// Evidence artifacts the claim itself requires (allowed in both modes).
    pub evidence_paths: Vec<String>,
}

/// Reusable aggregation of job and evidence requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lemma {
    pub id: String,
    pub title: String,
    pub required_jobs: Vec<String>,
    pub evidence_paths: Vec<String>,
}

/// A logical CI job a claim or lemma depends on.
///
/// `id` is stable across repository history; `accepted` lists actual job
/// names declared in the registry alias table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequirement {
    pub id: String,
    pub accepted: Vec<String>,
}

/// A file, directory, or final-component glob that must exist and be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceRequirement {
    pub path: String,
}

impl EvidenceRequirement {
    /// Whether the last path component carries `*` or `?` wildcards.
    pub fn is_pattern(&self) -> bool {
        is_pattern(&self.path)
    }
}

/// Whether an evidence path is a glob pattern.
pub fn is_pattern(path: &str) -> bool {
    path.contains('*') || path.contains('?')
}

/// Normalised outcome of a CI job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    Success,
    Failure,
    Skipped,
    Unknown,
}

impl Conclusion {
    /// Map a raw provider conclusion/status onto the four-valued outcome.
    ///
    /// Anything not positively recognised is `Unknown`, which never counts
    /// as success.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" | "passed" | "pass" | "ok" => Self::Success,
            "failure" | "failed" | "fail" | "cancelled" | "timed_out" | "action_required"
            | "startup_failure" => Self::Failure,
            "skipped" | "neutral" => Self::Skipped,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One externally reported CI job outcome. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    /// Actual job name as reported by the provider.
    pub name: String,
    pub conclusion: Conclusion,
    /// Workflow run identifier; `None` when neither the record nor the
    /// snapshot carried one.
    pub run_id: Option<u64>,
    /// Attempt number within the run (reruns increment it).
    pub run_attempt: u32,
    /// Completion time, when the provider reported one.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Ordering key for reruns of one job; see [`JobResult::recency`].
pub type Recency = (Option<u64>, u32, Option<DateTime<Utc>>);

impl JobResult {
    /// Recency key: later runs win, then later attempts, then later
    /// completion. A missing component sorts before any present one.
    pub fn recency(&self) -> Recency {
        (self.run_id, self.run_attempt, self.completed_at)
    }

    pub fn normalized_name(&self) -> String {
        normalize_job_name(&self.name)
    }
}

/// Trim, collapse inner whitespace, and lowercase a job name.
pub fn normalize_job_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Order identifiers so that embedded numbers compare numerically
/// (`A2` < `A10`), falling back to plain string order on ties.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut ai, mut bi) = (a.char_indices().peekable(), b.char_indices().peekable());
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((sa, ca)), Some((sb, cb))) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let ea = digit_run_end(a, sa);
                    let eb = digit_run_end(b, sb);
                    let (na, nb) = (a[sa..ea].trim_start_matches('0'), b[sb..eb].trim_start_matches('0'));
                    let ord = na.len().cmp(&nb.len()).then_with(|| na.cmp(nb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    while ai.peek().is_some_and(|&(i, _)| i < ea) {
                        ai.next();
                    }
                    while bi.peek().is_some_and(|&(i, _)| i < eb) {
                        bi.next();
                    }
                } else {
                    if ca != cb {
                        return ca.cmp(&cb);
                    }
                    ai.next();
                    bi.next();
                }
            }
        }
    }
}

fn digit_run_end(s: &str, start: usize) -> usize {
    s[start..]
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| start + i)
}
