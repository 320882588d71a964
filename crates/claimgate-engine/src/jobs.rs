// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job-result snapshot: normalised view of the CI fetcher's output.
//
// Accepted shapes (all produced by some version of the fetcher):
//   { "repo": "...", "run_id": 123, "jobs": [ {...}, ... ] }
//   { "raw": { "jobs": [ ... ] } }
//   [ {...}, ... ]
//
// Anything else, or any record that cannot be read, is an InputParse error
// for the whole snapshot. Records are never silently skipped.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use claimgate_core::error::{ClaimgateError, Result};
use claimgate_core::status::{MatchedJob, SnapshotSummary};
use claimgate_core::types::{Conclusion, JobResult, normalize_job_name};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Immutable snapshot of CI job outcomes.
#[derive(Debug, Clone, Default)]
pub struct JobResultSet {
    repo: Option<String>,
    run_id: Option<u64>,
    results: Vec<JobResult>,
    /// Normalised job name -> indices into `results`, in input order.
    index: BTreeMap<String, Vec<usize>>,
}

impl JobResultSet {
    /// Build a snapshot from already-typed results.
    pub fn from_results(results: Vec<JobResult>) -> Self {
        let mut set = Self {
            results,
            ..Self::default()
        };
        set.reindex();
        set
    }

    /// Parse the fetcher's JSON document. `origin` names the input in errors.
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| ClaimgateError::input_parse(origin, e.to_string()))?;

        let (records, repo, run_id) = match &root {
            Value::Array(items) => (items, None, None),
            Value::Object(obj) => {
                let repo = obj.get("repo").and_then(Value::as_str).map(str::to_string);
                let run_id = read_run_id(obj.get("run_id"), origin, "document")?;
                (jobs_list(obj, origin)?, repo, run_id)
            }
            _ => {
                return Err(ClaimgateError::input_parse(
                    origin,
                    "expected a JSON object with a `jobs` list, or a list of job records",
                ));
            }
        };

        let mut results = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            results.push(parse_record(record, i, run_id, origin)?);
        }

        let mut set = Self::from_results(results);
        set.repo = repo;
        set.run_id = run_id;
        Ok(set)
    }

    /// Read and parse the snapshot file at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClaimgateError::input_parse(path.display().to_string(), e.to_string())
        })?;
        let set = Self::from_json_str(&text, &path.display().to_string())?;
        debug!(jobs = set.len(), run_id = ?set.run_id, "job snapshot loaded");
        Ok(set)
    }

    /// Snapshot provenance plus every record, sorted by name then recency.
    pub fn summary(&self) -> SnapshotSummary {
        let mut records: Vec<&JobResult> = self.results.iter().collect();
        records.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.recency().cmp(&b.recency()))
                .then_with(|| a.conclusion.as_str().cmp(b.conclusion.as_str()))
        });
        SnapshotSummary {
            repo: self.repo.clone(),
            run_id: self.run_id,
            jobs: records.into_iter().map(MatchedJob::from).collect(),
        }
    }

    pub fn results(&self) -> &[JobResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&JobResult> {
        self.results.get(idx)
    }

    /// Indices of results whose normalised name equals `normalized`.
    pub fn indices_for(&self, normalized: &str) -> &[usize] {
        self.index.get(normalized).map_or(&[], Vec::as_slice)
    }

    /// Distinct actual job names, sorted.
    pub fn actual_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.results.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, r) in self.results.iter().enumerate() {
            self.index.entry(r.normalized_name()).or_default().push(i);
        }
    }
}

fn jobs_list<'a>(obj: &'a Map<String, Value>, origin: &str) -> Result<&'a Vec<Value>> {
    match obj.get("jobs") {
        Some(Value::Array(items)) => return Ok(items),
        Some(_) => {
            return Err(ClaimgateError::input_parse(origin, "`jobs` must be a list"));
        }
        None => {}
    }
    match obj.get("raw").and_then(|raw| raw.get("jobs")) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ClaimgateError::input_parse(origin, "`raw.jobs` must be a list")),
        None => Err(ClaimgateError::input_parse(
            origin,
            "no `jobs` list found (checked `jobs` and `raw.jobs`)",
        )),
    }
}

fn parse_record(
    record: &Value,
    i: usize,
    default_run_id: Option<u64>,
    origin: &str,
) -> Result<JobResult> {
    let obj = record.as_object().ok_or_else(|| {
        ClaimgateError::input_parse(origin, format!("job record {i} is not an object"))
    })?;
    let what = format!("job record {i}");

    let name = ["name", "job_name"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ClaimgateError::input_parse(origin, format!("{what} has no name")))?;

    let mut conclusion = Conclusion::Unknown;
    for key in ["conclusion", "result", "status"] {
        match obj.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.trim().is_empty() => continue,
            Some(Value::String(s)) => {
                conclusion = Conclusion::from_raw(s);
                break;
            }
            Some(other) => {
                return Err(ClaimgateError::input_parse(
                    origin,
                    format!("{what}: `{key}` must be a string, got {other}"),
                ));
            }
        }
    }

    let run_id = read_run_id(obj.get("run_id"), origin, &what)?.or(default_run_id);

    let run_attempt = match obj.get("run_attempt") {
        None | Some(Value::Null) => 1,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n >= 1)
            .ok_or_else(|| {
                ClaimgateError::input_parse(
                    origin,
                    format!("{what}: `run_attempt` must be a positive integer"),
                )
            })?,
    };

    let completed_at = match obj.get("completed_at") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(
            DateTime::parse_from_rfc3339(s.trim())
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| {
                    ClaimgateError::input_parse(
                        origin,
                        format!("{what}: `completed_at` `{s}` is not RFC 3339: {e}"),
                    )
                })?,
        ),
        Some(_) => {
            return Err(ClaimgateError::input_parse(
                origin,
                format!("{what}: `completed_at` must be a string"),
            ));
        }
    };

    Ok(JobResult {
        name: name.to_string(),
        conclusion,
        run_id,
        run_attempt,
        completed_at,
    })
}

/// Run ids arrive as numbers or numeric strings depending on the fetcher.
fn read_run_id(value: Option<&Value>, origin: &str, what: &str) -> Result<Option<u64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            ClaimgateError::input_parse(origin, format!("{what}: `run_id` must be non-negative"))
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().map(Some).map_err(|_| {
            ClaimgateError::input_parse(origin, format!("{what}: `run_id` `{s}` is not numeric"))
        }),
        Some(_) => Err(ClaimgateError::input_parse(
            origin,
            format!("{what}: `run_id` must be a number"),
        )),
    }
}
