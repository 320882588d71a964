// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coverage history: one entry per distinct coverage result, tracked in git.
//
// File layout:
//   { "history": [ { "ts", "coveragePercent", "claimsCovered", "claimsTotal" } ] }
// Entries are appended oldest-first; an entry equal in coverage to the last
// one is not appended.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use claimgate_core::error::{ClaimgateError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::StatusDocument;
use crate::renderer::write_file;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// RFC 3339, UTC.
    pub ts: String,
    #[serde(alias = "coverage_pct")]
    pub coverage_percent: u8,
    #[serde(alias = "claims_covered")]
    pub claims_covered: usize,
    #[serde(alias = "claims_total")]
    pub claims_total: usize,
}

impl HistoryEntry {
    pub fn from_status(doc: &StatusDocument, ts: String) -> Self {
        Self {
            ts,
            coverage_percent: doc.summary.coverage_percent,
            claims_covered: doc.summary.claims_covered,
            claims_total: doc.summary.claims_total,
        }
    }

    /// Same coverage result, ignoring when it was recorded.
    pub fn same_coverage(&self, other: &Self) -> bool {
        self.coverage_percent == other.coverage_percent
            && self.claims_covered == other.claims_covered
            && self.claims_total == other.claims_total
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageHistory {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl CoverageHistory {
    /// Load the history file, or start empty when it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no history yet");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map_err(|e| ClaimgateError::input_parse(path.display().to_string(), e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        write_file(path, &out)
    }

    /// Append `entry` unless it repeats the last coverage result.
    /// Returns whether it was appended.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if self.history.last().is_some_and(|last| last.same_coverage(&entry)) {
            info!(ts = %entry.ts, "history unchanged (same as last entry)");
            return false;
        }
        info!(ts = %entry.ts, percent = entry.coverage_percent, "history entry appended");
        self.history.push(entry);
        true
    }

    /// The last `n` entries, newest first.
    pub fn newest(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter().rev().take(n)
    }

    /// Markdown page with the last `rows` entries.
    pub fn render_markdown(&self, rows: usize) -> String {
        let mut lines = vec!["# Coverage History".to_string(), String::new()];
        if let Some(last) = self.history.last() {
            lines.push(format!("- Updated: **{}**", last.ts));
            lines.push(String::new());
        }
        lines.extend(self.table(rows));
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// README block body with the last `rows` entries.
    pub fn readme_block(&self, rows: usize) -> String {
        let mut lines = vec!["## Coverage History (auto)".to_string(), String::new()];
        lines.extend(self.table(rows));
        lines.join("\n")
    }

    fn table(&self, rows: usize) -> Vec<String> {
        let mut lines = vec![
            "| Timestamp (UTC) | Coverage | Covered/Total |".to_string(),
            "|---|---:|---:|".to_string(),
        ];
        lines.extend(self.newest(rows).map(|e| {
            format!(
                "| {} | {}% | {}/{} |",
                e.ts, e.coverage_percent, e.claims_covered, e.claims_total
            )
        }));
        lines
    }
}

/// Current time as RFC 3339 UTC with second precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Normalise a caller-supplied timestamp to RFC 3339 UTC.
pub fn normalize_timestamp(raw: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| {
        ClaimgateError::Configuration(format!("timestamp `{raw}` is not RFC 3339: {e}"))
    })?;
    Ok(parsed
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true))
}
