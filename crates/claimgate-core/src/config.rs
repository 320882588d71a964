// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClaimgateError, Result};

/// Where the engine reads its inputs and writes its outputs.
///
/// Every field has a default matching the conventional repository layout,
/// so an empty JSON object is a valid configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Claim registry (YAML).
    pub registry_path: PathBuf,
    /// Job-result snapshot produced by the CI fetcher (JSON).
    pub jobs_path: PathBuf,
    /// Directory that relative evidence paths are resolved against.
    pub evidence_root: PathBuf,
    /// Optional evidence manifest used instead of probing the filesystem.
    pub evidence_manifest: Option<PathBuf>,
    /// Structured status output (JSON).
    pub status_json_path: PathBuf,
    /// Human-readable coverage matrix (Markdown).
    pub matrix_md_path: PathBuf,
    /// README carrying the coverage marker blocks, if it should be updated.
    pub readme_path: Option<PathBuf>,
    /// Coverage history (JSON, tracked).
    pub history_json_path: PathBuf,
    /// Coverage history table (Markdown, tracked).
    pub history_md_path: PathBuf,
    /// Number of history entries shown in the Markdown table.
    pub history_md_rows: usize,
    /// Number of history entries injected into the README.
    pub history_readme_rows: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("claims/claims.yaml"),
            jobs_path: PathBuf::from("out/ci/actions_jobs.json"),
            evidence_root: PathBuf::from("."),
            evidence_manifest: None,
            status_json_path: PathBuf::from("out/ci/claim_status.json"),
            matrix_md_path: PathBuf::from("docs/claim_coverage_matrix.md"),
            readme_path: None,
            history_json_path: PathBuf::from("docs/coverage_history.json"),
            history_md_path: PathBuf::from("docs/coverage_history.md"),
            history_md_rows: 30,
            history_readme_rows: 5,
        }
    }
}

impl EngineConfig {
    /// Load a configuration file, falling back to defaults for absent fields.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| ClaimgateError::Configuration(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.history_md_rows, 30);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: std::result::Result<EngineConfig, _> =
            serde_json::from_str(r#"{ "registry": "claims.yaml" }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn partial_override() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{ "evidence_root": "/srv/repo", "history_readme_rows": 3 }"#)
                .unwrap();
        assert_eq!(cfg.evidence_root, PathBuf::from("/srv/repo"));
        assert_eq!(cfg.history_readme_rows, 3);
        assert_eq!(cfg.jobs_path, PathBuf::from("out/ci/actions_jobs.json"));
    }
}
