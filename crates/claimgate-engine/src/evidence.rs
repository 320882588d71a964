// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Evidence snapshot: existence and non-emptiness of required artifacts.
//
// Every required path is probed exactly once, up front, and the result is
// frozen. Evaluation reads the snapshot, never the filesystem, so every
// claim sees the same evidence.
//
// A path may be:
//   - a file: present iff readable with size > 0 (SHA-256 recorded);
//   - a directory: present iff it has at least one entry;
//   - a pattern with `*`/`?` in its last component: matched against the
//     parent directory's files; present iff at least one match is non-empty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use claimgate_core::error::{ClaimgateError, Result};
use claimgate_core::status::EvidenceState;
use claimgate_core::types::EvidenceRequirement;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::integrity::hash_file;

/// Frozen view of every required evidence path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceSnapshot {
    entries: BTreeMap<String, EvidenceState>,
}

impl EvidenceSnapshot {
    /// Build a snapshot from known states (tests, external probes).
    pub fn from_states<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = (S, EvidenceState)>,
        S: Into<String>,
    {
        Self {
            entries: states.into_iter().map(|(p, s)| (p.into(), s)).collect(),
        }
    }

    /// Probe every requirement on the filesystem under `root`.
    ///
    /// Probe failures are recorded in the state, not returned: an unreadable
    /// artifact is an unsatisfied requirement, not a fatal error.
    #[instrument(skip_all, fields(root = %root.display(), paths = requirements.len()))]
    pub fn capture(root: &Path, requirements: &[EvidenceRequirement]) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for req in requirements {
            let state = if req.is_pattern() {
                probe_pattern(root, &req.path)?
            } else {
                probe_path(&root.join(&req.path))
            };
            debug!(path = %req.path, exists = state.exists, size = state.size_bytes, "evidence probed");
            entries.insert(req.path.clone(), state);
        }
        Ok(Self { entries })
    }

    /// Build a snapshot from a JSON manifest instead of the filesystem.
    ///
    /// ```json
    /// { "artifacts": [ { "path": "audit.log", "size": 512, "sha256": "…" } ] }
    /// ```
    pub fn from_manifest_str(
        text: &str,
        origin: &str,
        requirements: &[EvidenceRequirement],
    ) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(text)
            .map_err(|e| ClaimgateError::input_parse(origin, e.to_string()))?;

        let mut artifacts: BTreeMap<String, &ManifestArtifact> = BTreeMap::new();
        for artifact in &manifest.artifacts {
            let key = clean_path(&artifact.path);
            if key.is_empty() {
                return Err(ClaimgateError::input_parse(origin, "artifact with a blank path"));
            }
            if artifacts.insert(key.clone(), artifact).is_some() {
                return Err(ClaimgateError::input_parse(
                    origin,
                    format!("artifact `{key}` listed twice"),
                ));
            }
        }

        let mut entries = BTreeMap::new();
        for req in requirements {
            let wanted = clean_path(&req.path);
            let state = if req.is_pattern() {
                let (parent, re) = split_pattern(&wanted)?;
                let matches: Vec<(&String, &&ManifestArtifact)> = artifacts
                    .iter()
                    .filter(|(path, _)| {
                        let (dir, name) = split_parent(path);
                        dir == parent && re.is_match(name)
                    })
                    .collect();
                EvidenceState {
                    exists: !matches.is_empty(),
                    size_bytes: matches.iter().map(|(_, a)| a.size).sum(),
                    matches: matches.iter().map(|(p, _)| (*p).clone()).collect(),
                    ..EvidenceState::default()
                }
            } else if let Some(artifact) = artifacts.get(&wanted) {
                EvidenceState {
                    exists: true,
                    size_bytes: artifact.size,
                    sha256: artifact.sha256.clone(),
                    ..EvidenceState::default()
                }
            } else {
                // A directory is present in a manifest through its children.
                let prefix = format!("{wanted}/");
                let children = artifacts.keys().filter(|p| p.starts_with(&prefix)).count();
                EvidenceState {
                    exists: children > 0,
                    dir_entries: (children > 0).then_some(children as u64),
                    ..EvidenceState::default()
                }
            };
            entries.insert(req.path.clone(), state);
        }
        Ok(Self { entries })
    }

    /// Read a manifest file and build the snapshot from it.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load_manifest(path: &Path, requirements: &[EvidenceRequirement]) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClaimgateError::input_parse(path.display().to_string(), e.to_string())
        })?;
        Self::from_manifest_str(&text, &path.display().to_string(), requirements)
    }

    /// The recorded state for `path`, if it was part of the snapshot.
    pub fn state(&self, path: &str) -> Option<&EvidenceState> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    artifacts: Vec<ManifestArtifact>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestArtifact {
    path: String,
    size: u64,
    #[serde(default)]
    sha256: Option<String>,
}

fn probe_path(path: &Path) -> EvidenceState {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return EvidenceState::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "evidence unreadable");
            return EvidenceState {
                error: Some(e.to_string()),
                ..EvidenceState::default()
            };
        }
    };

    if meta.is_dir() {
        return match std::fs::read_dir(path) {
            Ok(entries) => {
                let count = entries.filter(|e| e.is_ok()).count() as u64;
                EvidenceState {
                    exists: true,
                    dir_entries: Some(count),
                    ..EvidenceState::default()
                }
            }
            Err(e) => EvidenceState {
                exists: true,
                error: Some(e.to_string()),
                ..EvidenceState::default()
            },
        };
    }

    let mut state = EvidenceState {
        exists: true,
        size_bytes: meta.len(),
        ..EvidenceState::default()
    };
    if state.size_bytes > 0 {
        match hash_file(path) {
            Ok(digest) => state.sha256 = Some(digest),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "evidence unreadable");
                state.error = Some(e.to_string());
            }
        }
    }
    state
}

fn probe_pattern(root: &Path, pattern: &str) -> Result<EvidenceState> {
    let cleaned = clean_path(pattern);
    let (parent, re) = split_pattern(&cleaned)?;
    let dir: PathBuf = if parent.is_empty() {
        root.to_path_buf()
    } else {
        root.join(parent)
    };

    let listing = match std::fs::read_dir(&dir) {
        Ok(listing) => listing,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(EvidenceState::default()),
        Err(e) => {
            return Ok(EvidenceState {
                error: Some(e.to_string()),
                ..EvidenceState::default()
            });
        }
    };

    let mut names: Vec<String> = listing
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| re.is_match(name))
        .collect();
    names.sort();

    let mut state = EvidenceState::default();
    for name in names {
        let file = dir.join(&name);
        let size = std::fs::metadata(&file).map(|m| m.len()).unwrap_or(0);
        state.exists = true;
        state.size_bytes += size;
        state.matches.push(if parent.is_empty() {
            name
        } else {
            format!("{parent}/{name}")
        });
    }
    Ok(state)
}

/// Strip a leading `./` and trailing `/` so manifest and registry paths compare.
fn clean_path(path: &str) -> String {
    let trimmed = path.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    trimmed.trim_end_matches('/').to_string()
}

fn split_parent(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

/// Split a pattern into its literal parent directory and a compiled matcher
/// for the final component.
fn split_pattern(pattern: &str) -> Result<(&str, Regex)> {
    let (parent, name) = split_parent(pattern);
    let mut expr = String::from("^");
    for ch in name.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    let re = Regex::new(&expr).map_err(|e| {
        ClaimgateError::Configuration(format!("evidence pattern `{pattern}`: {e}"))
    })?;
    Ok((parent, re))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn reqs(paths: &[&str]) -> Vec<EvidenceRequirement> {
        paths
            .iter()
            .map(|p| EvidenceRequirement { path: p.to_string() })
            .collect()
    }

    #[test]
    fn file_states() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("audit.log"), b"zeroize ok\n").unwrap();
        fs::write(dir.path().join("empty.log"), b"").unwrap();

        let snap =
            EvidenceSnapshot::capture(dir.path(), &reqs(&["audit.log", "empty.log", "gone.log"]))
                .unwrap();

        let audit = snap.state("audit.log").unwrap();
        assert!(audit.exists);
        assert_eq!(audit.size_bytes, 11);
        assert_eq!(
            audit.sha256.as_deref(),
            Some("114029a98d1bf1cc5f4c6a76b24b6df66dbe8aa6615b4cd8a91dc82e4a653a92")
        );

        let empty = snap.state("empty.log").unwrap();
        assert!(empty.exists);
        assert_eq!(empty.size_bytes, 0);
        assert!(empty.sha256.is_none());

        assert!(!snap.state("gone.log").unwrap().exists);
    }

    #[test]
    fn directory_states() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("proofs")).unwrap();
        fs::create_dir(dir.path().join("hollow")).unwrap();
        fs::write(dir.path().join("proofs/tamarin.spthy"), b"lemma").unwrap();

        let snap = EvidenceSnapshot::capture(dir.path(), &reqs(&["proofs", "hollow"])).unwrap();
        assert_eq!(snap.state("proofs").unwrap().dir_entries, Some(1));
        assert_eq!(snap.state("hollow").unwrap().dir_entries, Some(0));
    }

    #[test]
    fn pattern_states() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("logs")).unwrap();
        fs::write(dir.path().join("logs/run1.log"), b"a").unwrap();
        fs::write(dir.path().join("logs/run2.log"), b"bb").unwrap();
        fs::write(dir.path().join("logs/notes.txt"), b"ccc").unwrap();

        let snap =
            EvidenceSnapshot::capture(dir.path(), &reqs(&["logs/*.log", "logs/*.json", "none/*.log"]))
                .unwrap();
        let logs = snap.state("logs/*.log").unwrap();
        assert!(logs.exists);
        assert_eq!(logs.size_bytes, 3);
        assert_eq!(logs.matches, vec!["logs/run1.log", "logs/run2.log"]);
        assert!(!snap.state("logs/*.json").unwrap().exists);
        assert!(!snap.state("none/*.log").unwrap().exists);
    }

    #[test]
    fn manifest_snapshot() {
        let manifest = r#"{ "artifacts": [
            { "path": "./audit.log", "size": 12, "sha256": "ab" },
            { "path": "logs/run1.log", "size": 0 },
            { "path": "proofs/a.spthy", "size": 4 }
        ] }"#;
        let snap = EvidenceSnapshot::from_manifest_str(
            manifest,
            "evidence.json",
            &reqs(&["audit.log", "logs/*.log", "proofs", "missing.log"]),
        )
        .unwrap();
        assert_eq!(snap.state("audit.log").unwrap().sha256.as_deref(), Some("ab"));
        let logs = snap.state("logs/*.log").unwrap();
        assert!(logs.exists);
        assert_eq!(logs.size_bytes, 0);
        assert_eq!(snap.state("proofs").unwrap().dir_entries, Some(1));
        assert!(!snap.state("missing.log").unwrap().exists);
    }

    #[test]
    fn malformed_manifest_is_input_error() {
        let err = EvidenceSnapshot::from_manifest_str("{ \"artifacts\": 3 }", "evidence.json", &[])
            .unwrap_err();
        assert!(matches!(err, ClaimgateError::InputParse { .. }));

        let dup = r#"{ "artifacts": [ { "path": "a", "size": 1 }, { "path": "./a", "size": 1 } ] }"#;
        assert!(EvidenceSnapshot::from_manifest_str(dup, "evidence.json", &[]).is_err());
    }

    #[test]
    fn glob_translation_escapes_literals() {
        let (parent, re) = split_pattern("out/audit.v?.*").unwrap();
        assert_eq!(parent, "out");
        assert!(re.is_match("audit.v1.log"));
        assert!(!re.is_match("auditXv1.log"));
    }
}
