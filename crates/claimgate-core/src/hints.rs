// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language explanations for fatal errors.
//
// A fatal error must never look like a failed claim, so every hint is
// framed as "the run itself is broken" with the fix that unblocks it.

use crate::error::ClaimgateError;

/// Which collaborator has to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    /// The claim registry needs editing.
    Registry,
    /// The job snapshot or evidence manifest is broken; re-fetch it.
    Snapshot,
    /// Filesystem or environment problem.
    Environment,
}

impl HintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::Snapshot => "snapshot",
            Self::Environment => "environment",
        }
    }
}

/// A fatal error rendered for the person running the gate.
#[derive(Debug, Clone)]
pub struct ErrorHint {
    /// One-line summary.
    pub message: String,
    /// What to do next.
    pub suggestion: String,
    pub kind: HintKind,
}

/// Explain a `ClaimgateError`.
pub fn explain_error(err: &ClaimgateError) -> ErrorHint {
    match err {
        ClaimgateError::Configuration(detail) => ErrorHint {
            message: "The claim registry is invalid; no claim was evaluated.".into(),
            suggestion: format!("Fix the registry and re-run. ({detail})"),
            kind: HintKind::Registry,
        },

        ClaimgateError::UnsupportedRegistryVersion(v) => ErrorHint {
            message: format!("The claim registry declares version {v}, which this tool cannot read."),
            suggestion: "Set `version: 1` or upgrade claimgate.".into(),
            kind: HintKind::Registry,
        },

        ClaimgateError::InputParse { input, detail } => ErrorHint {
            message: format!("The input snapshot {input} could not be parsed; no claim was evaluated."),
            suggestion: format!("Re-fetch the CI results and check the file is complete. ({detail})"),
            kind: HintKind::Snapshot,
        },

        ClaimgateError::MarkerBlock(detail) => ErrorHint {
            message: "A marker block was not found in the target document.".into(),
            suggestion: format!("Add the BEGIN/END marker comments. ({detail})"),
            kind: HintKind::Environment,
        },

        ClaimgateError::Io(e) => match e.kind() {
            std::io::ErrorKind::NotFound => ErrorHint {
                message: "A required input file does not exist.".into(),
                suggestion: format!("Check the configured paths. ({e})"),
                kind: HintKind::Environment,
            },
            std::io::ErrorKind::PermissionDenied => ErrorHint {
                message: "A file could not be accessed.".into(),
                suggestion: format!("Check file permissions. ({e})"),
                kind: HintKind::Environment,
            },
            _ => ErrorHint {
                message: "A file operation failed.".into(),
                suggestion: e.to_string(),
                kind: HintKind::Environment,
            },
        },

        ClaimgateError::Serialization(e) => ErrorHint {
            message: "A JSON document could not be read or written.".into(),
            suggestion: e.to_string(),
            kind: HintKind::Snapshot,
        },

        ClaimgateError::Yaml(e) => ErrorHint {
            message: "A YAML document could not be written.".into(),
            suggestion: e.to_string(),
            kind: HintKind::Environment,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_points_at_registry() {
        let hint = explain_error(&ClaimgateError::Configuration("undefined lemma L_x".into()));
        assert_eq!(hint.kind, HintKind::Registry);
        assert!(hint.suggestion.contains("L_x"));
        assert!(hint.message.contains("no claim was evaluated"));
    }

    #[test]
    fn parse_error_points_at_snapshot() {
        let hint = explain_error(&ClaimgateError::input_parse("jobs.json", "EOF"));
        assert_eq!(hint.kind, HintKind::Snapshot);
        assert!(hint.message.contains("jobs.json"));
    }

    #[test]
    fn missing_file_is_environment() {
        let err = ClaimgateError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(explain_error(&err).kind, HintKind::Environment);
        assert_eq!(HintKind::Environment.as_str(), "environment");
    }
}
