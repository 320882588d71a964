// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Claimgate.
//
// Only fatal conditions live here. A job that cannot be matched or an
// evidence file that is absent is not an error: it is an unsatisfied
// requirement carried in the claim status (see `status::ReasonCode`).

use thiserror::Error;

/// Exit status for a run where at least one claim is not covered.
pub const EXIT_NOT_COVERED: u8 = 1;

/// Exit status for a run aborted by a configuration or input error.
pub const EXIT_FATAL: u8 = 2;

/// Top-level error type for all Claimgate operations.
#[derive(Debug, Error)]
pub enum ClaimgateError {
    // -- Registry --
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unsupported registry version {0} (supported: 1)")]
    UnsupportedRegistryVersion(u32),

    // -- Snapshots supplied by collaborators --
    #[error("malformed input {input}: {detail}")]
    InputParse { input: String, detail: String },

    // -- Report side-outputs --
    #[error("marker block not found: {0}")]
    MarkerBlock(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ClaimgateError {
    /// Shorthand for an `InputParse` error.
    pub fn input_parse(input: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InputParse {
            input: input.into(),
            detail: detail.into(),
        }
    }

    /// Process exit status for this error.
    ///
    /// Always distinct from [`EXIT_NOT_COVERED`] so a broken run can never be
    /// read as an ordinary claim failure.
    pub fn exit_code(&self) -> u8 {
        EXIT_FATAL
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ClaimgateError>;
