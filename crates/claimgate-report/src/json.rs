// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Status JSON rendering.

use std::path::Path;

use claimgate_core::error::{ClaimgateError, Result};

use crate::model::StatusDocument;

/// Pretty-printed JSON with a trailing newline. Field order is the struct
/// declaration order, so identical evaluations give identical bytes.
pub fn render_json(doc: &StatusDocument) -> Result<String> {
    let mut out = serde_json::to_string_pretty(doc)?;
    out.push('\n');
    Ok(out)
}

/// Read a status document written by a previous run.
pub fn read_status(path: &Path) -> Result<StatusDocument> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ClaimgateError::input_parse(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&text)
        .map_err(|e| ClaimgateError::input_parse(path.display().to_string(), e.to_string()))
}
