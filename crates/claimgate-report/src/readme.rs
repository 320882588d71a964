// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Marker-delimited blocks in a README (or any Markdown document).

use std::path::Path;

use claimgate_core::error::{ClaimgateError, Result};

use crate::model::StatusDocument;
use crate::renderer::write_file;

pub const MATRIX_BEGIN: &str = "<!-- BEGIN CLAIM COVERAGE MATRIX -->";
pub const MATRIX_END: &str = "<!-- END CLAIM COVERAGE MATRIX -->";
pub const HISTORY_BEGIN: &str = "<!-- BEGIN COVERAGE HISTORY -->";
pub const HISTORY_END: &str = "<!-- END COVERAGE HISTORY -->";

/// Replace everything between the first `begin` marker and the following
/// `end` marker with `body`. Markers are kept.
pub fn replace_marker_block(text: &str, begin: &str, end: &str, body: &str) -> Result<String> {
    let start = text
        .find(begin)
        .ok_or_else(|| ClaimgateError::MarkerBlock(format!("missing `{begin}`")))?;
    let after_begin = start + begin.len();
    let stop = text[after_begin..]
        .find(end)
        .map(|i| after_begin + i)
        .ok_or_else(|| ClaimgateError::MarkerBlock(format!("missing `{end}` after `{begin}`")))?;

    let mut out = String::with_capacity(text.len() + body.len());
    out.push_str(&text[..after_begin]);
    out.push_str("\n\n");
    out.push_str(body.trim_end());
    out.push_str("\n\n");
    out.push_str(&text[stop..]);
    Ok(out)
}

/// New contents of `path` with the block replaced, or `None` when the
/// block is already current. Nothing is written.
pub fn prepare_file_block(path: &Path, begin: &str, end: &str, body: &str) -> Result<Option<String>> {
    let text = std::fs::read_to_string(path)?;
    let updated = replace_marker_block(&text, begin, end, body).map_err(|e| match e {
        ClaimgateError::MarkerBlock(detail) => {
            ClaimgateError::MarkerBlock(format!("{}: {detail}", path.display()))
        }
        other => other,
    })?;
    Ok((updated != text).then_some(updated))
}

/// Rewrite the block inside `path`. Returns whether the file changed.
pub fn update_file_block(path: &Path, begin: &str, end: &str, body: &str) -> Result<bool> {
    match prepare_file_block(path, begin, end, body)? {
        Some(updated) => {
            write_file(path, &updated)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Short coverage summary for the README matrix block.
pub fn matrix_summary_block(doc: &StatusDocument, matrix_path: &str) -> String {
    let mut lines = vec![
        "## Claim Coverage (auto)".to_string(),
        String::new(),
        format!(
            "- **Coverage:** {}% ({}/{})",
            doc.summary.coverage_percent, doc.summary.claims_covered, doc.summary.claims_total
        ),
        format!("- **Overall:** {}", doc.summary.overall.as_str()),
    ];
    if let Some(ts) = &doc.generated_at {
        lines.push(format!("- **Generated:** {ts}"));
    }
    lines.push(format!("- **Matrix:** `{matrix_path}`"));
    if doc.summary.lemma_layer {
        lines.push("- **Lemma layer:** enabled".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const README: &str = "# Project\n\nintro\n\n<!-- BEGIN CLAIM COVERAGE MATRIX -->\nold\n<!-- END CLAIM COVERAGE MATRIX -->\n\ntail\n";

    #[test]
    fn replaces_only_the_block() {
        let out = replace_marker_block(README, MATRIX_BEGIN, MATRIX_END, "new body\n").unwrap();
        assert_eq!(
            out,
            "# Project\n\nintro\n\n<!-- BEGIN CLAIM COVERAGE MATRIX -->\n\nnew body\n\n<!-- END CLAIM COVERAGE MATRIX -->\n\ntail\n"
        );
    }

    #[test]
    fn replacement_is_idempotent() {
        let once = replace_marker_block(README, MATRIX_BEGIN, MATRIX_END, "body").unwrap();
        let twice = replace_marker_block(&once, MATRIX_BEGIN, MATRIX_END, "body").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_markers_are_reported() {
        assert!(matches!(
            replace_marker_block("no markers", MATRIX_BEGIN, MATRIX_END, "x"),
            Err(ClaimgateError::MarkerBlock(_))
        ));
        let reversed = format!("{MATRIX_END}\n{MATRIX_BEGIN}\n");
        assert!(replace_marker_block(&reversed, MATRIX_BEGIN, MATRIX_END, "x").is_err());
    }

    #[test]
    fn file_block_reports_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, README).unwrap();
        assert!(update_file_block(&path, MATRIX_BEGIN, MATRIX_END, "body").unwrap());
        assert!(!update_file_block(&path, MATRIX_BEGIN, MATRIX_END, "body").unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("\nbody\n"));
    }

    #[test]
    fn prepared_block_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, README).unwrap();
        let updated = prepare_file_block(&path, MATRIX_BEGIN, MATRIX_END, "body").unwrap();
        assert!(updated.is_some_and(|text| text.contains("\nbody\n")));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), README);

        let err = prepare_file_block(&path, HISTORY_BEGIN, HISTORY_END, "body").unwrap_err();
        assert!(err.to_string().contains("README.md"), "{err}");
    }
}
