// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! claimgate-report: the only crate that formats anything.
//!
//! Both canonical outputs (status JSON and the coverage matrix) are rendered
//! from one [`StatusDocument`], so they cannot disagree. README marker
//! blocks, coverage history, and alias suggestions live here as well.

pub mod history;
pub mod json;
pub mod markdown;
pub mod model;
pub mod readme;
pub mod renderer;
pub mod suggestions;

pub use history::{CoverageHistory, HistoryEntry, normalize_timestamp, now_timestamp};
pub use json::{read_status, render_json};
pub use markdown::render_markdown;
pub use model::{StatusDocument, Verdict};
pub use readme::{
    matrix_summary_block, prepare_file_block, replace_marker_block, update_file_block,
};
pub use renderer::{RenderedReport, ReportRenderer, remove_stale_outputs, write_file};
pub use suggestions::{render_alias_snippet, render_suggestion_report};
