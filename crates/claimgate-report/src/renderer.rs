// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ReportRenderer: builds both canonical outputs from one evaluation.

use std::fs;
use std::path::Path;

use claimgate_core::error::Result;
use claimgate_core::status::Evaluation;
use tracing::{debug, instrument};

use crate::json::render_json;
use crate::markdown::render_markdown;
use crate::model::StatusDocument;

/// Builder over a finished evaluation.
///
/// ```ignore
/// let report = ReportRenderer::new(&evaluation)
///     .generated_at(Some(ts))
///     .render()?;
/// report.write_to(&config.status_json_path, &config.matrix_md_path)?;
/// ```
#[derive(Debug, Clone)]
pub struct ReportRenderer<'a> {
    evaluation: &'a Evaluation,
    generated_at: Option<String>,
}

/// Both outputs, rendered from the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub document: StatusDocument,
    pub json: String,
    pub markdown: String,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(evaluation: &'a Evaluation) -> Self {
        Self {
            evaluation,
            generated_at: None,
        }
    }

    /// Stamp the outputs. Without this the outputs carry no wall-clock data.
    pub fn generated_at(mut self, ts: Option<String>) -> Self {
        self.generated_at = ts;
        self
    }

    pub fn document(&self) -> StatusDocument {
        StatusDocument::from_evaluation(self.evaluation, self.generated_at.clone())
    }

    pub fn render(&self) -> Result<RenderedReport> {
        let document = self.document();
        let json = render_json(&document)?;
        let markdown = render_markdown(&document);
        Ok(RenderedReport {
            document,
            json,
            markdown,
        })
    }
}

impl RenderedReport {
    /// Write the status JSON and the Markdown matrix, creating parent
    /// directories as needed.
    #[instrument(skip_all, fields(json = %json_path.display(), markdown = %markdown_path.display()))]
    pub fn write_to(&self, json_path: &Path, markdown_path: &Path) -> Result<()> {
        write_file(json_path, &self.json)?;
        write_file(markdown_path, &self.markdown)?;
        debug!("reports written");
        Ok(())
    }
}

/// Replace `path` in one step so a reader never sees a half-written report.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let staging = path.with_extension("partial");
    fs::write(&staging, contents)?;
    fs::rename(&staging, path)?;
    Ok(())
}

/// Remove previously written outputs so a fatal run cannot leave a stale
/// report that looks current. Absent files are fine.
pub fn remove_stale_outputs(paths: &[&Path]) -> Result<()> {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed stale output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
