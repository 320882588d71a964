// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coverage matrix rendering.
//
// Layout:
//   summary bullets
//   ## Lemma Summary   (only when the registry has lemmas)
//   ## Claim Summary   one row per claim
//   ## Claim Details   one section per claim, same order as the summary
//   ## Jobs Snapshot   provenance and every ingested job record

use claimgate_core::types::EvaluationMode;

use crate::model::{
    ClaimRecord, EvidenceRecord, JobRecord, LemmaRecord, MatchRecord, SnapshotRecord,
    StatusDocument,
};

const SUMMARY_HEADER: &str = "| Claim | Covered | Coverage% | Required Jobs | Missing Evidence |";
const LEMMA_HEADER: &str = "| Lemma | Covered | Coverage% | Required Jobs | Missing Evidence |";
const SUMMARY_RULE: &str = "|---|:---:|---:|---|---|";

/// Render the full Markdown coverage matrix.
pub fn render_markdown(doc: &StatusDocument) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("# Claim Coverage Matrix".into());
    lines.push(String::new());
    if let Some(ts) = &doc.generated_at {
        lines.push(format!("- Generated: **{ts}**"));
    }
    lines.push(format!("- Registry version: `{}`", doc.registry_version));
    lines.push(format!(
        "- Claims covered: **{} / {}**",
        doc.summary.claims_covered, doc.summary.claims_total
    ));
    lines.push(format!("- Coverage: **{}%**", doc.summary.coverage_percent));
    lines.push(format!("- Overall: **{}**", doc.summary.overall.as_str()));
    lines.push(String::new());

    if doc.summary.lemma_layer {
        lines.push("## Lemma Summary".into());
        lines.push(String::new());
        lines.push(LEMMA_HEADER.into());
        lines.push(SUMMARY_RULE.into());
        for lemma in &doc.lemmas {
            lines.push(lemma_row(lemma));
        }
        lines.push(String::new());
    }

    lines.push("## Claim Summary".into());
    lines.push(String::new());
    lines.push(SUMMARY_HEADER.into());
    lines.push(SUMMARY_RULE.into());
    for claim in &doc.claims {
        lines.push(claim_row(claim));
    }
    lines.push(String::new());

    lines.push("## Claim Details".into());
    for claim in &doc.claims {
        lines.push(String::new());
        claim_details(claim, &mut lines);
    }
    lines.push(String::new());
    snapshot_section(&doc.snapshot, &mut lines);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn claim_row(c: &ClaimRecord) -> String {
    format!(
        "| {} | {} | {}% | {} | {} |",
        cell(&c.id),
        mark(c.covered),
        c.coverage_percent,
        list_or_dash(&c.required_jobs),
        list_or_dash(&c.missing_evidence),
    )
}

fn lemma_row(l: &LemmaRecord) -> String {
    format!(
        "| {} | {} | {}% | {} | {} |",
        cell(&l.id),
        mark(l.covered),
        l.coverage_percent,
        list_or_dash(&l.required_jobs),
        list_or_dash(&l.missing_evidence),
    )
}

fn claim_details(c: &ClaimRecord, lines: &mut Vec<String>) {
    if c.title.is_empty() {
        lines.push(format!("### {}", c.id));
    } else {
        lines.push(format!("### {}: {}", c.id, c.title));
    }
    lines.push(String::new());
    lines.push(format!("- Mode: {}", c.mode.as_str()));
    lines.push(format!(
        "- Covered: {} ({}%)",
        mark(c.covered),
        c.coverage_percent
    ));
    if c.mode == EvaluationMode::Lemma {
        lines.push(format!("- Lemmas: {}", list_or_dash(&c.required_lemmas)));
        lines.push(format!("- Missing lemmas: {}", list_or_dash(&c.missing_lemmas)));
    }
    lines.push(format!("- Missing jobs: {}", list_or_dash(&c.missing_jobs)));
    lines.push(format!("- Missing evidence: {}", list_or_dash(&c.missing_evidence)));

    if !c.jobs.is_empty() {
        lines.push(String::new());
        lines.push("| Required Job | Resolution | Matched | Reason |".into());
        lines.push("|---|---|---|---|".into());
        for job in &c.jobs {
            lines.push(job_row(job));
        }
    }

    if !c.evidence.is_empty() {
        lines.push(String::new());
        lines.push("| Evidence | Present | Size | Reason |".into());
        lines.push("|---|:---:|---:|---|".into());
        for item in &c.evidence {
            lines.push(evidence_row(item));
        }
    }
}

fn job_row(j: &JobRecord) -> String {
    let matched = if j.matched.is_empty() {
        "-".to_string()
    } else {
        j.matched
            .iter()
            .map(|m| format!("`{}` {} ({})", cell(&m.name), m.conclusion, run_label(m)))
            .collect::<Vec<_>>()
            .join("; ")
    };
    format!(
        "| `{}` | {} | {} | {} |",
        cell(&j.required),
        j.resolution,
        matched,
        j.reason
    )
}

fn run_label(m: &MatchRecord) -> String {
    match m.run_id {
        Some(run) => format!("run {run}, attempt {}", m.run_attempt),
        None => format!("attempt {}", m.run_attempt),
    }
}

fn snapshot_section(s: &SnapshotRecord, lines: &mut Vec<String>) {
    lines.push("## Jobs Snapshot".into());
    lines.push(String::new());
    lines.push(format!(
        "- Repository: {}",
        s.repo.as_deref().map_or_else(|| "-".to_string(), |r| format!("`{}`", cell(r)))
    ));
    lines.push(format!(
        "- Run id: {}",
        s.run_id.map_or_else(|| "-".to_string(), |r| format!("`{r}`"))
    ));
    lines.push(format!("- Jobs: {}", s.jobs.len()));
    if s.jobs.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push("| Job | Conclusion | Run |".into());
    lines.push("|---|---|---|".into());
    for job in &s.jobs {
        lines.push(format!(
            "| `{}` | {} | {} |",
            cell(&job.name),
            job.conclusion,
            run_label(job)
        ));
    }
}

fn evidence_row(e: &EvidenceRecord) -> String {
    let size = match e.dir_entries {
        Some(n) => format!("{n} entries"),
        None => format!("{} B", e.size_bytes),
    };
    let path = if e.matches.is_empty() {
        format!("`{}`", cell(&e.path))
    } else {
        format!(
            "`{}` ({})",
            cell(&e.path),
            e.matches
                .iter()
                .map(|m| cell(m))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };
    format!("| {path} | {} | {size} | {} |", mark(e.exists), e.reason)
}

fn mark(ok: bool) -> &'static str {
    if ok { "✅" } else { "❌" }
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.iter().map(|s| cell(s)).collect::<Vec<_>>().join(", ")
    }
}

/// Keep a value inside one table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
