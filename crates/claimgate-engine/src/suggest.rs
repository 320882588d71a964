// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Alias suggestions for required job ids that no longer match anything.
//
// This is the only place substring containment is used. It proposes alias
// table entries for a human to review; evaluation never sees them.

use std::collections::BTreeSet;

use claimgate_core::status::Resolution;
use claimgate_core::types::normalize_job_name;

use crate::jobs::JobResultSet;
use crate::matcher::MatchEngine;
use crate::registry::ClaimRegistry;

/// Outcome of searching actual job names for one required id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasSuggestion {
    /// The id already resolves (exactly or through a declared alias).
    Matched,
    /// Exactly one actual name contains the id.
    Unique(String),
    /// No actual name contains the id.
    NoMatch,
    /// Several actual names contain the id; a human must choose.
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRow {
    pub required: String,
    pub suggestion: AliasSuggestion,
}

/// One row per required job id, in sorted id order.
pub fn suggest_aliases(registry: &ClaimRegistry, jobs: &JobResultSet) -> Vec<SuggestionRow> {
    let engine = MatchEngine::new(jobs);
    registry
        .required_job_ids()
        .into_iter()
        .map(|required| {
            let resolution = engine.resolve(&registry.job_requirement(&required));
            let suggestion = if resolution == Resolution::Missing {
                search(&required, jobs)
            } else {
                AliasSuggestion::Matched
            };
            SuggestionRow {
                required,
                suggestion,
            }
        })
        .collect()
}

fn search(required: &str, jobs: &JobResultSet) -> AliasSuggestion {
    let needle = normalize_job_name(required);
    let hits: BTreeSet<&str> = jobs
        .actual_names()
        .into_iter()
        .filter(|name| normalize_job_name(name).contains(&needle))
        .collect();
    let mut hits: Vec<String> = hits.into_iter().map(str::to_string).collect();
    match hits.len() {
        0 => AliasSuggestion::NoMatch,
        1 => AliasSuggestion::Unique(hits.remove(0)),
        _ => AliasSuggestion::Multiple(hits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimgate_core::types::{Conclusion, JobResult};

    fn jobs(names: &[&str]) -> JobResultSet {
        JobResultSet::from_results(
            names
                .iter()
                .map(|n| JobResult {
                    name: n.to_string(),
                    conclusion: Conclusion::Success,
                    run_id: None,
                    run_attempt: 1,
                    completed_at: None,
                })
                .collect(),
        )
    }

    #[test]
    fn suggestions_per_required_id() {
        let reg = ClaimRegistry::from_yaml_str(
            r#"
claims:
  A2:
    required_jobs: [replay]
  A3:
    required_jobs: [downgrade]
  A4:
    required_jobs: [interop_smoke]
  A5:
    required_jobs: [audit, tamarin]
"#,
            "claims.yaml",
        )
        .unwrap();
        let set = jobs(&[
            "attack_replay",
            "Attack Downgrade",
            "interop_smoke",
            "audit_linux",
            "audit_macos",
        ]);

        let rows = suggest_aliases(&reg, &set);
        let by_id = |id: &str| {
            rows.iter()
                .find(|r| r.required == id)
                .map(|r| r.suggestion.clone())
                .unwrap()
        };

        assert_eq!(by_id("replay"), AliasSuggestion::Unique("attack_replay".into()));
        assert_eq!(by_id("downgrade"), AliasSuggestion::Unique("Attack Downgrade".into()));
        assert_eq!(by_id("interop_smoke"), AliasSuggestion::Matched);
        assert_eq!(
            by_id("audit"),
            AliasSuggestion::Multiple(vec!["audit_linux".into(), "audit_macos".into()])
        );
        assert_eq!(by_id("tamarin"), AliasSuggestion::NoMatch);
    }

    #[test]
    fn declared_alias_counts_as_matched() {
        let reg = ClaimRegistry::from_yaml_str(
            "aliases:\n  replay: [attack_replay]\nclaims:\n  A2:\n    required_jobs: [replay]\n",
            "claims.yaml",
        )
        .unwrap();
        let rows = suggest_aliases(&reg, &jobs(&["attack_replay"]));
        assert_eq!(rows[0].suggestion, AliasSuggestion::Matched);
    }
}
