// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Alias suggestion output: a review report and a paste-ready YAML snippet.

use std::collections::BTreeMap;

use claimgate_core::error::Result;
use claimgate_engine::{AliasSuggestion, SuggestionRow};
use serde::{Deserialize, Serialize};

/// One line per required id describing what was found.
pub fn render_suggestion_report(rows: &[SuggestionRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let line = match &row.suggestion {
            AliasSuggestion::Matched => format!("- {}: matched", row.required),
            AliasSuggestion::Unique(name) => format!("- {}: suggest alias -> {name}", row.required),
            AliasSuggestion::NoMatch => format!("- {}: no match (fix manually)", row.required),
            AliasSuggestion::Multiple(names) => format!(
                "- {}: {} candidates (choose manually): {}",
                row.required,
                names.len(),
                names.join(", ")
            ),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// The `aliases:` mapping in the registry's own layout.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSnippet {
    pub aliases: BTreeMap<String, Vec<String>>,
}

/// YAML `aliases:` entries for every unique suggestion, or `None` when
/// there is nothing to suggest.
pub fn render_alias_snippet(rows: &[SuggestionRow]) -> Result<Option<String>> {
    let aliases: BTreeMap<String, Vec<String>> = rows
        .iter()
        .filter_map(|row| match &row.suggestion {
            AliasSuggestion::Unique(name) => Some((row.required.clone(), vec![name.clone()])),
            _ => None,
        })
        .collect();
    if aliases.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_yaml::to_string(&AliasSnippet { aliases })?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<SuggestionRow> {
        vec![
            SuggestionRow {
                required: "audit".into(),
                suggestion: AliasSuggestion::Multiple(vec!["audit_linux".into(), "audit_macos".into()]),
            },
            SuggestionRow {
                required: "interop_smoke".into(),
                suggestion: AliasSuggestion::Matched,
            },
            SuggestionRow {
                required: "replay".into(),
                suggestion: AliasSuggestion::Unique("Attack \"Replay\"".into()),
            },
        ]
    }

    fn parse_snippet(text: &str) -> AliasSnippet {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn snippet_lists_only_unique_suggestions() {
        let snippet = render_alias_snippet(&rows()).unwrap().unwrap();
        assert!(snippet.starts_with("aliases:\n"), "{snippet}");
        assert_eq!(
            parse_snippet(&snippet).aliases,
            BTreeMap::from([("replay".to_string(), vec!["Attack \"Replay\"".to_string()])])
        );
        assert!(render_alias_snippet(&rows()[..2]).unwrap().is_none());
    }

    #[test]
    fn snippet_stays_valid_yaml_for_control_characters() {
        let rows = vec![SuggestionRow {
            required: "replay".into(),
            suggestion: AliasSuggestion::Unique("attack\u{7}replay: #1".into()),
        }];
        let snippet = render_alias_snippet(&rows).unwrap().unwrap();
        assert_eq!(
            parse_snippet(&snippet).aliases["replay"],
            vec!["attack\u{7}replay: #1".to_string()]
        );
    }

    #[test]
    fn report_has_a_line_per_id() {
        let report = render_suggestion_report(&rows());
        assert_eq!(report.lines().count(), 3);
        assert!(report.contains("audit: 2 candidates"));
        assert!(report.contains("interop_smoke: matched"));
    }
}
