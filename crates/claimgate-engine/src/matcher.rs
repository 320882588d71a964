// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Match engine: resolve a required job id to one authoritative result.
//
// Order of rules:
//   1. exact (normalised) name match;
//   2. otherwise, names declared for the id in the alias table;
//   3. within one actual name, the most recent (run_id, run_attempt,
//      completed_at) wins;
//      equal recency with disagreeing conclusions is a RecencyTie;
//   4. across several actual names, disagreeing conclusions are Ambiguous.
//
// Nothing is ever resolved optimistically towards the passing candidate.

use std::collections::{BTreeMap, BTreeSet};

use claimgate_core::status::{MatchedJob, Resolution};
use claimgate_core::types::{JobRequirement, JobResult, normalize_job_name};
use tracing::debug;

use crate::jobs::JobResultSet;

/// Deterministic, side-effect-free resolver over one job snapshot.
#[derive(Debug, Clone, Copy)]
pub struct MatchEngine<'a> {
    jobs: &'a JobResultSet,
}

impl<'a> MatchEngine<'a> {
    pub fn new(jobs: &'a JobResultSet) -> Self {
        Self { jobs }
    }

    pub fn resolve(&self, requirement: &JobRequirement) -> Resolution {
        let candidates = self.candidates(requirement);
        if candidates.is_empty() {
            debug!(required = %requirement.id, "no job matched");
            return Resolution::Missing;
        }

        // Group by actual name so reruns collapse before names are compared.
        let mut by_name: BTreeMap<String, Vec<&JobResult>> = BTreeMap::new();
        for job in candidates {
            by_name.entry(job.normalized_name()).or_default().push(job);
        }

        let mut latest = Vec::with_capacity(by_name.len());
        for group in by_name.values() {
            let Some(newest) = group.iter().map(|j| j.recency()).max() else {
                continue;
            };
            let mut top: Vec<MatchedJob> = group
                .iter()
                .filter(|j| j.recency() == newest)
                .map(|j| MatchedJob::from(*j))
                .collect();
            top.sort_by(|a, b| {
                a.conclusion
                    .as_str()
                    .cmp(b.conclusion.as_str())
                    .then_with(|| a.name.cmp(&b.name))
            });
            top.dedup();

            let head = top.swap_remove(0);
            if top.iter().any(|m| m.conclusion != head.conclusion) {
                debug!(required = %requirement.id, name = %head.name, "rerun tie with conflicting conclusions");
                top.push(head);
                top.sort_by(|a, b| a.conclusion.as_str().cmp(b.conclusion.as_str()));
                return Resolution::RecencyTie(top);
            }
            latest.push(head);
        }

        let Some(first) = latest.first() else {
            return Resolution::Missing;
        };
        if latest.iter().all(|m| m.conclusion == first.conclusion) {
            Resolution::Resolved(first.clone())
        } else {
            debug!(required = %requirement.id, matches = latest.len(), "ambiguous match");
            Resolution::Ambiguous(latest)
        }
    }

    /// Results matching the id exactly, or failing that, any accepted alias.
    fn candidates(&self, requirement: &JobRequirement) -> Vec<&'a JobResult> {
        let jobs: &'a JobResultSet = self.jobs;
        let exact = jobs.indices_for(&normalize_job_name(&requirement.id));
        let indices: BTreeSet<usize> = if exact.is_empty() {
            requirement
                .accepted
                .iter()
                .flat_map(|alias| jobs.indices_for(&normalize_job_name(alias)))
                .copied()
                .collect()
        } else {
            exact.iter().copied().collect()
        };
        indices.into_iter().filter_map(|i| jobs.get(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimgate_core::types::Conclusion;

    fn job(name: &str, conclusion: Conclusion, run_id: Option<u64>, run_attempt: u32) -> JobResult {
        JobResult {
            name: name.into(),
            conclusion,
            run_id,
            run_attempt,
            completed_at: None,
        }
    }

    fn req(id: &str, accepted: &[&str]) -> JobRequirement {
        JobRequirement {
            id: id.into(),
            accepted: accepted.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn exact_match_wins() {
        let set = JobResultSet::from_results(vec![job("attack_replay", Conclusion::Success, Some(1), 1)]);
        let res = MatchEngine::new(&set).resolve(&req("attack_replay", &[]));
        assert!(matches!(res, Resolution::Resolved(ref m) if m.name == "attack_replay"));
    }

    #[test]
    fn exact_match_is_case_and_space_insensitive() {
        let set = JobResultSet::from_results(vec![job(" Attack_Replay ", Conclusion::Success, None, 1)]);
        let res = MatchEngine::new(&set).resolve(&req("attack_replay", &[]));
        assert_eq!(res.kind(), "resolved");
    }

    #[test]
    fn alias_used_only_without_exact_match() {
        let set = JobResultSet::from_results(vec![
            job("replay", Conclusion::Failure, Some(1), 1),
            job("attack_replay", Conclusion::Success, Some(1), 1),
        ]);
        let engine = MatchEngine::new(&set);
        let res = engine.resolve(&req("replay", &["attack_replay"]));
        assert!(matches!(res, Resolution::Resolved(ref m) if m.conclusion == Conclusion::Failure));

        let only_alias = JobResultSet::from_results(vec![job("attack_replay", Conclusion::Success, Some(1), 1)]);
        let res = MatchEngine::new(&only_alias).resolve(&req("replay", &["attack_replay"]));
        assert!(matches!(res, Resolution::Resolved(ref m) if m.name == "attack_replay"));
    }

    #[test]
    fn no_substring_matching() {
        let set = JobResultSet::from_results(vec![job("attack_replay", Conclusion::Success, Some(1), 1)]);
        assert_eq!(MatchEngine::new(&set).resolve(&req("replay", &[])), Resolution::Missing);
    }

    #[test]
    fn conflicting_aliases_are_ambiguous() {
        let set = JobResultSet::from_results(vec![
            job("audit_linux", Conclusion::Success, Some(1), 1),
            job("audit_macos", Conclusion::Failure, Some(1), 1),
        ]);
        let res = MatchEngine::new(&set).resolve(&req("audit", &["audit_linux", "audit_macos"]));
        match res {
            Resolution::Ambiguous(c) => assert_eq!(c.len(), 2),
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn agreeing_aliases_resolve() {
        let set = JobResultSet::from_results(vec![
            job("audit_macos", Conclusion::Success, Some(1), 1),
            job("audit_linux", Conclusion::Success, Some(1), 1),
        ]);
        let res = MatchEngine::new(&set).resolve(&req("audit", &["audit_linux", "audit_macos"]));
        assert!(matches!(res, Resolution::Resolved(ref m) if m.name == "audit_linux"));
    }

    #[test]
    fn most_recent_rerun_wins() {
        let set = JobResultSet::from_results(vec![
            job("tamarin", Conclusion::Failure, Some(10), 1),
            job("tamarin", Conclusion::Success, Some(10), 2),
            job("tamarin", Conclusion::Failure, Some(9), 5),
        ]);
        let res = MatchEngine::new(&set).resolve(&req("tamarin", &[]));
        assert!(matches!(res, Resolution::Resolved(ref m) if m.run_attempt == 2 && m.conclusion == Conclusion::Success));
    }

    #[test]
    fn recency_tie_with_disagreement_is_unresolved() {
        let set = JobResultSet::from_results(vec![
            job("proverif", Conclusion::Success, Some(3), 1),
            job("proverif", Conclusion::Failure, Some(3), 1),
        ]);
        let res = MatchEngine::new(&set).resolve(&req("proverif", &[]));
        assert_eq!(res.kind(), "recency_tie");
        assert_eq!(res.candidates().len(), 2);
    }

    #[test]
    fn later_completion_breaks_rerun_tie() {
        let at = |conclusion, ts: &str| JobResult {
            completed_at: Some(ts.parse().unwrap()),
            ..job("tamarin", conclusion, None, 1)
        };
        let set = JobResultSet::from_results(vec![
            at(Conclusion::Success, "2026-01-02T08:00:00Z"),
            at(Conclusion::Failure, "2026-01-01T08:00:00Z"),
        ]);
        let res = MatchEngine::new(&set).resolve(&req("tamarin", &[]));
        assert_eq!(res.kind(), "resolved");
        assert!(matches!(res, Resolution::Resolved(ref m) if m.conclusion == Conclusion::Success));
    }

    #[test]
    fn identical_duplicate_records_collapse() {
        let set = JobResultSet::from_results(vec![
            job("proverif", Conclusion::Success, Some(3), 1),
            job("proverif", Conclusion::Success, Some(3), 1),
        ]);
        assert_eq!(MatchEngine::new(&set).resolve(&req("proverif", &[])).kind(), "resolved");
    }

    #[test]
    fn resolution_is_independent_of_input_order() {
        let a = job("x_one", Conclusion::Success, Some(1), 1);
        let b = job("x_two", Conclusion::Failure, Some(1), 1);
        let r = req("x", &["x_one", "x_two"]);
        let fwd = JobResultSet::from_results(vec![a.clone(), b.clone()]);
        let rev = JobResultSet::from_results(vec![b, a]);
        assert_eq!(MatchEngine::new(&fwd).resolve(&r), MatchEngine::new(&rev).resolve(&r));
    }
}
