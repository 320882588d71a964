// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Claim registry: the versioned claim/lemma/alias configuration.
//
// Loaded once, validated completely, then immutable. Every structural
// problem is a fatal `Configuration` error: a registry that is only partly
// understood cannot produce a trustworthy report.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use claimgate_core::error::{ClaimgateError, Result};
use claimgate_core::types::{
    Claim, EvaluationMode, EvidenceRequirement, JobRequirement, Lemma, is_pattern, natural_cmp,
    normalize_job_name,
};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Registry format version understood by this build.
pub const REGISTRY_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

fn default_version() -> u32 {
    REGISTRY_VERSION
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegistry {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    lemmas: BTreeMap<String, RawLemma>,
    #[serde(default)]
    claims: BTreeMap<String, RawClaim>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLemma {
    #[serde(default)]
    title: String,
    #[serde(default)]
    required_jobs: Vec<String>,
    #[serde(default)]
    evidence_paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClaim {
    #[serde(default)]
    title: String,
    #[serde(default)]
    mode: Option<EvaluationMode>,
    #[serde(default)]
    required_jobs: Vec<String>,
    #[serde(default)]
    required_lemmas: Vec<String>,
    #[serde(default)]
    evidence_paths: Vec<String>,
}

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// Declared mapping from a required job id to the actual job names that may
/// satisfy it. Keys are stored normalised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests.
    pub fn with(mut self, required: &str, accepted: &[&str]) -> Self {
        self.entries.insert(
            normalize_job_name(required),
            accepted.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Accepted actual names for `required` (empty when none are declared).
    pub fn accepted(&self, required: &str) -> &[String] {
        self.entries
            .get(&normalize_job_name(required))
            .map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

// ---------------------------------------------------------------------------
// Validated registry
// ---------------------------------------------------------------------------

/// Immutable, validated claim registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRegistry {
    version: u32,
    /// Sorted by id, natural order.
    claims: Vec<Claim>,
    /// Sorted by id, natural order.
    lemmas: Vec<Lemma>,
    aliases: AliasTable,
}

impl ClaimRegistry {
    /// Build and validate a registry from already-typed parts.
    pub fn new(
        version: u32,
        mut claims: Vec<Claim>,
        mut lemmas: Vec<Lemma>,
        aliases: AliasTable,
    ) -> Result<Self> {
        if version != REGISTRY_VERSION {
            return Err(ClaimgateError::UnsupportedRegistryVersion(version));
        }
        claims.sort_by(|a, b| natural_cmp(&a.id, &b.id));
        lemmas.sort_by(|a, b| natural_cmp(&a.id, &b.id));

        let registry = Self {
            version,
            claims,
            lemmas,
            aliases,
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Parse a YAML registry. `origin` names the source in error messages.
    pub fn from_yaml_str(text: &str, origin: &str) -> Result<Self> {
        let raw: RawRegistry = serde_yaml::from_str(text)
            .map_err(|e| ClaimgateError::Configuration(format!("{origin}: {e}")))?;

        let mut claims = Vec::with_capacity(raw.claims.len());
        for (id, c) in raw.claims {
            let mode = infer_mode(&id, &c)?;
            claims.push(Claim {
                id,
                title: c.title.trim().to_string(),
                mode,
                required_jobs: c.required_jobs,
                required_lemmas: c.required_lemmas,
                evidence_paths: c.evidence_paths,
            });
        }

        let lemmas = raw
            .lemmas
            .into_iter()
            .map(|(id, l)| Lemma {
                id,
                title: l.title.trim().to_string(),
                required_jobs: l.required_jobs,
                evidence_paths: l.evidence_paths,
            })
            .collect();

        let mut aliases = AliasTable::new();
        for (required, accepted) in raw.aliases {
            let key = normalize_job_name(&required);
            if aliases.entries.insert(key, accepted).is_some() {
                return Err(ClaimgateError::Configuration(format!(
                    "{origin}: alias `{required}` is declared twice (after normalisation)"
                )));
            }
        }

        Self::new(raw.version, claims, lemmas, aliases)
    }

    /// Read and parse the registry file at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClaimgateError::Configuration(format!("cannot read registry {}: {e}", path.display()))
        })?;
        let registry = Self::from_yaml_str(&text, &path.display().to_string())?;
        debug!(
            claims = registry.claims.len(),
            lemmas = registry.lemmas.len(),
            "claim registry loaded"
        );
        Ok(registry)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn lemmas(&self) -> &[Lemma] {
        &self.lemmas
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// The job requirement for `id`, with its declared aliases attached.
    pub fn job_requirement(&self, id: &str) -> JobRequirement {
        JobRequirement {
            id: id.to_string(),
            accepted: self.aliases.accepted(id).to_vec(),
        }
    }

    /// Every distinct job id named by any claim or lemma, sorted.
    pub fn required_job_ids(&self) -> Vec<String> {
        let ids: BTreeSet<&str> = self
            .claims
            .iter()
            .flat_map(|c| c.required_jobs.iter())
            .chain(self.lemmas.iter().flat_map(|l| l.required_jobs.iter()))
            .map(String::as_str)
            .collect();
        ids.into_iter().map(str::to_string).collect()
    }

    /// Every distinct evidence path named by any claim or lemma, sorted.
    pub fn evidence_requirements(&self) -> Vec<EvidenceRequirement> {
        let paths: BTreeSet<&str> = self
            .claims
            .iter()
            .flat_map(|c| c.evidence_paths.iter())
            .chain(self.lemmas.iter().flat_map(|l| l.evidence_paths.iter()))
            .map(String::as_str)
            .collect();
        paths
            .into_iter()
            .map(|p| EvidenceRequirement { path: p.to_string() })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.claims.is_empty() {
            return Err(config_err("registry defines no claims"));
        }

        let mut lemma_ids = BTreeSet::new();
        for lemma in &self.lemmas {
            check_id("lemma", &lemma.id)?;
            if !lemma_ids.insert(lemma.id.as_str()) {
                return Err(config_err(format!("lemma `{}` is defined twice", lemma.id)));
            }
            let unit = format!("lemma {}", lemma.id);
            check_list(&unit, "required_jobs", &lemma.required_jobs)?;
            check_evidence_paths(&unit, &lemma.evidence_paths)?;
            if lemma.required_jobs.is_empty() && lemma.evidence_paths.is_empty() {
                return Err(config_err(format!("{unit} has no evaluable requirements")));
            }
        }

        let mut claim_ids = BTreeSet::new();
        let mut referenced = BTreeSet::new();
        for claim in &self.claims {
            check_id("claim", &claim.id)?;
            if !claim_ids.insert(claim.id.as_str()) {
                return Err(config_err(format!("claim `{}` is defined twice", claim.id)));
            }
            let unit = format!("claim {}", claim.id);
            check_list(&unit, "required_jobs", &claim.required_jobs)?;
            check_list(&unit, "required_lemmas", &claim.required_lemmas)?;
            check_evidence_paths(&unit, &claim.evidence_paths)?;

            match claim.mode {
                EvaluationMode::Lemma => {
                    if claim.required_lemmas.is_empty() {
                        return Err(config_err(format!(
                            "{unit}: lemma mode requires at least one lemma"
                        )));
                    }
                    if !claim.required_jobs.is_empty() {
                        return Err(config_err(format!(
                            "{unit}: lemma mode cannot also list direct required_jobs"
                        )));
                    }
                    for lemma in &claim.required_lemmas {
                        if !lemma_ids.contains(lemma.as_str()) {
                            return Err(config_err(format!(
                                "{unit} references undefined lemma `{lemma}`"
                            )));
                        }
                        referenced.insert(lemma.as_str());
                    }
                }
                EvaluationMode::Direct => {
                    if !claim.required_lemmas.is_empty() {
                        return Err(config_err(format!(
                            "{unit}: direct mode cannot list required_lemmas"
                        )));
                    }
                    if claim.required_jobs.is_empty() && claim.evidence_paths.is_empty() {
                        return Err(config_err(format!("{unit} has no evaluable requirements")));
                    }
                }
            }
        }

        for lemma in self.lemmas.iter().filter(|l| !referenced.contains(l.id.as_str())) {
            debug!(lemma = %lemma.id, "lemma is not referenced by any claim");
        }

        let required: BTreeSet<String> = self
            .required_job_ids()
            .iter()
            .map(|id| normalize_job_name(id))
            .collect();
        for (key, accepted) in self.aliases.iter() {
            if !required.contains(key) {
                return Err(config_err(format!(
                    "alias table names `{key}`, which no claim or lemma requires"
                )));
            }
            if accepted.is_empty() {
                return Err(config_err(format!("alias `{key}` accepts no job names")));
            }
            let mut seen = BTreeSet::new();
            for name in accepted {
                let norm = normalize_job_name(name);
                if norm.is_empty() {
                    return Err(config_err(format!("alias `{key}` lists a blank job name")));
                }
                if !seen.insert(norm) {
                    return Err(config_err(format!("alias `{key}` lists `{name}` twice")));
                }
            }
        }

        Ok(())
    }
}

fn config_err(msg: impl Into<String>) -> ClaimgateError {
    ClaimgateError::Configuration(msg.into())
}

fn infer_mode(id: &str, c: &RawClaim) -> Result<EvaluationMode> {
    let inferred = if c.required_lemmas.is_empty() {
        EvaluationMode::Direct
    } else {
        EvaluationMode::Lemma
    };
    match c.mode {
        None => Ok(inferred),
        Some(declared) if declared == inferred => Ok(declared),
        // Lemma mode with no lemmas is reported by validation with a
        // clearer message than a mode mismatch.
        Some(EvaluationMode::Lemma) => Ok(EvaluationMode::Lemma),
        Some(declared) => Err(config_err(format!(
            "claim {id} declares mode `{}` but lists required_lemmas",
            declared.as_str()
        ))),
    }
}

fn check_id(kind: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(config_err(format!("{kind} with a blank id")));
    }
    Ok(())
}

fn check_list(unit: &str, field: &str, items: &[String]) -> Result<()> {
    check_unique(unit, field, items, normalize_job_name)
}

/// Reject blank entries and entries equal under `key`.
fn check_unique(
    unit: &str,
    field: &str,
    items: &[String],
    key: fn(&str) -> String,
) -> Result<()> {
    let mut seen = BTreeSet::new();
    for item in items {
        if item.trim().is_empty() {
            return Err(config_err(format!("{unit}: {field} contains a blank entry")));
        }
        if !seen.insert(key(item)) {
            return Err(config_err(format!("{unit}: {field} lists `{item}` twice")));
        }
    }
    Ok(())
}

fn check_evidence_paths(unit: &str, paths: &[String]) -> Result<()> {
    // Paths are case-sensitive on most filesystems.
    check_unique(unit, "evidence_paths", paths, |p| p.trim().to_string())?;
    for path in paths {
        if let Some((parent, _)) = path.trim_end_matches('/').rsplit_once('/') {
            if is_pattern(parent) {
                return Err(config_err(format!(
                    "{unit}: evidence pattern `{path}` may only use wildcards in its last component"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version: 1
aliases:
  replay: [attack_replay]
lemmas:
  audit_suite:
    title: Audit suite
    required_jobs: [zeroize_rules, no_secret_logging, proverif, tamarin]
claims:
  A10:
    title: Later claim
    required_jobs: [replay]
  A2:
    title: Replay resistance
    required_jobs: [attack_replay]
  A5:
    title: Audit
    required_lemmas: [audit_suite]
    evidence_paths: [audit.log]
"#;

    fn parse(text: &str) -> Result<ClaimRegistry> {
        ClaimRegistry::from_yaml_str(text, "claims.yaml")
    }

    fn config_message(result: Result<ClaimRegistry>) -> String {
        match result {
            Err(ClaimgateError::Configuration(msg)) => msg,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn parses_and_sorts_naturally() {
        let reg = parse(SAMPLE).unwrap();
        let ids: Vec<_> = reg.claims().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A2", "A5", "A10"]);
        assert_eq!(reg.lemmas().len(), 1);
        assert_eq!(reg.claims()[1].mode, EvaluationMode::Lemma);
        assert_eq!(reg.claims()[0].mode, EvaluationMode::Direct);
    }

    #[test]
    fn alias_lookup_is_normalised() {
        let reg = parse(SAMPLE).unwrap();
        assert_eq!(reg.job_requirement("Replay").accepted, vec!["attack_replay"]);
        assert!(reg.job_requirement("attack_replay").accepted.is_empty());
    }

    #[test]
    fn evidence_requirements_are_deduplicated() {
        let reg = parse(SAMPLE).unwrap();
        let paths: Vec<_> = reg.evidence_requirements().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["audit.log"]);
    }

    #[test]
    fn undefined_lemma_is_fatal() {
        let msg = config_message(parse(
            "claims:\n  A5:\n    required_lemmas: [L_missing]\n",
        ));
        assert!(msg.contains("undefined lemma `L_missing`"), "{msg}");
    }

    #[test]
    fn lemma_mode_with_direct_jobs_is_fatal() {
        let msg = config_message(parse(
            "lemmas:\n  L:\n    required_jobs: [a]\nclaims:\n  A1:\n    required_lemmas: [L]\n    required_jobs: [b]\n",
        ));
        assert!(msg.contains("lemma mode"), "{msg}");
    }

    #[test]
    fn declared_lemma_mode_without_lemmas_is_fatal() {
        let msg = config_message(parse(
            "claims:\n  A1:\n    mode: lemma\n    evidence_paths: [x.log]\n",
        ));
        assert!(msg.contains("at least one lemma"), "{msg}");
    }

    #[test]
    fn declared_direct_mode_with_lemmas_is_fatal() {
        let msg = config_message(parse(
            "lemmas:\n  L:\n    required_jobs: [a]\nclaims:\n  A1:\n    mode: direct\n    required_lemmas: [L]\n",
        ));
        assert!(msg.contains("declares mode `direct`"), "{msg}");
    }

    #[test]
    fn claim_without_requirements_is_fatal() {
        let msg = config_message(parse("claims:\n  A1:\n    title: empty\n"));
        assert!(msg.contains("no evaluable requirements"), "{msg}");
    }

    #[test]
    fn empty_registry_is_fatal() {
        let msg = config_message(parse("version: 1\n"));
        assert!(msg.contains("no claims"), "{msg}");
    }

    #[test]
    fn unknown_field_is_fatal() {
        let msg = config_message(parse("claims:\n  A1:\n    required_job: [x]\n"));
        assert!(msg.contains("claims.yaml"), "{msg}");
    }

    #[test]
    fn alias_for_unrequired_job_is_fatal() {
        let msg = config_message(parse(
            "aliases:\n  ghost: [ghost_job]\nclaims:\n  A1:\n    required_jobs: [a]\n",
        ));
        assert!(msg.contains("`ghost`"), "{msg}");
    }

    #[test]
    fn duplicate_job_in_unit_is_fatal() {
        let msg = config_message(parse(
            "claims:\n  A1:\n    required_jobs: [a, \" A \"]\n",
        ));
        assert!(msg.contains("twice"), "{msg}");
    }

    #[test]
    fn evidence_paths_differing_in_case_are_distinct() {
        let reg = parse("claims:\n  A1:\n    evidence_paths: [Audit.log, audit.log]\n").unwrap();
        assert_eq!(reg.evidence_requirements().len(), 2);

        let msg = config_message(parse(
            "claims:\n  A1:\n    evidence_paths: [audit.log, \" audit.log \"]\n",
        ));
        assert!(msg.contains("twice"), "{msg}");
    }

    #[test]
    fn wildcard_outside_last_component_is_fatal() {
        let msg = config_message(parse(
            "claims:\n  A1:\n    evidence_paths: [\"out/*/audit.log\"]\n",
        ));
        assert!(msg.contains("last component"), "{msg}");
    }

    #[test]
    fn unsupported_version() {
        let result = parse("version: 2\nclaims:\n  A1:\n    required_jobs: [a]\n");
        assert!(matches!(
            result,
            Err(ClaimgateError::UnsupportedRegistryVersion(2))
        ));
    }

    #[test]
    fn typed_construction_swaps_registry_without_yaml() {
        let claim = Claim {
            id: "A2".into(),
            title: String::new(),
            mode: EvaluationMode::Direct,
            required_jobs: vec!["attack_replay".into()],
            required_lemmas: vec![],
            evidence_paths: vec![],
        };
        let reg = ClaimRegistry::new(1, vec![claim], vec![], AliasTable::new()).unwrap();
        assert_eq!(reg.required_job_ids(), vec!["attack_replay"]);
        assert!(reg.lemmas().is_empty());
    }
}
