use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One of the eight O-1A evidentiary criteria.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    /// Stable identifier, e.g. "awards".
    pub key: String,
    /// Display name, e.g. "Awards".
    pub name: String,
    /// One-sentence description used to build retrieval queries.
    pub description: String,
    /// Longer USCIS-flavored description shown in the criteria endpoint.
    pub detailed_description: String,
    /// Cue words for the lexical classifier backend.
    #[serde(default)]
    pub signal_terms: Vec<String>,
}

impl Criterion {
    /// Retrieval query for this criterion, matching the phrasing the
    /// assessment pipeline was tuned with.
    pub fn retrieval_query(&self) -> String {
        format!("{} examples achievements evidence", self.description)
    }

    /// The binary label set for zero-shot classification.
    pub fn evidence_label(&self) -> String {
        format!("Evidence of {}", self.name)
    }

    pub fn not_relevant_label(&self) -> String {
        format!("Not relevant to {}", self.name)
    }
}

/// The full set of criteria, in file order.
#[derive(Debug, Clone)]
pub struct CriteriaSet {
    criteria: Vec<Criterion>,
}

#[derive(Deserialize)]
struct CriteriaFile {
    o1a_criteria: Vec<Criterion>,
}

impl CriteriaSet {
    /// Loads criteria definitions from a JSON file of the shape
    /// `{"o1a_criteria": [{...}, ...]}`.
    ///
    /// Distinguishes three failure modes so operators can tell a missing
    /// file from a corrupt one: file not found, invalid JSON, and a JSON
    /// document without the `o1a_criteria` key.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Criteria file not found: {}", path.display()))?;

        let value: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON in criteria file: {}", path.display()))?;

        if value.get("o1a_criteria").is_none() {
            return Err(anyhow!(
                "Missing 'o1a_criteria' key in file: {}",
                path.display()
            ));
        }

        let parsed: CriteriaFile = serde_json::from_value(value)
            .with_context(|| format!("Malformed criteria definitions in: {}", path.display()))?;

        if parsed.o1a_criteria.is_empty() {
            return Err(anyhow!("Criteria file defines no criteria: {}", path.display()));
        }

        Ok(Self {
            criteria: parsed.o1a_criteria,
        })
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.key == key)
    }
}
