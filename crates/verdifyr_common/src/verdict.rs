//! Verdicts and verdict sets
//!
//! A [`Verdict`] is the classification state of one ingredient at one point
//! in the pipeline. Verdicts are created fresh per pass and never mutated
//! after the aggregator emits a merged set; merging copies.
//!
//! A [`VerdictSet`] is keyed by canonical ingredient name and preserves
//! first-insertion order so reports stay deterministic. Insertion always
//! replaces by key, never appends a duplicate.

use crate::ingredient::canonical_key;
use crate::taxonomy::ClassificationLabel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification state for a single ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Normalized ingredient name (raw text when normalization failed)
    pub ingredient: String,
    #[serde(flatten)]
    pub label: ClassificationLabel,
    /// Annex grounding the label, e.g. "II" for forbidden substances
    pub annex_reference: Option<String>,
    /// Human-readable justification; always present when label != Passed
    pub reason: Option<String>,
    /// Whether a later pass independently corroborated this verdict
    pub verified: bool,
}

impl Verdict {
    /// Build a verdict, enforcing the reason policy: passed ingredients carry
    /// no reason, every other label gets one (label-derived if none given).
    pub fn new(
        ingredient: impl Into<String>,
        label: ClassificationLabel,
        annex_reference: Option<String>,
        reason: Option<String>,
    ) -> Self {
        let reason = match label {
            ClassificationLabel::Passed => None,
            _ => Some(reason.unwrap_or_else(|| default_reason(&label))),
        };
        let annex_reference = annex_reference.or_else(|| label.implied_annex().map(String::from));
        Self {
            ingredient: ingredient.into(),
            label,
            annex_reference,
            reason,
            verified: false,
        }
    }

    pub fn passed(ingredient: impl Into<String>) -> Self {
        Self::new(ingredient, ClassificationLabel::Passed, None, None)
    }

    /// Identity key for aggregation
    pub fn key(&self) -> String {
        canonical_key(&self.ingredient)
    }
}

fn default_reason(label: &ClassificationLabel) -> String {
    match label {
        ClassificationLabel::Forbidden => "listed in Annex II (banned in cosmetic products)".to_string(),
        ClassificationLabel::Restricted(class) => {
            format!("regulated under Annex {} (permitted within limits)", class.annex())
        }
        ClassificationLabel::Unknown => "no classification produced".to_string(),
        ClassificationLabel::Passed => unreachable!("passed verdicts carry no reason"),
    }
}

/// Set of verdicts keyed by canonical ingredient name, in first-insertion
/// order. The empty set is the aggregator's merge identity.
#[derive(Debug, Clone, Default)]
pub struct VerdictSet {
    entries: Vec<Verdict>,
    index: HashMap<String, usize>,
}

impl VerdictSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_verdicts(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        let mut set = Self::new();
        for verdict in verdicts {
            set.insert(verdict);
        }
        set
    }

    /// Insert replace-by-key: a verdict for an already-known ingredient
    /// overwrites the previous one in place, keeping its position.
    pub fn insert(&mut self, verdict: Verdict) {
        let key = verdict.key();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos] = verdict,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(verdict);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Verdict> {
        self.index
            .get(&canonical_key(name))
            .map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&canonical_key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Verdict> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Verdict> {
        self.entries
    }

    /// Verdicts that still need review: everything not Passed
    pub fn non_passed(&self) -> Vec<&Verdict> {
        self.entries.iter().filter(|v| !v.label.is_passed()).collect()
    }
}

impl PartialEq for VerdictSet {
    fn eq(&self, other: &Self) -> bool {
        // Keyed comparison: ordering differences between two sets holding the
        // same verdicts do not matter for merge-law tests
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|v| other.get(&v.ingredient) == Some(v))
    }
}

impl FromIterator<Verdict> for VerdictSet {
    fn from_iter<T: IntoIterator<Item = Verdict>>(iter: T) -> Self {
        Self::from_verdicts(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::RestrictedClass;

    #[test]
    fn passed_verdicts_carry_no_reason() {
        let verdict = Verdict::new(
            "Aqua",
            ClassificationLabel::Passed,
            None,
            Some("looks fine".to_string()),
        );
        assert_eq!(verdict.reason, None);
    }

    #[test]
    fn non_passed_verdicts_always_carry_a_reason() {
        let verdict = Verdict::new("Hydroquinone", ClassificationLabel::Forbidden, None, None);
        assert!(verdict.reason.is_some());
        assert_eq!(verdict.annex_reference.as_deref(), Some("II"));
    }

    #[test]
    fn insert_replaces_by_canonical_key() {
        let mut set = VerdictSet::new();
        set.insert(Verdict::passed("Phenoxyethanol"));
        set.insert(Verdict::new(
            "PHENOXYETHANOL",
            ClassificationLabel::Restricted(RestrictedClass::Preservative),
            None,
            Some("preservative, max 1%".to_string()),
        ));

        assert_eq!(set.len(), 1);
        let verdict = set.get("phenoxyethanol").unwrap();
        assert_eq!(
            verdict.label,
            ClassificationLabel::Restricted(RestrictedClass::Preservative)
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut set = VerdictSet::new();
        set.insert(Verdict::passed("Aqua"));
        set.insert(Verdict::passed("Glycerin"));
        set.insert(Verdict::passed("Parfum"));

        let names: Vec<&str> = set.iter().map(|v| v.ingredient.as_str()).collect();
        assert_eq!(names, vec!["Aqua", "Glycerin", "Parfum"]);
    }

    #[test]
    fn set_equality_ignores_ordering() {
        let a = VerdictSet::from_verdicts([Verdict::passed("Aqua"), Verdict::passed("Glycerin")]);
        let b = VerdictSet::from_verdicts([Verdict::passed("Glycerin"), Verdict::passed("Aqua")]);
        assert_eq!(a, b);
    }
}
