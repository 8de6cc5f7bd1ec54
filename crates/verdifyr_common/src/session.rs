//! Session records
//!
//! One record per submission: the ordered source ingredient list, the final
//! verdict set, and who asked. Records are immutable once built; the store
//! is the only thing that ever sees them afterwards.

use crate::ingredient::Ingredient;
use crate::taxonomy::ClassificationLabel;
use crate::verdict::{Verdict, VerdictSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Who submitted the ingredient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Actor {
    /// Signed-in user id
    User(String),
    /// Anonymous device/session id
    Anonymous(String),
}

impl Actor {
    pub fn anonymous() -> Self {
        Self::Anonymous(Uuid::new_v4().to_string())
    }

    pub fn id(&self) -> &str {
        match self {
            Self::User(id) | Self::Anonymous(id) => id,
        }
    }
}

/// The persistable outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub actor: Actor,
    /// Source list in submission order
    pub source_ingredients: Vec<Ingredient>,
    /// One verdict per source ingredient, in submission order; verdicts for
    /// names not present in the source list (oracle spelling corrections)
    /// follow at the end
    pub final_verdicts: Vec<Verdict>,
    pub app_version: String,
}

impl SessionRecord {
    pub fn forbidden_count(&self) -> usize {
        self.final_verdicts
            .iter()
            .filter(|v| v.label.is_forbidden())
            .count()
    }

    pub fn passed_count(&self) -> usize {
        self.final_verdicts
            .iter()
            .filter(|v| v.label.is_passed())
            .count()
    }
}

/// Assemble the final record. Output verdict order follows the original
/// submission order, not the aggregator's grouping order. An ingredient the
/// aggregator somehow has no verdict for (should not happen; the merge
/// carries everything through) defensively becomes `Unknown`.
pub fn build_session(
    ingredients: &[Ingredient],
    verdicts: &VerdictSet,
    actor: Actor,
) -> SessionRecord {
    let mut ordered = Vec::with_capacity(verdicts.len());
    let mut seen_keys = Vec::with_capacity(ingredients.len());

    for ingredient in ingredients {
        let key = ingredient.key();
        if seen_keys.contains(&key) {
            // Duplicate entry in the source list maps to the same verdict;
            // it was already emitted once
            continue;
        }
        seen_keys.push(key);

        match verdicts.get(ingredient.display_name()) {
            Some(verdict) => ordered.push(verdict.clone()),
            None => {
                warn!(
                    ingredient = ingredient.display_name(),
                    "ingredient reached session build without a verdict"
                );
                ordered.push(Verdict::new(
                    ingredient.display_name(),
                    ClassificationLabel::Unknown,
                    None,
                    Some("no classification produced".to_string()),
                ));
            }
        }
    }

    // Verdicts the oracle produced under corrected names that match no
    // source entry are kept, after the ordered ones
    for verdict in verdicts.iter() {
        if !seen_keys.contains(&verdict.key()) {
            ordered.push(verdict.clone());
        }
    }

    SessionRecord {
        session_id: Uuid::new_v4(),
        created_at: Utc::now(),
        actor,
        source_ingredients: ingredients.to_vec(),
        final_verdicts: ordered,
        app_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::RestrictedClass;

    fn ingredients(names: &[&str]) -> Vec<Ingredient> {
        names.iter().map(|n| Ingredient::normalized(*n, *n)).collect()
    }

    #[test]
    fn output_follows_submission_order_not_grouping_order() {
        let list = ingredients(&["Aqua", "Phenoxyethanol", "Parfum"]);
        // Verdicts arrive grouped by severity, not source order
        let verdicts = VerdictSet::from_verdicts([
            Verdict::new(
                "Phenoxyethanol",
                ClassificationLabel::Restricted(RestrictedClass::Preservative),
                None,
                Some("max 1%".to_string()),
            ),
            Verdict::passed("Parfum"),
            Verdict::passed("Aqua"),
        ]);

        let record = build_session(&list, &verdicts, Actor::anonymous());
        let names: Vec<&str> = record
            .final_verdicts
            .iter()
            .map(|v| v.ingredient.as_str())
            .collect();
        assert_eq!(names, vec!["Aqua", "Phenoxyethanol", "Parfum"]);
    }

    #[test]
    fn missing_verdict_becomes_unknown_defensively() {
        let list = ingredients(&["Aqua", "Mystery Extract"]);
        let verdicts = VerdictSet::from_verdicts([Verdict::passed("Aqua")]);

        let record = build_session(&list, &verdicts, Actor::anonymous());
        assert_eq!(record.final_verdicts.len(), 2);
        let missing = &record.final_verdicts[1];
        assert_eq!(missing.label, ClassificationLabel::Unknown);
        assert_eq!(missing.reason.as_deref(), Some("no classification produced"));
    }

    #[test]
    fn corrected_name_verdicts_are_appended_not_lost() {
        let list = ingredients(&["Aqua"]);
        let verdicts = VerdictSet::from_verdicts([
            Verdict::passed("Aqua"),
            Verdict::passed("Tocopherol"), // corrected spelling of a source typo
        ]);

        let record = build_session(&list, &verdicts, Actor::anonymous());
        assert_eq!(record.final_verdicts.len(), 2);
        assert_eq!(record.final_verdicts[1].ingredient, "Tocopherol");
    }

    #[test]
    fn duplicate_source_entries_emit_one_verdict() {
        let list = ingredients(&["Aqua", "AQUA"]);
        let verdicts = VerdictSet::from_verdicts([Verdict::passed("Aqua")]);

        let record = build_session(&list, &verdicts, Actor::anonymous());
        assert_eq!(record.final_verdicts.len(), 1);
    }

    #[test]
    fn counts_summarize_the_final_set() {
        let list = ingredients(&["Aqua", "Hydroquinone"]);
        let verdicts = VerdictSet::from_verdicts([
            Verdict::passed("Aqua"),
            Verdict::new("Hydroquinone", ClassificationLabel::Forbidden, None, None),
        ]);

        let record = build_session(&list, &verdicts, Actor::User("u-1".to_string()));
        assert_eq!(record.passed_count(), 1);
        assert_eq!(record.forbidden_count(), 1);
        assert_eq!(record.actor.id(), "u-1");
    }
}
