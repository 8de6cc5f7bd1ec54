//! Annex Classifier: the oracle adapter
//!
//! Thin wrapper over an [`LlmClient`] issuing the three classification
//! calls: the bulk first pass, the corrective review of non-passed entries,
//! and per-ingredient verification. It builds prompts, sends them, and
//! flattens whatever JSON shape comes back into a list of raw objects for
//! the verdict normalizer. No merging, dedup, or invariant enforcement
//! happens here, and the output is untrusted: retries and empty-pass
//! fallbacks are the pipeline's job.

use crate::llm_client::{LlmClient, LlmError};
use crate::prompts;
use crate::verdict::Verdict;
use crate::vocabulary::Vocabulary;
use serde_json::Value;
use tracing::debug;

/// How many vocabulary names the review prompt may carry
const VOCABULARY_SAMPLE_LIMIT: usize = 1000;

pub struct AnnexClassifier {
    client: Box<dyn LlmClient>,
}

impl AnnexClassifier {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Bulk pass: one raw classification object per ingredient (best effort;
    /// the oracle may still drop or rename entries, which the aggregator's
    /// preservation rules absorb).
    pub fn classify_list(&self, ingredients: &[String]) -> Result<Vec<Value>, LlmError> {
        let user = prompts::classify_user_prompt(ingredients);
        let response = self.client.complete_json(prompts::CLASSIFY_SYSTEM, &user)?;
        let raws = flatten_response(&response);
        debug!(
            requested = ingredients.len(),
            received = raws.len(),
            "bulk classification pass returned"
        );
        Ok(raws)
    }

    /// Corrective review of non-passed verdicts, with vocabulary context for
    /// canonical-name matching.
    pub fn review_non_passed(
        &self,
        non_passed: &[&Verdict],
        vocabulary: &Vocabulary,
    ) -> Result<Vec<Value>, LlmError> {
        let user =
            prompts::review_user_prompt(non_passed, &vocabulary.sample(VOCABULARY_SAMPLE_LIMIT));
        let response = self.client.complete_json(prompts::REVIEW_SYSTEM, &user)?;
        Ok(flatten_response(&response))
    }

    /// Per-ingredient verification against the full list and the prior
    /// verdict. The queried name is injected into the result when the oracle
    /// leaves it out, so the verdict normalizer can always key it.
    pub fn verify_ingredient(
        &self,
        ingredient: &str,
        full_list: &[String],
        prior: &Verdict,
    ) -> Result<Value, LlmError> {
        let user = prompts::verify_user_prompt(ingredient, full_list, prior);
        let mut response = self.client.complete_json(prompts::VERIFY_SYSTEM, &user)?;
        if let Value::Object(map) = &mut response {
            let has_name = map
                .get("ingredient")
                .and_then(Value::as_str)
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false);
            if !has_name {
                map.insert("ingredient".to_string(), Value::String(ingredient.to_string()));
            }
        }
        Ok(response)
    }
}

/// Known list-carrying fields across prompt revisions
const LIST_FIELDS: &[&str] = &["classifications", "results", "ingredients"];

/// Severity buckets the review pass answers in
const BUCKETS: &[(&str, &str)] = &[
    ("passed", "PASSED"),
    ("restricted", "RESTRICTED"),
    ("forbidden", "FORBIDDEN"),
    ("unknown", "UNKNOWN"),
];

/// Flatten an oracle response into raw per-ingredient objects. Accepts a
/// top-level array, an object wrapping one under a known field, or the
/// bucketed `{passed, restricted, forbidden, unknown}` shape, whose bucket
/// membership is folded into each entry as a verdict field. Anything else
/// flattens to nothing; the caller treats that as an empty pass.
pub fn flatten_response(response: &Value) -> Vec<Value> {
    if let Value::Array(items) = response {
        return items.clone();
    }

    let Value::Object(map) = response else {
        return Vec::new();
    };

    for field in LIST_FIELDS {
        if let Some(Value::Array(items)) = map.get(*field) {
            return items.clone();
        }
    }

    let mut raws = Vec::new();
    for (bucket, verdict) in BUCKETS {
        let Some(Value::Array(items)) = map.get(*bucket) else {
            continue;
        };
        for item in items {
            match item {
                Value::String(name) => raws.push(serde_json::json!({
                    "ingredient": name,
                    "verdict": verdict,
                })),
                Value::Object(fields) => {
                    let mut fields = fields.clone();
                    // Bucket membership is the verdict unless the entry
                    // already states one
                    if !fields.contains_key("verdict") && !fields.contains_key("classification") {
                        fields.insert("verdict".to_string(), Value::String(verdict.to_string()));
                    }
                    raws.push(Value::Object(fields));
                }
                _ => {}
            }
        }
    }
    raws
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::FakeLlmClient;
    use crate::taxonomy::ClassificationLabel;
    use serde_json::json;

    #[test]
    fn flattens_wrapped_classification_array() {
        let response = json!({"classifications": [
            {"ingredient": "Aqua", "verdict": "PASSED"},
        ]});
        let raws = flatten_response(&response);
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0]["ingredient"], "Aqua");
    }

    #[test]
    fn flattens_bucketed_review_shape() {
        let response = json!({
            "passed": ["Aqua"],
            "restricted": [{"ingredient": "Phenoxyethanol", "annex": "V", "reason": "preservative"}],
            "unknown": [{"ingredient": "Mystery Blend", "reason": "trade name"}],
        });
        let raws = flatten_response(&response);
        assert_eq!(raws.len(), 3);
        assert_eq!(raws[0]["verdict"], "PASSED");
        // Object entries keep their own fields, gaining only the bucket verdict
        assert_eq!(raws[1]["annex"], "V");
        assert_eq!(raws[1]["verdict"], "RESTRICTED");
        assert_eq!(raws[2]["verdict"], "UNKNOWN");
    }

    #[test]
    fn unrecognized_shape_flattens_to_nothing() {
        assert!(flatten_response(&json!({"weird": true})).is_empty());
        assert!(flatten_response(&json!("prose answer")).is_empty());
    }

    #[test]
    fn verify_injects_missing_ingredient_name() {
        let fake = FakeLlmClient::always(json!({
            "classification": "Forbidden",
            "explanation": "banned substance",
        }));
        let classifier = AnnexClassifier::new(Box::new(fake));
        let prior = Verdict::new("Hydroquinone", ClassificationLabel::Unknown, None, None);

        let raw = classifier
            .verify_ingredient("Hydroquinone", &["Hydroquinone".to_string()], &prior)
            .unwrap();
        assert_eq!(raw["ingredient"], "Hydroquinone");
    }

    #[test]
    fn transport_error_propagates_untouched() {
        let fake = FakeLlmClient::always_failing(LlmError::EmptyResponse);
        let classifier = AnnexClassifier::new(Box::new(fake));
        assert!(classifier.classify_list(&["Aqua".to_string()]).is_err());
    }
}
