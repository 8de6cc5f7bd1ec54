//! Pipeline orchestration
//!
//! One submission runs a short sequential chain: normalize, bulk
//! classification, corrective review of everything that did not pass,
//! per-ingredient verification, merge, session build, persist. Each pass is
//! independent; a failed oracle call contributes an empty set and the run
//! continues on prior-pass data. The pipeline errors out only when the
//! input is unusable or when no pass produced anything at all. Persistence
//! failure is reported in the outcome, never thrown over computed verdicts.
//!
//! Everything is request-scoped: no state is shared between runs beyond the
//! injected classifier, vocabulary, and store handles.

use crate::aggregator;
use crate::error::PipelineError;
use crate::llm_client::LlmError;
use crate::normalizer;
use crate::oracle::AnnexClassifier;
use crate::session::{build_session, Actor, SessionRecord};
use crate::store::SessionGateway;
use crate::verdict::{Verdict, VerdictSet};
use crate::verdict_map;
use crate::vocabulary::Vocabulary;
use tracing::{info, warn};

/// Result of one pipeline run. The record is always complete; degradation
/// and persistence trouble are reported alongside it.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub record: SessionRecord,
    /// Normalizer notes (what was cleaned up, or why nothing parsed)
    pub notes: Vec<String>,
    /// Passes whose oracle call failed even after retry
    pub degraded_passes: Vec<&'static str>,
    /// Row id assigned by the store, when persistence succeeded
    pub persisted_row_id: Option<i64>,
    /// Store failure, reported without invalidating the verdicts
    pub persistence_error: Option<String>,
}

pub struct Pipeline {
    classifier: AnnexClassifier,
    vocabulary: Vocabulary,
    store: Option<Box<dyn SessionGateway>>,
}

impl Pipeline {
    pub fn new(classifier: AnnexClassifier, vocabulary: Vocabulary) -> Self {
        Self {
            classifier,
            vocabulary,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Box<dyn SessionGateway>) -> Self {
        self.store = Some(store);
        self
    }

    /// Run the full pipeline over one raw ingredient list.
    pub fn run(&self, raw_text: &str, actor: Actor) -> Result<PipelineOutcome, PipelineError> {
        if raw_text.trim().is_empty() {
            return Err(PipelineError::Input("ingredient text is empty".to_string()));
        }

        let (ingredients, notes) = normalizer::normalize_ingredients(raw_text);
        if ingredients.is_empty() {
            // Nothing to classify; the session still records why
            info!("no ingredients parsed, skipping oracle passes");
            let record = build_session(&ingredients, &VerdictSet::new(), actor);
            return Ok(self.persist(record, notes, Vec::new()));
        }

        let names: Vec<String> = ingredients
            .iter()
            .map(|i| i.display_name().to_string())
            .collect();

        let mut degraded = Vec::new();
        let mut first_error: Option<LlmError> = None;

        // Pass 1: bulk classification
        let mut merged = match with_retry("classify", || self.classifier.classify_list(&names)) {
            Ok(raws) => verdict_map::map_all(&raws),
            Err(e) => {
                warn!(pass = "classify", error = %e, "pass contributes nothing");
                degraded.push("classify");
                first_error = Some(e);
                VerdictSet::new()
            }
        };

        // Pass 2: corrective review of everything that did not pass
        let review_set = {
            let non_passed = merged.non_passed();
            if non_passed.is_empty() {
                // Nothing flagged (or no first pass at all): nothing to review
                None
            } else {
                match with_retry("review", || {
                    self.classifier.review_non_passed(&non_passed, &self.vocabulary)
                }) {
                    Ok(raws) => Some(verdict_map::map_all(&raws)),
                    Err(e) => {
                        warn!(pass = "review", error = %e, "pass contributes nothing");
                        degraded.push("review");
                        first_error.get_or_insert(e);
                        None
                    }
                }
            }
        };
        if let Some(set) = review_set {
            merged = aggregator::merge(&merged, &set);
        }

        // Pass 3: verify each remaining non-passed verdict individually
        let targets: Vec<Verdict> = merged.non_passed().into_iter().cloned().collect();
        for target in &targets {
            match with_retry("verify", || {
                self.classifier
                    .verify_ingredient(&target.ingredient, &names, target)
            }) {
                Ok(raw) => {
                    if let Some(verdict) = verdict_map::map_raw(&raw) {
                        let single = VerdictSet::from_verdicts([verdict]);
                        merged = aggregator::merge(&merged, &single);
                    }
                }
                Err(e) => {
                    warn!(
                        pass = "verify",
                        ingredient = %target.ingredient,
                        error = %e,
                        "verification skipped for this ingredient"
                    );
                    if !degraded.contains(&"verify") {
                        degraded.push("verify");
                    }
                    first_error.get_or_insert(e);
                }
            }
        }

        // Nothing at all to show: surface the oracle failure
        if merged.is_empty() {
            if let Some(error) = first_error {
                return Err(PipelineError::Oracle(error));
            }
        }

        let record = build_session(&ingredients, &merged, actor);
        info!(
            session = %record.session_id,
            ingredients = record.source_ingredients.len(),
            forbidden = record.forbidden_count(),
            "pipeline run complete"
        );
        Ok(self.persist(record, notes, degraded))
    }

    fn persist(
        &self,
        record: SessionRecord,
        notes: Vec<String>,
        degraded_passes: Vec<&'static str>,
    ) -> PipelineOutcome {
        let (persisted_row_id, persistence_error) = match &self.store {
            Some(store) => match store.save(&record) {
                Ok(row_id) => (Some(row_id), None),
                Err(e) => {
                    warn!(error = %e, "session log not persisted");
                    (None, Some(e.to_string()))
                }
            },
            None => (None, None),
        };

        PipelineOutcome {
            record,
            notes,
            degraded_passes,
            persisted_row_id,
            persistence_error,
        }
    }
}

/// One retry per oracle call; the merge is idempotent so a duplicate
/// contribution from a half-succeeded first attempt is harmless.
fn with_retry<T>(
    pass: &'static str,
    mut op: impl FnMut() -> Result<T, LlmError>,
) -> Result<T, LlmError> {
    match op() {
        Ok(value) => Ok(value),
        Err(first) => {
            warn!(pass, error = %first, "oracle call failed, retrying once");
            op()
        }
    }
}
