//! End-to-end pipeline invariant tests
//!
//! Drives the whole pipeline with scripted oracle responses and checks the
//! aggregation invariants: nothing lost, nothing duplicated, forbidden
//! sticky, source order preserved, and persistence failure isolated from
//! the computed verdicts.

use serde_json::json;
use verdifyr_common::{
    canonical_key, Actor, AnnexClassifier, ClassificationLabel, FakeLlmClient, LlmError, Pipeline,
    RestrictedClass, SessionGateway, SessionRecord, SessionSummary, SqliteSessionStore,
    StoreError, Vocabulary,
};

fn pipeline_with(script: Vec<Result<serde_json::Value, LlmError>>) -> Pipeline {
    let classifier = AnnexClassifier::new(Box::new(FakeLlmClient::new(script)));
    Pipeline::new(classifier, Vocabulary::builtin())
}

#[test]
fn every_input_ingredient_gets_exactly_one_verdict() {
    // The oracle "forgets" Parfum in the bulk pass and never mentions it
    // again; the session must still cover it, exactly once.
    let pipeline = pipeline_with(vec![
        Ok(json!({"classifications": [
            {"ingredient": "Aqua", "verdict": "PASSED"},
            {"ingredient": "Phenoxyethanol", "verdict": "RESTRICTED", "annex": "V",
             "reason": "preservative, max 1%"},
        ]})),
        // review pass echoes only the preservative
        Ok(json!({"restricted": [
            {"ingredient": "Phenoxyethanol", "annex": "V", "reason": "preservative, max 1%"},
        ]})),
        // verify pass confirms it
        Ok(json!({"ingredient": "Phenoxyethanol", "classification": "Restricted",
                  "verified_correct": true, "explanation": "Annex V entry 29"})),
    ]);

    let outcome = pipeline
        .run("Aqua, Phenoxyethanol, Parfum", Actor::anonymous())
        .unwrap();

    let mut keys: Vec<String> = outcome
        .record
        .final_verdicts
        .iter()
        .map(|v| canonical_key(&v.ingredient))
        .collect();
    keys.sort();
    let mut expected: Vec<String> = ["Aqua", "Phenoxyethanol", "Parfum"]
        .iter()
        .map(|n| canonical_key(n))
        .collect();
    expected.sort();
    assert_eq!(keys, expected);

    // The forgotten ingredient is covered defensively as unknown
    let parfum = outcome
        .record
        .final_verdicts
        .iter()
        .find(|v| canonical_key(&v.ingredient) == "parfum")
        .unwrap();
    assert_eq!(parfum.label, ClassificationLabel::Unknown);
    assert_eq!(parfum.reason.as_deref(), Some("no classification produced"));
}

#[test]
fn restricted_preservative_survives_review_omission() {
    // Pass 1 flags Phenoxyethanol; pass 2 omits it entirely; pass 3 fails.
    // The restricted verdict must survive with its sub-category.
    let pipeline = pipeline_with(vec![
        Ok(json!({"classifications": [
            {"ingredient": "Phenoxyethanol", "verdict": "RESTRICTED", "annex": "V",
             "reason": "preservative, max 1%"},
        ]})),
        Ok(json!({"passed": [], "restricted": [], "unknown": []})),
        Err(LlmError::Http("oracle down".to_string())),
    ]);

    let outcome = pipeline.run("Phenoxyethanol", Actor::anonymous()).unwrap();
    let verdict = &outcome.record.final_verdicts[0];
    assert_eq!(
        verdict.label,
        ClassificationLabel::Restricted(RestrictedClass::Preservative)
    );
    assert_eq!(verdict.annex_reference.as_deref(), Some("V"));
}

#[test]
fn forbidden_is_never_downgraded_across_passes() {
    let pipeline = pipeline_with(vec![
        Ok(json!({"classifications": [
            {"ingredient": "Hydroquinone", "verdict": "FORBIDDEN", "annex": "II",
             "reason": "banned skin-lightening agent"},
            {"ingredient": "Aqua", "verdict": "PASSED"},
        ]})),
        // review flips it to passed (hypothetical oracle error)
        Ok(json!({"passed": ["Hydroquinone"]})),
        // verify also claims passed
        Ok(json!({"ingredient": "Hydroquinone", "classification": "Passed",
                  "verified_correct": false})),
    ]);

    let outcome = pipeline
        .run("Hydroquinone, Aqua", Actor::anonymous())
        .unwrap();
    let verdict = outcome
        .record
        .final_verdicts
        .iter()
        .find(|v| v.ingredient == "Hydroquinone")
        .unwrap();
    assert_eq!(verdict.label, ClassificationLabel::Forbidden);
    assert_eq!(verdict.annex_reference.as_deref(), Some("II"));
}

#[test]
fn output_order_matches_submission_order() {
    let pipeline = pipeline_with(vec![Ok(json!({"classifications": [
        // Oracle answers in its own order
        {"ingredient": "Fragrance", "verdict": "PASSED"},
        {"ingredient": "Water", "verdict": "PASSED"},
        {"ingredient": "Glycerin", "verdict": "PASSED"},
    ]}))]);

    let outcome = pipeline
        .run("Water, Glycerin*, Fragrance", Actor::anonymous())
        .unwrap();
    let names: Vec<&str> = outcome
        .record
        .final_verdicts
        .iter()
        .map(|v| v.ingredient.as_str())
        .collect();
    assert_eq!(names, vec!["Water", "Glycerin", "Fragrance"]);
}

#[test]
fn verified_flag_set_when_verify_pass_confirms() {
    let pipeline = pipeline_with(vec![
        Ok(json!({"classifications": [
            {"ingredient": "Triclosan", "verdict": "RESTRICTED", "annex": "V",
             "reason": "preservative limits"},
        ]})),
        Ok(json!({"restricted": [
            {"ingredient": "Triclosan", "annex": "V", "reason": "preservative limits"},
        ]})),
        Ok(json!({"ingredient": "Triclosan", "classification": "Restricted",
                  "verified_correct": true, "explanation": "Annex V entry 25"})),
    ]);

    let outcome = pipeline.run("Triclosan", Actor::anonymous()).unwrap();
    assert!(outcome.record.final_verdicts[0].verified);
}

#[test]
fn session_is_persisted_when_store_is_configured() {
    let store = SqliteSessionStore::in_memory().unwrap();
    let classifier = AnnexClassifier::new(Box::new(FakeLlmClient::always(json!({
        "classifications": [{"ingredient": "Aqua", "verdict": "PASSED"}]
    }))));
    let pipeline = Pipeline::new(classifier, Vocabulary::builtin()).with_store(Box::new(store));

    let outcome = pipeline.run("Aqua", Actor::User("u-7".to_string())).unwrap();
    assert!(outcome.persisted_row_id.is_some());
    assert!(outcome.persistence_error.is_none());
}

/// Store that always fails, for the availability-over-persistence rule
struct BrokenStore;

impl SessionGateway for BrokenStore {
    fn save(&self, _record: &SessionRecord) -> Result<i64, StoreError> {
        Err(StoreError::Corrupt("disk on fire".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<SessionSummary>, StoreError> {
        Ok(Vec::new())
    }

    fn load(&self, _session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(None)
    }
}

#[test]
fn persistence_failure_does_not_invalidate_verdicts() {
    let classifier = AnnexClassifier::new(Box::new(FakeLlmClient::always(json!({
        "classifications": [{"ingredient": "Aqua", "verdict": "PASSED"}]
    }))));
    let pipeline = Pipeline::new(classifier, Vocabulary::builtin()).with_store(Box::new(BrokenStore));

    let outcome = pipeline.run("Aqua", Actor::anonymous()).unwrap();
    assert_eq!(outcome.record.final_verdicts.len(), 1);
    assert!(outcome.persisted_row_id.is_none());
    assert!(outcome.persistence_error.unwrap().contains("disk on fire"));
}

#[test]
fn rerunning_identical_input_gives_identical_labels() {
    // Retried/replayed oracle contributions merge to a no-op
    let script = || {
        vec![Ok(json!({"classifications": [
            {"ingredient": "Aqua", "verdict": "PASSED"},
            {"ingredient": "Hydroquinone", "verdict": "FORBIDDEN", "annex": "II",
             "reason": "banned"},
        ]})),
        Ok(json!({"forbidden": [{"ingredient": "Hydroquinone", "reason": "banned"}]})),
        Ok(json!({"ingredient": "Hydroquinone", "classification": "Forbidden",
                  "verified_correct": true}))]
    };

    let first = pipeline_with(script())
        .run("Aqua, Hydroquinone", Actor::anonymous())
        .unwrap();
    let second = pipeline_with(script())
        .run("Aqua, Hydroquinone", Actor::anonymous())
        .unwrap();

    let labels = |record: &SessionRecord| -> Vec<(String, ClassificationLabel)> {
        record
            .final_verdicts
            .iter()
            .map(|v| (v.ingredient.clone(), v.label))
            .collect()
    };
    assert_eq!(labels(&first.record), labels(&second.record));
}
