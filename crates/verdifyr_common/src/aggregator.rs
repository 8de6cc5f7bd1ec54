//! Cross-pass verdict aggregation
//!
//! Several independently-invoked classification passes each produce a
//! verdict set; [`merge`] folds them into one authoritative set. Merging is
//! pure copy-on-merge over sets keyed by canonical ingredient name, which
//! makes it idempotent (`merge(v, v) == v`), associative, and gives the
//! empty set as identity, so passes can be folded in any grouping.
//!
//! Safety rules enforced here:
//! - severity precedence: forbidden > restricted > unknown > passed; the
//!   more severe label wins when both passes mention an ingredient
//! - forbidden is sticky: once a pass marks an ingredient forbidden, later
//!   passes can enrich that verdict (fill in annex or reason) but never
//!   soften it
//! - fallback preservation: an ingredient a later pass fails to mention is
//!   carried through from the earlier set, never dropped
//! - a verdict without an identifiable ingredient name is discarded with a
//!   warning and never aborts the merge

use crate::verdict::{Verdict, VerdictSet};
use tracing::warn;

/// Merge two verdict sets into a new one. Neither input is modified.
pub fn merge(existing: &VerdictSet, incoming: &VerdictSet) -> VerdictSet {
    let mut result = existing.clone();
    for verdict in incoming.iter() {
        if verdict.key().is_empty() {
            warn!("discarding incoming verdict with empty ingredient name");
            continue;
        }
        let resolved = match result.get(&verdict.ingredient) {
            Some(current) => resolve(current, verdict),
            None => verdict.clone(),
        };
        result.insert(resolved);
    }
    result
}

/// Fold any number of pass results into one set, oldest pass first.
pub fn merge_all<'a>(passes: impl IntoIterator<Item = &'a VerdictSet>) -> VerdictSet {
    passes
        .into_iter()
        .fold(VerdictSet::new(), |acc, pass| merge(&acc, pass))
}

/// Resolve two verdicts for the same ingredient into one.
pub fn resolve(existing: &Verdict, incoming: &Verdict) -> Verdict {
    // Sticky forbidden: never softened, only enriched
    if existing.label.is_forbidden() {
        return enrich(existing, incoming);
    }
    if incoming.label.severity() > existing.label.severity() {
        return enrich(incoming, existing);
    }
    if incoming.label.severity() < existing.label.severity() {
        return enrich(existing, incoming);
    }

    // Equal severity: keep the existing verdict, but let a named restriction
    // sub-category refine a general Annex III one
    use crate::taxonomy::{ClassificationLabel, RestrictedClass};
    if existing.label == ClassificationLabel::Restricted(RestrictedClass::General)
        && matches!(incoming.label, ClassificationLabel::Restricted(class) if class != RestrictedClass::General)
    {
        return enrich(incoming, existing);
    }
    enrich(existing, incoming)
}

/// Copy of `winner` with gaps filled from `other`. The label never changes.
fn enrich(winner: &Verdict, other: &Verdict) -> Verdict {
    let mut result = winner.clone();
    if result.annex_reference.is_none() {
        result.annex_reference = other.annex_reference.clone();
    }
    if result.reason.is_none() && !result.label.is_passed() {
        result.reason = other.reason.clone();
    }
    // Corroboration survives any enrichment
    result.verified = winner.verified || other.verified;
    result
}
