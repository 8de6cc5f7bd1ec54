//! Oracle prompt text
//!
//! System prompts and user-prompt builders for the three oracle calls. All
//! of them demand strict JSON; the verdict normalizer copes with the shape
//! drift that still happens in practice.

use crate::verdict::Verdict;

/// Annex taxonomy recap included wherever the oracle has to name an annex.
pub const ANNEX_TAXONOMY: &str = "\
Annex II: substances prohibited in cosmetic products (forbidden).\n\
Annex III: substances subject to restrictions (permitted within limits).\n\
Annex IV: colourants allowed within limits.\n\
Annex V: preservatives allowed within limits.\n\
Annex VI: UV filters allowed within limits.";

/// Bulk classification pass.
pub const CLASSIFY_SYSTEM: &str = "\
You are an EU cosmetics compliance expert applying Regulation (EC) No 1223/2009.\n\
You classify each ingredient of a cosmetic product against the regulation's annexes.\n\
Respond with structured JSON only, no prose.";

pub fn classify_user_prompt(ingredients: &[String]) -> String {
    format!(
        "Classify every ingredient below against the EU cosmetics annexes.\n\n\
         {taxonomy}\n\n\
         Ingredient list (in label order):\n{list}\n\n\
         Respond strictly in JSON:\n\
         {{\n\
           \"classifications\": [\n\
             {{\"ingredient\": \"string\", \"verdict\": \"PASSED | RESTRICTED | FORBIDDEN | UNKNOWN\", \
              \"annex\": \"II | III | IV | V | VI or null\", \"reason\": \"string or null\"}}\n\
           ]\n\
         }}\n\
         Include one entry per input ingredient. Do not invent or omit ingredients.",
        taxonomy = ANNEX_TAXONOMY,
        list = ingredients.join("\n"),
    )
}

/// Corrective review of everything that did not pass, with INCI vocabulary
/// context for best-match canonical naming.
pub const REVIEW_SYSTEM: &str = "\
You are an EU cosmetics regulation and INCI nomenclature expert.\n\
You review previously flagged ingredients and normalize unknown names against \
an official INCI vocabulary.\n\
Return structured JSON only, no explanations or commentary.";

pub fn review_user_prompt(non_passed: &[&Verdict], vocabulary_sample: &str) -> String {
    let flagged = serde_json::to_string_pretty(
        &non_passed
            .iter()
            .map(|v| {
                serde_json::json!({
                    "ingredient": v.ingredient,
                    "classification": v.label.as_str(),
                    "annex": v.annex_reference,
                    "reason": v.reason,
                })
            })
            .collect::<Vec<_>>(),
    )
    .unwrap_or_else(|_| "[]".to_string());

    format!(
        "Flagged ingredients from the first pass:\n{flagged}\n\n\
         Reference vocabulary (official INCI-style names):\n{vocabulary_sample}\n\n\
         {taxonomy}\n\n\
         Goals:\n\
         1. For each RESTRICTED ingredient, state which annex regulates it and why. \
            Assume use within legal limits; no speculation about concentration.\n\
         2. For each UNKNOWN ingredient, try to normalize it to an INCI name from the \
            vocabulary. A confident exact match may be reported as passed under the \
            corrected name; otherwise keep it unknown with a reason.\n\n\
         Respond strictly in JSON:\n\
         {{\n\
           \"passed\": [\"string\"],\n\
           \"restricted\": [{{\"ingredient\": \"string\", \"annex\": \"string\", \"reason\": \"string\"}}],\n\
           \"forbidden\": [{{\"ingredient\": \"string\", \"reason\": \"string\"}}],\n\
           \"unknown\": [{{\"ingredient\": \"string\", \"reason\": \"string\"}}]\n\
         }}",
        flagged = flagged,
        vocabulary_sample = vocabulary_sample,
        taxonomy = ANNEX_TAXONOMY,
    )
}

/// Per-ingredient verification pass.
pub const VERIFY_SYSTEM: &str = "\
You are Verdifyr, a regulatory assistant specialized in EU cosmetics compliance.\n\
Given a product's ingredient list and one ingredient's current classification, \
verify or correct that classification under Regulation (EC) No 1223/2009.\n\
Explain plainly, as to a consumer, without quoting raw legislation. Never guess: \
if uncertain, say manual verification is required.\n\
Output structured JSON only:\n\
{\n\
  \"ingredient\": \"...\",\n\
  \"classification\": \"Passed | Restricted | Forbidden | Unknown\",\n\
  \"verified_correct\": true,\n\
  \"corrected_classification\": \"string or null\",\n\
  \"explanation\": \"short plain-English summary\"\n\
}";

pub fn verify_user_prompt(ingredient: &str, full_list: &[String], prior: &Verdict) -> String {
    format!(
        "Ingredient: {ingredient}\n\n\
         Full ingredient list:\n{list}\n\n\
         Current classification:\n{prior}\n\n\
         Analyze only the specified ingredient and respond in the required JSON format.",
        ingredient = ingredient,
        list = full_list.join(", "),
        prior = serde_json::to_string_pretty(&serde_json::json!({
            "ingredient": prior.ingredient,
            "classification": prior.label.as_str(),
            "annex": prior.annex_reference,
            "reason": prior.reason,
        }))
        .unwrap_or_default(),
    )
}
