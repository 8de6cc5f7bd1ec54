//! Pipeline error taxonomy
//!
//! `Input` rejects the request outright. `Oracle` only surfaces when every
//! classification pass failed and there is nothing to report; a single
//! failed pass degrades to an empty contribution instead. Merge warnings
//! are log events, not errors, and persistence failures travel separately
//! (see [`crate::store::StoreError`]) so a dead store never discards
//! computed verdicts.

use crate::llm_client::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Missing or malformed request fields; the request is rejected
    #[error("invalid input: {0}")]
    Input(String),

    /// Every oracle pass failed; no verdict data exists at all
    #[error("classification oracle unavailable: {0}")]
    Oracle(#[from] LlmError),
}
