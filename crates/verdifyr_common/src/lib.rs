//! Verdifyr core library
//!
//! Classification pipeline for checking cosmetic ingredient lists against
//! EU Regulation (EC) No 1223/2009. Raw text is normalized into an ordered
//! ingredient list, classified by an LLM oracle across several passes, and
//! merged into one deduplicated, annex-grounded verdict per ingredient.
//! The merge is severity-aware and sticky: a forbidden finding is never
//! softened by a later pass, and an ingredient a later pass forgets is
//! carried through from the earlier one.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod ingredient;
pub mod llm_client;
pub mod normalizer;
pub mod oracle;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod store;
pub mod taxonomy;
pub mod verdict;
pub mod verdict_map;
pub mod vocabulary;

pub use aggregator::{merge, merge_all};
pub use config::Config;
pub use error::PipelineError;
pub use ingredient::{canonical_key, Ingredient};
pub use llm_client::{FakeLlmClient, HttpLlmClient, LlmClient, LlmError, OracleConfig};
pub use normalizer::{normalize, normalize_ingredients, Normalized};
pub use oracle::AnnexClassifier;
pub use pipeline::{Pipeline, PipelineOutcome};
pub use session::{build_session, Actor, SessionRecord};
pub use store::{SessionGateway, SessionSummary, SqliteSessionStore, StoreError};
pub use taxonomy::{ClassificationLabel, RestrictedClass};
pub use verdict::{Verdict, VerdictSet};
pub use vocabulary::Vocabulary;
