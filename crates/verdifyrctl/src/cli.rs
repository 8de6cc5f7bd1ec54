//! CLI - command-line argument parsing
//!
//! Defines the CLI structure using clap. Kept separate from execution
//! logic in main.rs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Verdifyr CLI
#[derive(Parser)]
#[command(name = "verdifyrctl")]
#[command(about = "Verdifyr - EU cosmetics ingredient compliance checker", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check an ingredient list against the EU cosmetics annexes
    Check {
        /// Ingredient list text (read from --file when omitted)
        text: Option<String>,

        /// Read the ingredient list from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Attribute the session to a signed-in user id
        #[arg(long)]
        user: Option<String>,

        /// Print the raw session record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run only the normalizer over raw text (debugging OCR input)
    Normalize {
        /// Raw ingredient list text
        text: String,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// List recent sessions from the local log
    History {
        /// Maximum number of sessions to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show one stored session in full
    Show {
        /// Session id as printed by `history`
        session_id: String,
    },
}
