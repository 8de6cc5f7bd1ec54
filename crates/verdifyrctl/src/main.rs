//! Verdifyr CLI - check cosmetic ingredient lists against EU regulation
//!
//! Wires config, oracle client, vocabulary, and session store together and
//! drives the classification pipeline from the command line.

mod cli;
mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;
use verdifyr_common::{
    normalize, Actor, AnnexClassifier, Config, HttpLlmClient, Pipeline, SessionGateway,
    SqliteSessionStore, Vocabulary,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Check { text, file, user, json } => {
            let raw = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {:?}", path))?,
                (None, None) => bail!("provide ingredient text or --file"),
            };
            check(&config, &raw, user, json)
        }
        Commands::Normalize { text, json } => {
            let result = normalize(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let vocabulary = load_vocabulary(&config)?;
                for name in &result.normalized {
                    let known = if vocabulary.contains(name) {
                        " (known INCI name)"
                    } else {
                        ""
                    };
                    println!("{}{}", name, known);
                }
                for note in &result.notes {
                    println!("note: {}", note);
                }
            }
            Ok(())
        }
        Commands::History { limit } => {
            let store = open_store(&config)?;
            output::print_history(&store.recent(limit)?);
            Ok(())
        }
        Commands::Show { session_id } => {
            let store = open_store(&config)?;
            match store.load(&session_id)? {
                Some(record) => output::print_session(&record),
                None => bail!("no session with id {}", session_id),
            }
            Ok(())
        }
    }
}

fn check(config: &Config, raw: &str, user: Option<String>, json: bool) -> Result<()> {
    let client = HttpLlmClient::new(config.oracle.clone())?;
    let classifier = AnnexClassifier::new(Box::new(client));
    let vocabulary = load_vocabulary(config)?;

    let mut pipeline = Pipeline::new(classifier, vocabulary);
    if config.store.enabled {
        pipeline = pipeline.with_store(Box::new(open_store(config)?));
    }

    let actor = match user {
        Some(id) => Actor::User(id),
        None => Actor::anonymous(),
    };

    let outcome = pipeline.run(raw, actor)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.record)?);
    } else {
        output::print_report(&outcome);
    }
    Ok(())
}

fn load_vocabulary(config: &Config) -> Result<Vocabulary> {
    match &config.vocabulary_file {
        Some(path) => Vocabulary::from_file(path),
        None => Ok(Vocabulary::builtin()),
    }
}

fn open_store(config: &Config) -> Result<SqliteSessionStore> {
    let store = match &config.store.path {
        Some(path) => SqliteSessionStore::open(path),
        None => SqliteSessionStore::open_default(),
    }?;
    Ok(store)
}
