//! Transactions export loader.
//!
//! Accepts either a bare JSON array of transactions or an object with a
//! `transactions` array, as written by the provider's export script.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use campus_store::usecase::reconcile::Transaction;

#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    Bare(Vec<Transaction>),
    Wrapped { transactions: Vec<Transaction> },
}

pub fn load(path: &Path) -> Result<Vec<Transaction>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    parse(&content).with_context(|| format!("invalid transactions JSON in {}", path.display()))
}

pub fn parse(content: &str) -> Result<Vec<Transaction>> {
    let export: Export = serde_json::from_str(content)?;
    Ok(match export {
        Export::Bare(transactions) | Export::Wrapped { transactions } => transactions,
    })
}
