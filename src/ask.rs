//! `stock ask`: natural-language questions answered by the service.

use anyhow::{Context, Result};

use crate::client::HttpBackend;
use crate::config::Config;

pub async fn run_ask(config: &Config, question: &str, json: bool) -> Result<()> {
    if question.trim().is_empty() {
        println!("No question.");
        return Ok(());
    }

    let backend = HttpBackend::new(&config.service)?;
    let response = backend
        .ask(question)
        .await
        .context("Error querying inventory")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", response.answer.trim_end());
    if !response.items.is_empty() {
        println!();
        println!("Referenced items:");
        for item in &response.items {
            println!("  {}", cited_item(item));
        }
    }
    Ok(())
}

/// One-line label for an item the service cited. Items come back
/// unparsed, so every field is optional.
fn cited_item(item: &serde_json::Value) -> String {
    let field = |key: &str| {
        item.get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let id = item
        .get("id")
        .and_then(|v| v.as_i64())
        .map(|id| format!("#{}", id))
        .unwrap_or_else(|| "#?".to_string());
    let label: Vec<&str> = ["category", "brand", "model"]
        .into_iter()
        .filter_map(field)
        .collect();
    if label.is_empty() {
        id
    } else {
        format!("{} {}", id, label.join(" / "))
    }
}
