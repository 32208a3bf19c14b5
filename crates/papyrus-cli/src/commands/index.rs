//! Index command handlers

use anyhow::{anyhow, Context, Result};
use serde_yaml::Value;

use papyrus_core::{Entry, Store};

use crate::output::Output;

/// List all paper keys
pub fn list(store: &Store, output: &Output) -> Result<()> {
    output.print_list(&store.entries());
    Ok(())
}

/// List all authors
pub fn list_authors(store: &Store, output: &Output) -> Result<()> {
    output.print_list(&store.authors());
    Ok(())
}

/// List all titles
pub fn list_titles(store: &Store, output: &Output) -> Result<()> {
    output.print_list(&store.titles());
    Ok(())
}

/// Add a paper, or update the fields given for an existing one
pub fn add(
    store: &mut Store,
    key: String,
    title: Option<String>,
    authors: Vec<String>,
    fields: Vec<(String, Value)>,
    output: &Output,
) -> Result<()> {
    let existed = store.entry(&key).is_some();

    let mut entry = Entry::new();
    if let Some(title) = title {
        entry = entry.with_title(title);
    }
    if !authors.is_empty() {
        entry = entry.with_authors(authors);
    }
    for (name, value) in fields {
        entry = entry.with_field(name, value);
    }

    let committed = store.add(&key, entry).context("Failed to add paper")?;

    let verb = if existed { "Updated" } else { "Added" };
    if committed {
        output.success(&format!("{} {}", verb, key));
    } else {
        output.message(&format!("{} unchanged", key));
    }

    Ok(())
}

/// Show one entry
pub fn show(store: &Store, key: String, output: &Output) -> Result<()> {
    let entry = store
        .entry(&key)
        .ok_or_else(|| anyhow!("Paper not found: {}", key))?;

    output.print_entry(&key, entry);
    Ok(())
}

/// Report papers whose PDF is missing
///
/// Advisory: missing files are reported but the command still succeeds.
pub fn validate(store: &Store, output: &Output) -> Result<()> {
    let missing = store.validate();

    if missing.is_empty() {
        output.success("All papers have a PDF");
        return Ok(());
    }

    if output.is_quiet() {
        output.print_list(&missing);
        return Ok(());
    }

    for key in &missing {
        output.message(&format!(
            "missing: {}",
            store.paper_path(key).display()
        ));
    }
    output.message(&format!("{} paper(s) without a PDF", missing.len()));

    Ok(())
}

/// Parse a `name=value` field
///
/// Booleans and numbers are stored as such; anything else is a string.
/// `title` and `author` have their own flags and are rejected here.
pub fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let name = name.trim();

    if name.is_empty() {
        return Err("field name must not be empty".to_string());
    }
    if name == "title" || name == "author" {
        return Err(format!("use --{} to set '{}'", name, name));
    }

    let value = match serde_yaml::from_str::<Value>(value.trim()) {
        Ok(parsed @ (Value::Bool(_) | Value::Number(_))) => parsed,
        _ => Value::String(value.to_string()),
    };

    Ok((name.to_string(), value))
}
