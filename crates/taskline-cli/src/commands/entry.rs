//! Entry command handlers

use anyhow::{bail, Context, Result};

use taskline_core::models::validate_description;
use taskline_core::{Entry, EntryStatus, EntryStore};

use crate::editor::{confirm, edit_description};
use crate::output::{short_id, Output};

/// List entries, as a board or filtered by status
pub fn list(store: &EntryStore, status: Option<EntryStatus>, output: &Output) -> Result<()> {
    match status {
        Some(status) => output.print_entries(&store.by_status(status)),
        None => output.print_board(&store.entries()),
    }
    Ok(())
}

/// Create a new entry
pub async fn add(store: &EntryStore, description: String, output: &Output) -> Result<()> {
    let description = validate_description(&description)?;

    let entry = store
        .add(description)
        .await
        .context("Failed to create entry")?;

    output.success(&format!("Created entry: {}", entry.id));
    output.print_entry(&entry);

    Ok(())
}

/// Show a single entry, fresh from the backend
pub async fn show(store: &EntryStore, id: String, output: &Output) -> Result<()> {
    let entry = resolve_entry(&store.entries(), &id)?;

    let entry = store
        .fetch(&entry.id)
        .await
        .with_context(|| format!("Failed to fetch entry {}", entry.id))?;

    output.print_entry(&entry);
    Ok(())
}

/// Edit description and/or status
///
/// With neither flag given, the description opens in $EDITOR.
pub async fn edit(
    store: &EntryStore,
    id: String,
    description: Option<String>,
    status: Option<EntryStatus>,
    output: &Output,
) -> Result<()> {
    let entry = resolve_entry(&store.entries(), &id)?;

    let description = match (description, status) {
        (Some(description), _) => description,
        (None, Some(_)) => entry.description.clone(),
        (None, None) => edit_description(&entry.description)?,
    };
    let description = validate_description(&description)?;

    let changed = entry
        .with_description(description)
        .with_status(status.unwrap_or(entry.status));

    if changed == entry {
        output.message("Nothing to change.");
        return Ok(());
    }

    let updated = store
        .update(&changed, true)
        .await
        .context("Failed to update entry")?;

    output.print_entry(&updated);
    Ok(())
}

/// Move an entry to another status
pub async fn set_status(
    store: &EntryStore,
    id: String,
    status: EntryStatus,
    output: &Output,
) -> Result<()> {
    let entry = resolve_entry(&store.entries(), &id)?;

    if entry.status == status {
        output.message(&format!("Entry is already {}.", status));
        return Ok(());
    }

    store
        .update(&entry.with_status(status), true)
        .await
        .context("Failed to update entry status")?;

    Ok(())
}

/// Delete an entry
pub async fn delete(store: &EntryStore, id: String, yes: bool, output: &Output) -> Result<()> {
    let entry = resolve_entry(&store.entries(), &id)?;

    if output.should_prompt() && !yes {
        println!(
            "Delete entry: {} - {}",
            short_id(entry.id.as_str()),
            entry.description
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete(&entry, true)
        .await
        .context("Failed to delete entry")?;

    Ok(())
}

/// Find an entry by full id or unique prefix
fn resolve_entry(entries: &[Entry], id: &str) -> Result<Entry> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Entry ID must not be empty");
    }

    if let Some(entry) = entries.iter().find(|e| e.id.as_str() == id) {
        return Ok(entry.clone());
    }

    let matches: Vec<_> = entries
        .iter()
        .filter(|e| e.id.as_str().starts_with(id))
        .collect();

    match matches.as_slice() {
        [] => bail!("No entry found matching: {}", id),
        [entry] => Ok((*entry).clone()),
        _ => {
            eprintln!("Multiple entries match '{}':", id);
            for entry in &matches {
                eprintln!("  {} - {}", entry.id, entry.description);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
