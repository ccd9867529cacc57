//! Knowledge base actions: view, add, update, delete.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use botbase_types::knowledge::{
    CreateEntryRequest, EntrySortKey, KnowledgeBaseEntry, UpdateEntryRequest,
};

use crate::cli::bot::pick_bot;
use crate::cli::render::{self, SortOrder};
use crate::state::AppState;

/// Show entries for all bots or one bot, with picked columns and sort order.
pub async fn view_entries(state: &AppState) -> Result<()> {
    let bots = state.records.list_bots().await?;

    let mut scopes = vec!["All bots".to_string()];
    scopes.extend(bots.iter().map(render::bot_label));
    let scope = Select::new()
        .with_prompt("Show entries for")
        .items(&scopes)
        .default(0)
        .interact()?;
    let bot_id = scope.checked_sub(1).and_then(|i| bots.get(i)).map(|b| b.id);

    let mut entries = state.records.list_entries(bot_id).await?;
    if entries.is_empty() {
        render::print_info("No knowledge base entries to show.");
        return Ok(());
    }

    let picked = MultiSelect::new()
        .with_prompt("Columns to show")
        .items(&EntrySortKey::ALL)
        .defaults(&[true; EntrySortKey::ALL.len()])
        .interact()?;
    let (columns, id_dropped) =
        render::visible_columns(&EntrySortKey::ALL, &picked, EntrySortKey::Id);
    if id_dropped {
        render::print_info("The id column cannot be removed.");
    }

    let key = Select::new()
        .with_prompt("Sort by")
        .items(&EntrySortKey::ALL)
        .default(0)
        .interact()?;
    let order = Select::new()
        .with_prompt("Order")
        .items(&SortOrder::ALL)
        .default(0)
        .interact()?;

    render::sort_entries(&mut entries, EntrySortKey::ALL[key], SortOrder::ALL[order]);
    render::print_table(
        &render::entries_table(&entries, &columns),
        entries.len(),
        "entry",
    );
    Ok(())
}

pub async fn add_entry(state: &AppState) -> Result<()> {
    let Some(bot) = pick_bot(state, "Owning bot").await? else {
        return Ok(());
    };

    let content: String = Input::new()
        .with_prompt("Content")
        .allow_empty(true)
        .interact_text()?;
    let metadata: String = Input::new()
        .with_prompt("Metadata (optional)")
        .allow_empty(true)
        .interact_text()?;

    let entry = state
        .records
        .add_entry(CreateEntryRequest {
            bot_id: bot.id,
            content,
            metadata: Some(metadata),
        })
        .await?;

    render::print_success(&format!(
        "Entry {} added to bot {}.",
        style(entry.id).bold(),
        style(&bot.name).cyan()
    ));
    Ok(())
}

pub async fn update_entry(state: &AppState) -> Result<()> {
    let Some(entry) = pick_entry(state, "Entry to update").await? else {
        return Ok(());
    };

    let bots = state.records.list_bots().await?;
    let labels: Vec<String> = bots.iter().map(render::bot_label).collect();
    let current = bots.iter().position(|b| b.id == entry.bot_id).unwrap_or(0);
    let owner = Select::new()
        .with_prompt("Owning bot")
        .items(&labels)
        .default(current)
        .interact()?;

    let content: String = Input::new()
        .with_prompt("Content")
        .with_initial_text(entry.content.clone())
        .allow_empty(true)
        .interact_text()?;
    let metadata: String = Input::new()
        .with_prompt("Metadata (blank to clear)")
        .with_initial_text(entry.metadata.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let updated = state
        .records
        .update_entry(
            entry.id,
            UpdateEntryRequest {
                bot_id: bots.get(owner).map(|b| b.id),
                content: Some(content),
                metadata: Some(metadata),
            },
        )
        .await?;

    render::print_success(&format!("Entry #{} updated.", updated.id));
    Ok(())
}

pub async fn delete_entry(state: &AppState) -> Result<()> {
    let Some(entry) = pick_entry(state, "Entry to delete").await? else {
        return Ok(());
    };

    let confirmed = Confirm::new()
        .with_prompt(format!("Permanently delete entry #{}?", entry.id))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("  Cancelled.");
        return Ok(());
    }

    state.records.delete_entry(entry.id).await?;
    render::print_success(&format!("Entry #{} deleted.", entry.id));
    Ok(())
}

async fn pick_entry(state: &AppState, prompt: &str) -> Result<Option<KnowledgeBaseEntry>> {
    let entries = state.records.list_entries(None).await?;
    if entries.is_empty() {
        render::print_info("No knowledge base entries yet.");
        return Ok(None);
    }

    let labels: Vec<String> = entries.iter().map(render::entry_label).collect();
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(entries.into_iter().nth(selection))
}
