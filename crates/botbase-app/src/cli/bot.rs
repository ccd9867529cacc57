//! Bot actions: view, add, update, delete.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use botbase_types::bot::{Bot, BotSortKey, CreateBotRequest, UpdateBotRequest};

use crate::cli::render::{self, SortOrder};
use crate::state::AppState;

/// Show all bots with the columns and sort order the operator picks.
pub async fn view_bots(state: &AppState) -> Result<()> {
    let mut bots = state.records.list_bots().await?;

    if bots.is_empty() {
        render::print_info("No bots yet. Pick \"Add record\" to create one.");
        return Ok(());
    }

    let picked = MultiSelect::new()
        .with_prompt("Columns to show")
        .items(&BotSortKey::ALL)
        .defaults(&[true; BotSortKey::ALL.len()])
        .interact()?;
    let (columns, id_dropped) =
        render::visible_columns(&BotSortKey::ALL, &picked, BotSortKey::Id);
    if id_dropped {
        render::print_info("The id column cannot be removed.");
    }

    let key = Select::new()
        .with_prompt("Sort by")
        .items(&BotSortKey::ALL)
        .default(0)
        .interact()?;
    let order = Select::new()
        .with_prompt("Order")
        .items(&SortOrder::ALL)
        .default(0)
        .interact()?;

    render::sort_bots(&mut bots, BotSortKey::ALL[key], SortOrder::ALL[order]);
    render::print_table(&render::bots_table(&bots, &columns), bots.len(), "bot");
    Ok(())
}

pub async fn add_bot(state: &AppState) -> Result<()> {
    let name: String = Input::new()
        .with_prompt("Bot name")
        .allow_empty(true)
        .interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description (optional)")
        .allow_empty(true)
        .interact_text()?;

    let bot = state
        .records
        .add_bot(CreateBotRequest {
            name,
            description: Some(description),
        })
        .await?;

    render::print_success(&format!(
        "Bot {} added with id {}.",
        style(&bot.name).cyan(),
        style(bot.id).bold()
    ));
    Ok(())
}

pub async fn update_bot(state: &AppState) -> Result<()> {
    let Some(bot) = pick_bot(state, "Bot to update").await? else {
        return Ok(());
    };

    let name: String = Input::new()
        .with_prompt("Bot name")
        .with_initial_text(bot.name.clone())
        .allow_empty(true)
        .interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description (blank to clear)")
        .with_initial_text(bot.description.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let updated = state
        .records
        .update_bot(
            bot.id,
            UpdateBotRequest {
                name: Some(name),
                description: Some(description),
            },
        )
        .await?;

    render::print_success(&format!("Bot #{} updated.", updated.id));
    Ok(())
}

/// Delete a bot after confirmation. Its entries go with it.
pub async fn delete_bot(state: &AppState) -> Result<()> {
    let Some(bot) = pick_bot(state, "Bot to delete").await? else {
        return Ok(());
    };

    let owned = state.records.list_entries(Some(bot.id)).await?.len();
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Permanently delete bot '{}' and its {} knowledge base entr{}?",
            style(&bot.name).red().bold(),
            owned,
            if owned == 1 { "y" } else { "ies" }
        ))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("  Cancelled.");
        return Ok(());
    }

    state.records.delete_bot(bot.id).await?;
    render::print_success(&format!("Bot '{}' deleted.", bot.name));
    Ok(())
}

/// Let the operator pick one bot. `None` when there are no bots.
pub(crate) async fn pick_bot(state: &AppState, prompt: &str) -> Result<Option<Bot>> {
    let bots = state.records.list_bots().await?;
    if bots.is_empty() {
        render::print_info("No bots yet. Pick \"Add record\" to create one.");
        return Ok(None);
    }

    let labels: Vec<String> = bots.iter().map(render::bot_label).collect();
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(bots.into_iter().nth(selection))
}
