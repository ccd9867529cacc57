//! Interactive console loop: table menu, then action menu, then the form.

use anyhow::Result;
use console::style;
use dialoguer::Select;

use botbase_types::error::RecordError;

use crate::cli::render;
use crate::cli::{Action, TableChoice, bot, knowledge};
use crate::state::AppState;

/// Run the console until the operator picks "Quit".
///
/// Record errors are shown and the loop continues. Terminal failures end it.
pub async fn run(state: &AppState) -> Result<()> {
    print_banner(state).await;

    loop {
        let table = Select::new()
            .with_prompt("Table")
            .items(&TableChoice::ALL)
            .default(0)
            .interact()?;
        let table = TableChoice::ALL[table];
        if table == TableChoice::Quit {
            break;
        }

        let action = Select::new()
            .with_prompt(format!("{table}: action"))
            .items(&Action::ALL)
            .default(0)
            .interact()?;
        let action = Action::ALL[action];

        let outcome = match (table, action) {
            (_, Action::Back) | (TableChoice::Quit, _) => continue,
            (TableChoice::Bots, Action::View) => bot::view_bots(state).await,
            (TableChoice::Bots, Action::Add) => bot::add_bot(state).await,
            (TableChoice::Bots, Action::Update) => bot::update_bot(state).await,
            (TableChoice::Bots, Action::Delete) => bot::delete_bot(state).await,
            (TableChoice::KnowledgeBase, Action::View) => knowledge::view_entries(state).await,
            (TableChoice::KnowledgeBase, Action::Add) => knowledge::add_entry(state).await,
            (TableChoice::KnowledgeBase, Action::Update) => knowledge::update_entry(state).await,
            (TableChoice::KnowledgeBase, Action::Delete) => knowledge::delete_entry(state).await,
        };

        if let Err(err) = outcome {
            match err.downcast_ref::<RecordError>() {
                Some(record_err) => {
                    tracing::debug!(error = %record_err, "record action failed");
                    render::print_record_error(record_err);
                }
                None => return Err(err),
            }
        }
    }

    Ok(())
}

async fn print_banner(state: &AppState) {
    println!();
    println!(
        "  {} Botbase v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "  {}  {}",
        style("Store:").bold(),
        style(state.store_path.display()).dim()
    );
    match state.records.summary().await {
        Ok(summary) => println!(
            "  {}  {} bots, {} knowledge base entries",
            style("Rows:").bold(),
            style(summary.bots).bold(),
            style(summary.entries).bold()
        ),
        Err(err) => render::print_record_error(&err),
    }
    println!();
}
