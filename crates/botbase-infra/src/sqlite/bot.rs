//! SQLite bot repository implementation.
//!
//! Implements `BotRepository` from `botbase-core` on top of the `StoreConnector`.

use botbase_core::repository::bot::BotRepository;
use botbase_types::bot::{Bot, BotId, CreateBotRequest};
use botbase_types::error::StoreError;
use futures_util::TryStreamExt;

use super::connector::{StoreConnector, StoreRow, StoreValue, WriteStatement};

const LIST_BOTS: &str = "SELECT id, name, description FROM bots ORDER BY id ASC";
const GET_BOT: &str = "SELECT id, name, description FROM bots WHERE id = ?";
const COUNT_BOTS: &str = "SELECT COUNT(*) AS total FROM bots";

/// SQLite-backed implementation of `BotRepository`.
#[derive(Clone)]
pub struct SqliteBotRepository {
    store: StoreConnector,
}

impl SqliteBotRepository {
    /// Create a new repository backed by the given connector.
    pub fn new(store: StoreConnector) -> Self {
        Self { store }
    }
}

impl From<BotId> for StoreValue {
    fn from(id: BotId) -> Self {
        StoreValue::Integer(id.get())
    }
}

fn bot_from_row(row: &StoreRow) -> Result<Bot, StoreError> {
    Ok(Bot {
        id: BotId(row.integer("id")?),
        name: row.text("name")?,
        description: row.optional_text("description")?,
    })
}

impl BotRepository for SqliteBotRepository {
    async fn create(&self, request: &CreateBotRequest) -> Result<Bot, StoreError> {
        let outcome = self
            .store
            .execute_write(
                "INSERT INTO bots (name, description) VALUES (?, ?)",
                vec![
                    request.name.as_str().into(),
                    request.description.clone().into(),
                ],
            )
            .await?;

        Ok(Bot {
            id: BotId(outcome.last_insert_rowid),
            name: request.name.clone(),
            description: request.description.clone(),
        })
    }

    async fn get_by_id(&self, id: &BotId) -> Result<Option<Bot>, StoreError> {
        let mut rows = self.store.execute_read(GET_BOT, vec![(*id).into()]);
        match rows.try_next().await? {
            Some(row) => Ok(Some(bot_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Bot>, StoreError> {
        let mut rows = self.store.execute_read(LIST_BOTS, Vec::new());

        let mut bots = Vec::new();
        while let Some(row) = rows.try_next().await? {
            bots.push(bot_from_row(&row)?);
        }
        Ok(bots)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let mut rows = self.store.execute_read(COUNT_BOTS, Vec::new());
        let total = match rows.try_next().await? {
            Some(row) => row.integer("total")?,
            None => 0,
        };
        Ok(total.max(0) as u64)
    }

    async fn update(&self, bot: &Bot) -> Result<Bot, StoreError> {
        let outcome = self
            .store
            .execute_write(
                "UPDATE bots SET name = ?, description = ? WHERE id = ?",
                vec![
                    bot.name.as_str().into(),
                    bot.description.clone().into(),
                    bot.id.into(),
                ],
            )
            .await?;

        if outcome.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(bot.clone())
    }

    async fn delete_cascade(&self, id: &BotId) -> Result<u64, StoreError> {
        // Entries first so the delete also works on stores whose foreign key
        // was declared without ON DELETE CASCADE.
        let outcomes = self
            .store
            .execute_transaction(vec![
                WriteStatement::new(
                    "DELETE FROM knowledge_base WHERE bot_id = ?",
                    vec![(*id).into()],
                ),
                WriteStatement::new("DELETE FROM bots WHERE id = ?", vec![(*id).into()])
                    .require_rows(),
            ])
            .await?;

        Ok(outcomes.first().map_or(0, |o| o.rows_affected))
    }
}
