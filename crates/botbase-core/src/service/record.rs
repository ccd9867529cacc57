//! Record lifecycle service.
//!
//! The single surface the console calls: list, add, update and delete for
//! bots and knowledge base entries. Field rules are checked before any
//! repository call, so a rejected request never touches the store. Store
//! failures are passed through unchanged and never retried here.

use botbase_types::bot::{Bot, BotId, CreateBotRequest, UpdateBotRequest, blank_to_none};
use botbase_types::error::{RecordError, RecordKind, StoreError};
use botbase_types::knowledge::{
    CreateEntryRequest, EntryId, KnowledgeBaseEntry, StoreSummary, UpdateEntryRequest,
};

use crate::repository::bot::BotRepository;
use crate::repository::knowledge::KnowledgeRepository;

/// Service orchestrating the bot and knowledge base record lifecycle.
///
/// Generic over repository traits to maintain clean architecture --
/// botbase-core never depends on botbase-infra.
pub struct RecordService<B: BotRepository, K: KnowledgeRepository> {
    bot_repo: B,
    knowledge_repo: K,
}

impl<B: BotRepository, K: KnowledgeRepository> RecordService<B, K> {
    pub fn new(bot_repo: B, knowledge_repo: K) -> Self {
        Self {
            bot_repo,
            knowledge_repo,
        }
    }

    /// List all bots ordered by id.
    pub async fn list_bots(&self) -> Result<Vec<Bot>, RecordError> {
        Ok(self.bot_repo.list().await?)
    }

    /// Get a single bot.
    pub async fn get_bot(&self, id: BotId) -> Result<Bot, RecordError> {
        self.bot_repo
            .get_by_id(&id)
            .await?
            .ok_or(RecordError::not_found(RecordKind::Bot, id.get()))
    }

    /// Create a bot. The name is trimmed and must not be empty; a blank
    /// description is stored as NULL.
    #[tracing::instrument(name = "add_bot", skip(self, request))]
    pub async fn add_bot(&self, request: CreateBotRequest) -> Result<Bot, RecordError> {
        let request = CreateBotRequest {
            name: validate_name(&request.name)?,
            description: blank_to_none(request.description),
        };

        let bot = self.bot_repo.create(&request).await?;
        tracing::info!(bot_id = %bot.id, name = %bot.name, "bot added");
        Ok(bot)
    }

    /// Update a bot's name and/or description.
    #[tracing::instrument(name = "update_bot", skip(self, request), fields(bot_id = %id))]
    pub async fn update_bot(
        &self,
        id: BotId,
        request: UpdateBotRequest,
    ) -> Result<Bot, RecordError> {
        let name = request.name.as_deref().map(validate_name).transpose()?;

        let mut bot = self.get_bot(id).await?;
        if let Some(name) = name {
            bot.name = name;
        }
        if let Some(description) = request.description {
            bot.description = blank_to_none(Some(description));
        }

        let bot = self
            .bot_repo
            .update(&bot)
            .await
            .map_err(missing(RecordKind::Bot, id.get()))?;
        tracing::info!("bot updated");
        Ok(bot)
    }

    /// Delete a bot and, in the same transaction, every entry it owns.
    #[tracing::instrument(name = "delete_bot", skip(self), fields(bot_id = %id))]
    pub async fn delete_bot(&self, id: BotId) -> Result<(), RecordError> {
        let entries_removed = self
            .bot_repo
            .delete_cascade(&id)
            .await
            .map_err(missing(RecordKind::Bot, id.get()))?;
        tracing::info!(entries_removed, "bot deleted");
        Ok(())
    }

    /// List entries ordered by id, optionally only those owned by `bot_id`.
    ///
    /// An unknown `bot_id` yields an empty list rather than an error.
    pub async fn list_entries(
        &self,
        bot_id: Option<BotId>,
    ) -> Result<Vec<KnowledgeBaseEntry>, RecordError> {
        Ok(self.knowledge_repo.list(bot_id.as_ref()).await?)
    }

    /// Get a single entry.
    pub async fn get_entry(&self, id: EntryId) -> Result<KnowledgeBaseEntry, RecordError> {
        self.knowledge_repo
            .get_by_id(&id)
            .await?
            .ok_or(RecordError::not_found(RecordKind::KnowledgeBaseEntry, id.get()))
    }

    /// Create an entry for an existing bot.
    ///
    /// A bot that disappears between the existence check and the insert is
    /// caught by the store's foreign key and reported as an integrity
    /// violation.
    #[tracing::instrument(name = "add_entry", skip(self, request), fields(bot_id = %request.bot_id))]
    pub async fn add_entry(
        &self,
        request: CreateEntryRequest,
    ) -> Result<KnowledgeBaseEntry, RecordError> {
        validate_content(&request.content)?;
        let request = CreateEntryRequest {
            metadata: blank_to_none(request.metadata),
            ..request
        };

        self.get_bot(request.bot_id).await?;

        let entry = self.knowledge_repo.create(&request).await?;
        tracing::info!(entry_id = %entry.id, "knowledge base entry added");
        Ok(entry)
    }

    /// Update an entry's content, metadata, or owning bot.
    #[tracing::instrument(name = "update_entry", skip(self, request), fields(entry_id = %id))]
    pub async fn update_entry(
        &self,
        id: EntryId,
        request: UpdateEntryRequest,
    ) -> Result<KnowledgeBaseEntry, RecordError> {
        if let Some(content) = &request.content {
            validate_content(content)?;
        }

        let mut entry = self.get_entry(id).await?;
        if let Some(bot_id) = request.bot_id {
            self.get_bot(bot_id).await?;
            entry.bot_id = bot_id;
        }
        if let Some(content) = request.content {
            entry.content = content;
        }
        if let Some(metadata) = request.metadata {
            entry.metadata = blank_to_none(Some(metadata));
        }

        let entry = self
            .knowledge_repo
            .update(&entry)
            .await
            .map_err(missing(RecordKind::KnowledgeBaseEntry, id.get()))?;
        tracing::info!("knowledge base entry updated");
        Ok(entry)
    }

    /// Delete a single entry.
    #[tracing::instrument(name = "delete_entry", skip(self), fields(entry_id = %id))]
    pub async fn delete_entry(&self, id: EntryId) -> Result<(), RecordError> {
        self.knowledge_repo
            .delete(&id)
            .await
            .map_err(missing(RecordKind::KnowledgeBaseEntry, id.get()))?;
        tracing::info!("knowledge base entry deleted");
        Ok(())
    }

    /// Row counts for both tables.
    pub async fn summary(&self) -> Result<StoreSummary, RecordError> {
        Ok(StoreSummary {
            bots: self.bot_repo.count().await?,
            entries: self.knowledge_repo.count().await?,
        })
    }
}

/// Map a repository `NotFound` to a record-level `NotFound` carrying the id.
fn missing(kind: RecordKind, id: i64) -> impl FnOnce(StoreError) -> RecordError {
    move |e| match e {
        StoreError::NotFound => RecordError::not_found(kind, id),
        other => other.into(),
    }
}

fn validate_name(name: &str) -> Result<String, RecordError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecordError::validation("name", "name cannot be empty"));
    }
    Ok(name.to_string())
}

fn validate_content(content: &str) -> Result<(), RecordError> {
    if content.trim().is_empty() {
        return Err(RecordError::validation("content", "content cannot be empty"));
    }
    Ok(())
}
