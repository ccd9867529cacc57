//! Knowledge base repository trait definition.

use botbase_types::bot::BotId;
use botbase_types::error::StoreError;
use botbase_types::knowledge::{CreateEntryRequest, EntryId, KnowledgeBaseEntry};

/// Repository trait for knowledge base entries.
pub trait KnowledgeRepository: Send + Sync {
    /// Insert an entry. A dangling `bot_id` fails with
    /// `StoreError::IntegrityViolation`.
    fn create(
        &self,
        request: &CreateEntryRequest,
    ) -> impl std::future::Future<Output = Result<KnowledgeBaseEntry, StoreError>> + Send;

    fn get_by_id(
        &self,
        id: &EntryId,
    ) -> impl std::future::Future<Output = Result<Option<KnowledgeBaseEntry>, StoreError>> + Send;

    /// List entries ordered by id ascending, optionally scoped to one bot.
    fn list(
        &self,
        bot_id: Option<&BotId>,
    ) -> impl std::future::Future<Output = Result<Vec<KnowledgeBaseEntry>, StoreError>> + Send;

    /// Number of stored entries across all bots.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Overwrite `bot_id`, `content` and `metadata` of an existing entry.
    fn update(
        &self,
        entry: &KnowledgeBaseEntry,
    ) -> impl std::future::Future<Output = Result<KnowledgeBaseEntry, StoreError>> + Send;

    /// Delete an entry. Returns `StoreError::NotFound` if it does not exist.
    fn delete(
        &self,
        id: &EntryId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
