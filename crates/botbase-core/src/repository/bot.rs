//! Bot repository trait definition.

use botbase_types::bot::{Bot, BotId, CreateBotRequest};
use botbase_types::error::StoreError;

/// Repository trait for bot persistence.
///
/// Implementations live in botbase-infra (e.g., SqliteBotRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait BotRepository: Send + Sync {
    /// Insert a bot. The store assigns the id. Input is already validated.
    fn create(
        &self,
        request: &CreateBotRequest,
    ) -> impl std::future::Future<Output = Result<Bot, StoreError>> + Send;

    /// Get a bot by id.
    fn get_by_id(
        &self,
        id: &BotId,
    ) -> impl std::future::Future<Output = Result<Option<Bot>, StoreError>> + Send;

    /// List all bots ordered by id ascending.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Bot>, StoreError>> + Send;

    /// Number of stored bots.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Overwrite the mutable fields of an existing bot.
    ///
    /// Returns `StoreError::NotFound` if the bot no longer exists.
    fn update(
        &self,
        bot: &Bot,
    ) -> impl std::future::Future<Output = Result<Bot, StoreError>> + Send;

    /// Delete a bot together with all of its knowledge base entries in one
    /// transaction. Returns the number of entries removed.
    ///
    /// Returns `StoreError::NotFound` (and changes nothing) if the bot does
    /// not exist.
    fn delete_cascade(
        &self,
        id: &BotId,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;
}
