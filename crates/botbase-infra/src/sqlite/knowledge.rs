//! SQLite knowledge base repository implementation.

use botbase_core::repository::knowledge::KnowledgeRepository;
use botbase_types::bot::BotId;
use botbase_types::error::StoreError;
use botbase_types::knowledge::{CreateEntryRequest, EntryId, KnowledgeBaseEntry};
use futures_util::TryStreamExt;

use super::connector::{StoreConnector, StoreRow, StoreValue};

const LIST_ENTRIES: &str =
    "SELECT id, bot_id, content, metadata FROM knowledge_base ORDER BY id ASC";
const LIST_ENTRIES_FOR_BOT: &str =
    "SELECT id, bot_id, content, metadata FROM knowledge_base WHERE bot_id = ? ORDER BY id ASC";
const GET_ENTRY: &str = "SELECT id, bot_id, content, metadata FROM knowledge_base WHERE id = ?";
const COUNT_ENTRIES: &str = "SELECT COUNT(*) AS total FROM knowledge_base";

/// SQLite-backed implementation of `KnowledgeRepository`.
#[derive(Clone)]
pub struct SqliteKnowledgeRepository {
    store: StoreConnector,
}

impl SqliteKnowledgeRepository {
    pub fn new(store: StoreConnector) -> Self {
        Self { store }
    }

    async fn collect(
        &self,
        query: &str,
        params: Vec<StoreValue>,
    ) -> Result<Vec<KnowledgeBaseEntry>, StoreError> {
        let mut rows = self.store.execute_read(query, params);

        let mut entries = Vec::new();
        while let Some(row) = rows.try_next().await? {
            entries.push(entry_from_row(&row)?);
        }
        Ok(entries)
    }
}

impl From<EntryId> for StoreValue {
    fn from(id: EntryId) -> Self {
        StoreValue::Integer(id.get())
    }
}

fn entry_from_row(row: &StoreRow) -> Result<KnowledgeBaseEntry, StoreError> {
    Ok(KnowledgeBaseEntry {
        id: EntryId(row.integer("id")?),
        bot_id: BotId(row.integer("bot_id")?),
        content: row.text("content")?,
        metadata: row.optional_text("metadata")?,
    })
}

impl KnowledgeRepository for SqliteKnowledgeRepository {
    async fn create(&self, request: &CreateEntryRequest) -> Result<KnowledgeBaseEntry, StoreError> {
        let outcome = self
            .store
            .execute_write(
                "INSERT INTO knowledge_base (bot_id, content, metadata) VALUES (?, ?, ?)",
                vec![
                    request.bot_id.into(),
                    request.content.as_str().into(),
                    request.metadata.clone().into(),
                ],
            )
            .await?;

        Ok(KnowledgeBaseEntry {
            id: EntryId(outcome.last_insert_rowid),
            bot_id: request.bot_id,
            content: request.content.clone(),
            metadata: request.metadata.clone(),
        })
    }

    async fn get_by_id(&self, id: &EntryId) -> Result<Option<KnowledgeBaseEntry>, StoreError> {
        Ok(self
            .collect(GET_ENTRY, vec![(*id).into()])
            .await?
            .into_iter()
            .next())
    }

    async fn list(&self, bot_id: Option<&BotId>) -> Result<Vec<KnowledgeBaseEntry>, StoreError> {
        match bot_id {
            Some(bot_id) => self.collect(LIST_ENTRIES_FOR_BOT, vec![(*bot_id).into()]).await,
            None => self.collect(LIST_ENTRIES, Vec::new()).await,
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let mut rows = self.store.execute_read(COUNT_ENTRIES, Vec::new());
        let total = match rows.try_next().await? {
            Some(row) => row.integer("total")?,
            None => 0,
        };
        Ok(total.max(0) as u64)
    }

    async fn update(&self, entry: &KnowledgeBaseEntry) -> Result<KnowledgeBaseEntry, StoreError> {
        let outcome = self
            .store
            .execute_write(
                "UPDATE knowledge_base SET bot_id = ?, content = ?, metadata = ? WHERE id = ?",
                vec![
                    entry.bot_id.into(),
                    entry.content.as_str().into(),
                    entry.metadata.clone().into(),
                    entry.id.into(),
                ],
            )
            .await?;

        if outcome.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(entry.clone())
    }

    async fn delete(&self, id: &EntryId) -> Result<(), StoreError> {
        let outcome = self
            .store
            .execute_write("DELETE FROM knowledge_base WHERE id = ?", vec![(*id).into()])
            .await?;

        if outcome.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::bot::SqliteBotRepository;
    use botbase_core::repository::bot::BotRepository;
    use botbase_types::bot::CreateBotRequest;
    use botbase_types::config::StoreConfig;

    async fn test_repos() -> (tempfile::TempDir, SqliteBotRepository, SqliteKnowledgeRepository) {
        let dir = tempfile::tempdir().unwrap();
        let store = StoreConnector::open(&dir.path().join("test.db"), &StoreConfig::default())
            .await
            .unwrap();
        (
            dir,
            SqliteBotRepository::new(store.clone()),
            SqliteKnowledgeRepository::new(store),
        )
    }

    #[tokio::test]
    async fn test_create_and_list_scoped() {
        let (_dir, bots, entries) = test_repos().await;
        let a = bots.create(&CreateBotRequest::new("A", None)).await.unwrap();
        let b = bots.create(&CreateBotRequest::new("B", None)).await.unwrap();

        let first = entries
            .create(&CreateEntryRequest::new(a.id, "alpha", Some("tag:faq")))
            .await
            .unwrap();
        entries
            .create(&CreateEntryRequest::new(b.id, "beta", None))
            .await
            .unwrap();
        let third = entries
            .create(&CreateEntryRequest::new(a.id, "gamma", None))
            .await
            .unwrap();

        assert_eq!(entries.list(None).await.unwrap().len(), 3);
        assert_eq!(entries.count().await.unwrap(), 3);
        assert_eq!(entries.list(Some(&a.id)).await.unwrap(), vec![first, third]);
        assert!(entries.list(Some(&BotId(77))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_dangling_bot_is_integrity_violation() {
        let (_dir, _bots, entries) = test_repos().await;

        let err = entries
            .create(&CreateEntryRequest::new(BotId(5), "orphan", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IntegrityViolation(_)));
        assert_eq!(entries.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_get() {
        let (_dir, bots, entries) = test_repos().await;
        let bot = bots.create(&CreateBotRequest::new("A", None)).await.unwrap();
        let mut entry = entries
            .create(&CreateEntryRequest::new(bot.id, "v1", None))
            .await
            .unwrap();

        entry.content = "v2".to_string();
        entry.metadata = Some("source: handbook".to_string());
        entries.update(&entry).await.unwrap();

        assert_eq!(entries.get_by_id(&entry.id).await.unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn test_delete_and_delete_again() {
        let (_dir, bots, entries) = test_repos().await;
        let bot = bots.create(&CreateBotRequest::new("A", None)).await.unwrap();
        let entry = entries
            .create(&CreateEntryRequest::new(bot.id, "text", None))
            .await
            .unwrap();

        entries.delete(&entry.id).await.unwrap();
        let err = entries.delete(&entry.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
