//! Application state wiring the record service to the SQLite store.
//!
//! The record service is generic over repository traits; `AppState` pins it
//! to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use botbase_core::service::record::RecordService;
use botbase_infra::sqlite::bot::SqliteBotRepository;
use botbase_infra::sqlite::connector::StoreConnector;
use botbase_infra::sqlite::knowledge::SqliteKnowledgeRepository;
use botbase_types::config::StoreConfig;

pub type ConcreteRecordService = RecordService<SqliteBotRepository, SqliteKnowledgeRepository>;

/// Session state for the console.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<ConcreteRecordService>,
    pub store: StoreConnector,
    pub store_path: PathBuf,
}

impl AppState {
    /// Open the store and wire the record service.
    pub async fn init(store_path: PathBuf, config: &StoreConfig) -> anyhow::Result<Self> {
        let store = StoreConnector::open(&store_path, config).await?;

        let records = RecordService::new(
            SqliteBotRepository::new(store.clone()),
            SqliteKnowledgeRepository::new(store.clone()),
        );

        Ok(Self {
            records: Arc::new(records),
            store,
            store_path,
        })
    }

    /// Release the store. The process exits right after.
    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}
