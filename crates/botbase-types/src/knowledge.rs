use serde::{Deserialize, Serialize};

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::bot::BotId;

/// Unique identifier for a knowledge base entry, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl EntryId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A knowledge base row owned by a bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseEntry {
    pub id: EntryId,
    /// Owning bot. Must resolve to a live bot when the entry is written.
    pub bot_id: BotId,
    /// Text payload, never empty.
    pub content: String,
    /// Optional structured text such as tags or a source reference.
    pub metadata: Option<String>,
}

/// Request to create a knowledge base entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    pub bot_id: BotId,
    pub content: String,
    pub metadata: Option<String>,
}

impl CreateEntryRequest {
    pub fn new(bot_id: BotId, content: impl Into<String>, metadata: Option<&str>) -> Self {
        Self {
            bot_id,
            content: content.into(),
            metadata: metadata.map(str::to_string),
        }
    }
}

/// Request to update an entry. `None` fields are left unchanged.
///
/// Setting `bot_id` moves the entry to another (existing) bot. A blank
/// `metadata` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEntryRequest {
    pub bot_id: Option<BotId>,
    pub content: Option<String>,
    pub metadata: Option<String>,
}

/// Fields entries can be listed by in the console view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySortKey {
    Id,
    BotId,
    Content,
    Metadata,
}

impl EntrySortKey {
    pub const ALL: [EntrySortKey; 4] = [
        EntrySortKey::Id,
        EntrySortKey::BotId,
        EntrySortKey::Content,
        EntrySortKey::Metadata,
    ];
}

impl fmt::Display for EntrySortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntrySortKey::Id => write!(f, "id"),
            EntrySortKey::BotId => write!(f, "bot_id"),
            EntrySortKey::Content => write!(f, "content"),
            EntrySortKey::Metadata => write!(f, "metadata"),
        }
    }
}

/// Row counts shown in the console header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub bots: u64,
    pub entries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_parse() {
        assert_eq!("7".parse::<EntryId>().unwrap(), EntryId(7));
        assert!("seven".parse::<EntryId>().is_err());
    }

    #[test]
    fn test_create_entry_request_new() {
        let req = CreateEntryRequest::new(BotId(1), "Q: hours? A: 9-5", None);
        assert_eq!(req.bot_id, BotId(1));
        assert_eq!(req.content, "Q: hours? A: 9-5");
        assert!(req.metadata.is_none());
    }

    #[test]
    fn test_update_entry_request_defaults() {
        let req = UpdateEntryRequest::default();
        assert!(req.bot_id.is_none());
        assert!(req.content.is_none());
        assert!(req.metadata.is_none());
    }
}
