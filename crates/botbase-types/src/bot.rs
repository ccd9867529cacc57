use serde::{Deserialize, Serialize};

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for a bot, assigned by the store on insert.
///
/// Identifiers are never reused within the lifetime of a store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotId(pub i64);

impl BotId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BotId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A bot row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bot {
    pub id: BotId,
    /// Display name, never empty.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
}

/// Request to create a new bot. Only `name` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBotRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateBotRequest {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
        }
    }
}

/// Request to update an existing bot. `None` fields are left unchanged.
///
/// A blank `description` clears the stored description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBotRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Fields a bot can be listed by in the console view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotSortKey {
    Id,
    Name,
    Description,
}

impl BotSortKey {
    pub const ALL: [BotSortKey; 3] = [BotSortKey::Id, BotSortKey::Name, BotSortKey::Description];
}

impl fmt::Display for BotSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotSortKey::Id => write!(f, "id"),
            BotSortKey::Name => write!(f, "name"),
            BotSortKey::Description => write!(f, "description"),
        }
    }
}

/// Collapse blank optional text to `None`.
///
/// Form input arrives as raw strings; an empty or whitespace-only value means
/// "no value" and is stored as NULL. Non-blank values are kept verbatim.
///
/// # Examples
///
/// ```
/// use botbase_types::bot::blank_to_none;
///
/// assert_eq!(blank_to_none(Some("  ".to_string())), None);
/// assert_eq!(blank_to_none(Some("FAQ bot".to_string())), Some("FAQ bot".to_string()));
/// assert_eq!(blank_to_none(None), None);
/// ```
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
