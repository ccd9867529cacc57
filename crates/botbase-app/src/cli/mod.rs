//! Command-line flags and console menus for the `botbase` binary.
//!
//! The binary takes startup flags only. Everything else happens in the
//! interactive shell: pick a table, pick an action, fill in a form.

pub mod bot;
pub mod knowledge;
pub mod render;
pub mod shell;

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use botbase_observe::tracing_setup::LogFormat;

/// Manage bots and their knowledge base entries.
#[derive(Parser)]
#[command(name = "botbase", version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite store file. Created on first use.
    #[arg(long, env = "BOTBASE_DB_PATH", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Detailed logs (-v for debug, -vv for trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log line format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Table picked in the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableChoice {
    Bots,
    KnowledgeBase,
    Quit,
}

impl TableChoice {
    pub const ALL: [TableChoice; 3] = [
        TableChoice::Bots,
        TableChoice::KnowledgeBase,
        TableChoice::Quit,
    ];
}

impl fmt::Display for TableChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableChoice::Bots => write!(f, "Bots"),
            TableChoice::KnowledgeBase => write!(f, "Knowledge base"),
            TableChoice::Quit => write!(f, "Quit"),
        }
    }
}

/// Action picked for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Add,
    Update,
    Delete,
    Back,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::View,
        Action::Add,
        Action::Update,
        Action::Delete,
        Action::Back,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::View => write!(f, "View records"),
            Action::Add => write!(f, "Add record"),
            Action::Update => write!(f, "Update record"),
            Action::Delete => write!(f, "Delete record"),
            Action::Back => write!(f, "< Back"),
        }
    }
}
