//! Shared domain types for Botbase.
//!
//! This crate contains the domain types used across the workspace:
//! Bot, KnowledgeBaseEntry, their identifiers and request payloads, the
//! error taxonomy, and store configuration.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod bot;
pub mod config;
pub mod error;
pub mod knowledge;
