//! Infrastructure layer for Botbase.
//!
//! Contains the SQLite store connector, the implementations of the
//! repository traits defined in `botbase-core`, and startup configuration
//! (store location and `botbase.toml`).

pub mod config;
pub mod sqlite;
