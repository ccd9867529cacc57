//! SQLite storage layer.
//!
//! A `StoreConnector` over split read/write pools, and the repository
//! implementations built on it.

pub mod bot;
pub mod connector;
pub mod knowledge;
pub mod pool;
