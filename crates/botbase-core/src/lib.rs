//! Record service and repository trait definitions for Botbase.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the `RecordService` that validates input before
//! touching them. It depends only on `botbase-types` -- never on
//! `botbase-infra` or any database crate.

pub mod repository;
pub mod service;
