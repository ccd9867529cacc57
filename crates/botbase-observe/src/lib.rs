//! Logging setup for Botbase binaries.

pub mod tracing_setup;
