//! Business logic services (use cases).
//!
//! Services validate input and orchestrate repository calls. They depend on
//! traits (ports) -- never on concrete infrastructure implementations.

pub mod record;
