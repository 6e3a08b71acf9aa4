//! Table bindings over the generic CRUD facade.
//!
//! # Responsibility
//! - Bind each bundled table to its schemas and identity column.
//! - Expose use-case named entry points for callers.
//!
//! # Invariants
//! - Services never query the store directly, so every read passes
//!   select-schema validation and TTL filtering.

pub mod debate_service;
pub mod task_service;
