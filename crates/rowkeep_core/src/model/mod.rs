//! Row models for the bundled tables.
//!
//! # Responsibility
//! - Define typed rows, insert payloads, and their schemas.
//! - Describe each table's identity column for the CRUD facade.
//!
//! # Invariants
//! - Insert payloads never carry an identity; the store assigns it.
//! - Row timestamps are epoch milliseconds in `created_at`.

pub mod debate_round;
pub mod task;
