//! Catalog domain model.
//!
//! # Responsibility
//! - Define the canonical records used by catalog business logic.
//!
//! # Invariants
//! - A stored book is identified by a store-assigned `BookId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod book;
