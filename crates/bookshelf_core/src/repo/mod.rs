//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the book persistence gateway contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store constraint violations surface as `RepoError::Integrity`, never as
//!   opaque transport errors.

pub mod book_repo;
