//! Book domain model.
//!
//! # Responsibility
//! - Define the catalog entity persisted in the `books` table.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on first insert.
//! - `name` and `author` must not be blank when persisted; the store enforces
//!   this with named `CHECK` constraints.
//! - Equality is structural over every field.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a persisted book.
pub type BookId = i64;

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Absent for transient books.
    pub id: Option<BookId>,
    pub name: String,
    pub author: String,
    /// Not range-checked by this layer.
    pub print_year: i32,
    pub is_read: bool,
}

impl Book {
    /// Creates a transient (not yet persisted) unread book.
    pub fn new(name: impl Into<String>, author: impl Into<String>, print_year: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            author: author.into(),
            print_year,
            is_read: false,
        }
    }

    /// Returns a copy carrying the given identifier.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(mut self, id: BookId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns a copy with the read flag set.
    pub fn read(mut self, is_read: bool) -> Self {
        self.is_read = is_read;
        self
    }

    /// Returns whether the store has assigned an identity yet.
    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }
}
