//! Core catalog logic for Bookshelf.
//! This crate is the single source of truth for catalog invariants.
//!
//! Wiring is explicit:
//!
//! ```no_run
//! use bookshelf_core::{open_configured, BookService, CatalogConfig, SqlSpy, SqliteBookRepository};
//!
//! let config = CatalogConfig::load()?;
//! let conn = open_configured(&config.database)?;
//! let repo = SqliteBookRepository::new(&conn).with_sql_spy(SqlSpy::from_settings(&config.sql));
//! let service = BookService::new(repo);
//! println!("books={}", service.count()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sqllog;

pub use config::{CatalogConfig, ConfigError, DatabaseSettings, LoggingSettings, SqlLogSettings};
pub use db::{open_configured, open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_from_settings, init_logging, logging_status, LogTarget};
pub use model::book::{Book, BookId};
pub use repo::book_repo::{BookFilter, BookRepository, RepoError, RepoResult, SqliteBookRepository};
pub use service::book_service::{BookService, ServiceError, ServiceResult};
pub use sqllog::{
    pretty_sql, MessageFormattingStrategy, SqlSimpleFormatter, SqlSpy, StatementCategory,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
