//! Statement interceptor for the repository layer.
//!
//! # Responsibility
//! - Time each statement the repository executes.
//! - Render it through a `MessageFormattingStrategy` and emit it under the
//!   `bookshelf::sql` log target.
//!
//! # Invariants
//! - A disabled spy never formats; the wrapped operation always runs exactly once.
//! - Empty rendered lines are never emitted.

use super::formatter::{MessageFormattingStrategy, SqlSimpleFormatter};
use crate::config::SqlLogSettings;
use log::debug;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Log target used for intercepted statements.
pub const SQL_LOG_TARGET: &str = "bookshelf::sql";

static NEXT_CONNECTION_ID: AtomicU32 = AtomicU32::new(0);

/// Kind of intercepted work, rendered as the formatter's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementCategory {
    /// Standalone statement.
    Statement,
    /// Statement executed as part of a multi-row write.
    Batch,
}

impl StatementCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Statement => "statement",
            Self::Batch => "batch",
        }
    }
}

pub struct SqlSpy {
    connection_id: u32,
    /// `None` when statements pass through unlogged.
    formatter: Option<Box<dyn MessageFormattingStrategy + Send + Sync>>,
}

impl SqlSpy {
    /// Spy that logs every statement with the default pretty formatter.
    pub fn new() -> Self {
        Self::with_formatter(SqlSimpleFormatter::new())
    }

    /// Spy that passes statements through without logging.
    pub fn disabled() -> Self {
        Self {
            connection_id: 0,
            formatter: None,
        }
    }

    pub fn with_formatter(formatter: impl MessageFormattingStrategy + Send + Sync + 'static) -> Self {
        Self {
            connection_id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            formatter: Some(Box::new(formatter)),
        }
    }

    /// Builds a spy from the `[sql]` configuration section.
    pub fn from_settings(settings: &SqlLogSettings) -> Self {
        if !settings.show {
            return Self::disabled();
        }
        if settings.format {
            Self::new()
        } else {
            Self::with_formatter(SqlSimpleFormatter::raw())
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.formatter.is_some()
    }

    /// Runs `op`, then logs `sql` with the elapsed time when enabled.
    pub fn run<T, F>(&self, category: StatementCategory, sql: &str, op: F) -> rusqlite::Result<T>
    where
        F: FnOnce() -> rusqlite::Result<T>,
    {
        if !self.is_enabled() {
            return op();
        }

        let started_at = Instant::now();
        let result = op();
        let line = self.render(category, sql, started_at.elapsed().as_millis());
        if !line.is_empty() {
            debug!(target: SQL_LOG_TARGET, "{line}");
        }
        result
    }

    /// Renders one statement event without emitting it. Empty when disabled.
    pub fn render(&self, category: StatementCategory, sql: &str, elapsed_ms: u128) -> String {
        let Some(formatter) = &self.formatter else {
            return String::new();
        };
        formatter.format_message(
            self.connection_id,
            &now_epoch_ms().to_string(),
            elapsed_ms,
            category.as_str(),
            sql,
            sql.trim(),
        )
    }
}

impl Default for SqlSpy {
    fn default() -> Self {
        Self::disabled()
    }
}

fn now_epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{SqlSpy, StatementCategory};
    use crate::config::SqlLogSettings;
    use std::cell::Cell;

    #[test]
    fn disabled_spy_still_runs_operation_once() {
        let calls = Cell::new(0);
        let spy = SqlSpy::disabled();
        let value = spy
            .run(StatementCategory::Statement, "SELECT 1", || {
                calls.set(calls.get() + 1);
                Ok(7)
            })
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn enabled_spy_propagates_operation_errors() {
        let spy = SqlSpy::new();
        let result: rusqlite::Result<()> = spy.run(StatementCategory::Batch, "SELECT 1", || {
            Err(rusqlite::Error::QueryReturnedNoRows)
        });
        assert!(matches!(result, Err(rusqlite::Error::QueryReturnedNoRows)));
    }

    #[test]
    fn settings_select_spy_mode() {
        let hidden = SqlSpy::from_settings(&SqlLogSettings::default());
        assert!(!hidden.is_enabled());

        let raw = SqlSpy::from_settings(&SqlLogSettings {
            show: true,
            format: false,
        });
        assert!(raw.is_enabled());
        assert_eq!(
            raw.render(StatementCategory::Batch, "DELETE FROM books", 4),
            "P6Spy - Hibernate:  add to batch  DELETE FROM books {elapsed: 4ms}"
        );
    }

    #[test]
    fn disabled_spy_takes_no_connection_id_and_renders_nothing() {
        let before = SqlSpy::new().connection_id;
        let disabled = SqlSpy::disabled();
        let after = SqlSpy::new().connection_id;

        assert_eq!(disabled.connection_id, 0);
        assert!(disabled.formatter.is_none());
        assert!(after > before);
        assert_eq!(disabled.render(StatementCategory::Statement, "SELECT 1", 2), "");
    }

    #[test]
    fn render_of_blank_statement_is_empty() {
        let spy = SqlSpy::new();
        assert_eq!(spy.render(StatementCategory::Statement, "  \n ", 3), "");
    }
}
