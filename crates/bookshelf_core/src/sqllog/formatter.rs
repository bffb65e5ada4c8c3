//! SQL log line formatting.
//!
//! # Responsibility
//! - Turn one intercepted statement into a single display string.
//!
//! # Invariants
//! - Empty SQL always yields an empty string, whatever the other inputs.
//! - Formatting is pure; no state survives between calls.

use super::pretty::pretty_sql;
use log::trace;

const LOG_PREFIX: &str = "P6Spy - Hibernate:";
const BATCH_CATEGORY: &str = "batch";
const BATCH_MARKER: &str = " add to batch ";

/// Formatting entry point handed to statement interceptors.
pub trait MessageFormattingStrategy {
    /// Builds the display string for one statement event.
    ///
    /// `now` is the interceptor's timestamp text and `prepared` the statement
    /// as prepared (with placeholders); both are accepted for interface
    /// compatibility and may be ignored by an implementation.
    fn format_message(
        &self,
        connection_id: u32,
        now: &str,
        elapsed_ms: u128,
        category: &str,
        prepared: &str,
        sql: &str,
    ) -> String;
}

/// Default strategy: prefix, optional batch marker, pretty SQL, elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlSimpleFormatter {
    pretty: bool,
}

impl SqlSimpleFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Keeps statements on one line instead of re-flowing them.
    pub fn raw() -> Self {
        Self { pretty: false }
    }
}

impl Default for SqlSimpleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFormattingStrategy for SqlSimpleFormatter {
    fn format_message(
        &self,
        _connection_id: u32,
        _now: &str,
        elapsed_ms: u128,
        category: &str,
        _prepared: &str,
        sql: &str,
    ) -> String {
        if sql.is_empty() {
            trace!("event=sql_format module=sqllog status=skipped reason=empty_sql");
            return String::new();
        }

        let marker = if category == BATCH_CATEGORY {
            BATCH_MARKER
        } else {
            ""
        };
        let body = if self.pretty {
            pretty_sql(sql)
        } else {
            sql.to_string()
        };

        format!("{LOG_PREFIX} {marker} {body} {{elapsed: {elapsed_ms}ms}}")
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageFormattingStrategy, SqlSimpleFormatter};

    #[test]
    fn empty_sql_yields_empty_line_for_any_category() {
        let formatter = SqlSimpleFormatter::new();
        assert_eq!(formatter.format_message(0, "", 0, "", "", ""), "");
        assert_eq!(formatter.format_message(3, "now", 99, "batch", "", ""), "");
    }

    #[test]
    fn raw_mode_keeps_statement_on_one_line() {
        let line = SqlSimpleFormatter::raw().format_message(
            1,
            "",
            12,
            "statement",
            "",
            "DELETE FROM books",
        );
        assert_eq!(line, "P6Spy - Hibernate:  DELETE FROM books {elapsed: 12ms}");
    }

    #[test]
    fn batch_marker_only_for_batch_category() {
        let formatter = SqlSimpleFormatter::raw();
        let batch = formatter.format_message(1, "", 1, "batch", "", "DELETE FROM books");
        let statement = formatter.format_message(1, "", 1, "statement", "", "DELETE FROM books");
        assert!(batch.contains(" add to batch "));
        assert!(!statement.contains("add to batch"));
    }
}
