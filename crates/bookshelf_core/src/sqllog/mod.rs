//! SQL statement logging: formatter, pretty printer and interceptor.
//!
//! # Responsibility
//! - Format intercepted statements into readable log lines.
//! - Keep formatting out of the persistence control path; the repository
//!   only hands statements to `SqlSpy`.

pub mod formatter;
pub mod pretty;
pub mod spy;

pub use formatter::{MessageFormattingStrategy, SqlSimpleFormatter};
pub use pretty::pretty_sql;
pub use spy::{SqlSpy, StatementCategory, SQL_LOG_TARGET};
