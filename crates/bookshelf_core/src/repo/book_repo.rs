//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the CRUD and field-lookup gateway over the `books` table.
//! - Keep SQL details inside the persistence boundary.
//! - Route every statement through the connection's `SqlSpy`.
//!
//! # Invariants
//! - `save` is an upsert keyed by id; books without id get a generated one.
//! - `insert` never overwrites: an id that is already stored fails on the
//!   primary key with `RepoError::Integrity`.
//! - Multi-row writes run inside one SQLite transaction.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Lookups are ordered by id ascending.

use crate::db::DbError;
use crate::model::book::{Book, BookId};
use crate::sqllog::{SqlSpy, StatementCategory};
use rusqlite::types::Value;
use rusqlite::{params, Connection, ErrorCode, Row};
use thiserror::Error;

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    name,
    author,
    print_year,
    is_read
FROM books";

const BOOK_INSERT_SQL: &str = "INSERT INTO books (name, author, print_year, is_read)
VALUES (?1, ?2, ?3, ?4);";

const BOOK_INSERT_WITH_ID_SQL: &str = "INSERT INTO books (id, name, author, print_year, is_read)
VALUES (?1, ?2, ?3, ?4, ?5);";

const BOOK_UPSERT_SQL: &str = "INSERT INTO books (id, name, author, print_year, is_read)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (id) DO UPDATE SET
    name = excluded.name,
    author = excluded.author,
    print_year = excluded.print_year,
    is_read = excluded.is_read;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for book persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    /// A store constraint rejected the write; the message names the constraint.
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error("book not found: {0}")]
    NotFound(BookId),
    #[error("invalid persisted book data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Self::Integrity(message.unwrap_or_else(|| err.to_string()))
            }
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

/// Field-equality filters supported by `find_by`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    Name(String),
    Author(String),
    PrintYear(i32),
    Read(bool),
}

impl BookFilter {
    fn column(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Author(_) => "author",
            Self::PrintYear(_) => "print_year",
            Self::Read(_) => "is_read",
        }
    }

    fn bind_value(&self) -> Value {
        match self {
            Self::Name(value) | Self::Author(value) => Value::Text(value.clone()),
            Self::PrintYear(value) => Value::Integer(i64::from(*value)),
            Self::Read(value) => Value::Integer(bool_to_int(*value)),
        }
    }
}

/// Persistence gateway for books.
pub trait BookRepository {
    /// Inserts a transient book or overwrites the row with the same id.
    fn save(&self, book: &Book) -> RepoResult<Book>;
    /// `save` for every entry, as one unit.
    fn save_all(&self, books: &[Book]) -> RepoResult<Vec<Book>>;
    /// Inserts without overwriting; a stored id fails with `Integrity`.
    fn insert(&self, book: &Book) -> RepoResult<Book>;
    /// `insert` for every entry, as one unit.
    fn insert_all(&self, books: &[Book]) -> RepoResult<Vec<Book>>;
    fn exists_by_id(&self, id: BookId) -> RepoResult<bool>;
    fn find_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn find_all(&self) -> RepoResult<Vec<Book>>;
    fn find_by(&self, filter: &BookFilter) -> RepoResult<Vec<Book>>;
    fn count(&self) -> RepoResult<u64>;
    /// Deletes the row with the book's id; missing rows and transient books are a no-op.
    fn delete(&self, book: &Book) -> RepoResult<()>;
    fn delete_all_of(&self, books: &[Book]) -> RepoResult<()>;
    fn delete_all(&self) -> RepoResult<()>;
    /// Fails with `NotFound` when no row has this id.
    fn delete_by_id(&self, id: BookId) -> RepoResult<()>;

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Book>> {
        self.find_by(&BookFilter::Name(name.to_string()))
    }

    fn find_by_author(&self, author: &str) -> RepoResult<Vec<Book>> {
        self.find_by(&BookFilter::Author(author.to_string()))
    }

    fn find_by_print_year(&self, print_year: i32) -> RepoResult<Vec<Book>> {
        self.find_by(&BookFilter::PrintYear(print_year))
    }

    fn find_by_read(&self, is_read: bool) -> RepoResult<Vec<Book>> {
        self.find_by(&BookFilter::Read(is_read))
    }
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
    spy: SqlSpy,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            spy: SqlSpy::disabled(),
        }
    }

    /// Replaces the statement interceptor.
    pub fn with_sql_spy(mut self, spy: SqlSpy) -> Self {
        self.spy = spy;
        self
    }

    fn write_one(
        &self,
        book: &Book,
        mode: WriteMode,
        category: StatementCategory,
    ) -> RepoResult<Book> {
        let id = match book.id {
            Some(id) => {
                let sql = match mode {
                    WriteMode::Upsert => BOOK_UPSERT_SQL,
                    WriteMode::InsertOnly => BOOK_INSERT_WITH_ID_SQL,
                };
                self.spy.run(category, sql, || {
                    self.conn.execute(
                        sql,
                        params![
                            id,
                            book.name.as_str(),
                            book.author.as_str(),
                            book.print_year,
                            bool_to_int(book.is_read),
                        ],
                    )
                })?;
                id
            }
            None => {
                self.spy.run(category, BOOK_INSERT_SQL, || {
                    self.conn.execute(
                        BOOK_INSERT_SQL,
                        params![
                            book.name.as_str(),
                            book.author.as_str(),
                            book.print_year,
                            bool_to_int(book.is_read),
                        ],
                    )
                })?;
                self.conn.last_insert_rowid()
            }
        };

        Ok(Book {
            id: Some(id),
            ..book.clone()
        })
    }

    fn write_all(&self, books: &[Book], mode: WriteMode) -> RepoResult<Vec<Book>> {
        let tx = self.conn.unchecked_transaction()?;
        let written = books
            .iter()
            .map(|book| self.write_one(book, mode, StatementCategory::Batch))
            .collect::<RepoResult<Vec<_>>>()?;
        tx.commit()?;
        Ok(written)
    }

    fn delete_one(&self, id: BookId, category: StatementCategory) -> RepoResult<usize> {
        const SQL: &str = "DELETE FROM books WHERE id = ?1;";
        let changed = self
            .spy
            .run(category, SQL, || self.conn.execute(SQL, [id]))?;
        Ok(changed)
    }

    fn query_books(&self, sql: &str, bind: &[Value]) -> RepoResult<Vec<Book>> {
        let rows = self.spy.run(StatementCategory::Statement, sql, || {
            let mut stmt = self.conn.prepare(sql)?;
            let mut rows = stmt.query(rusqlite::params_from_iter(bind.iter()))?;
            let mut raw = Vec::new();
            while let Some(row) = rows.next()? {
                raw.push(read_raw_row(row)?);
            }
            Ok(raw)
        })?;

        rows.into_iter().map(RawBookRow::into_book).collect()
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn save(&self, book: &Book) -> RepoResult<Book> {
        self.write_one(book, WriteMode::Upsert, StatementCategory::Statement)
    }

    fn save_all(&self, books: &[Book]) -> RepoResult<Vec<Book>> {
        self.write_all(books, WriteMode::Upsert)
    }

    fn insert(&self, book: &Book) -> RepoResult<Book> {
        self.write_one(book, WriteMode::InsertOnly, StatementCategory::Statement)
    }

    fn insert_all(&self, books: &[Book]) -> RepoResult<Vec<Book>> {
        self.write_all(books, WriteMode::InsertOnly)
    }

    fn exists_by_id(&self, id: BookId) -> RepoResult<bool> {
        const SQL: &str = "SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1);";
        let exists: i64 = self.spy.run(StatementCategory::Statement, SQL, || {
            self.conn.query_row(SQL, [id], |row| row.get(0))
        })?;
        Ok(exists == 1)
    }

    fn find_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        let sql = format!("{BOOK_SELECT_SQL} WHERE id = ?1;");
        let mut books = self.query_books(&sql, &[Value::Integer(id)])?;
        Ok(books.pop())
    }

    fn find_all(&self) -> RepoResult<Vec<Book>> {
        let sql = format!("{BOOK_SELECT_SQL} ORDER BY id ASC;");
        self.query_books(&sql, &[])
    }

    fn find_by(&self, filter: &BookFilter) -> RepoResult<Vec<Book>> {
        let sql = format!(
            "{BOOK_SELECT_SQL} WHERE {} = ?1 ORDER BY id ASC;",
            filter.column()
        );
        self.query_books(&sql, &[filter.bind_value()])
    }

    fn count(&self) -> RepoResult<u64> {
        const SQL: &str = "SELECT COUNT(*) FROM books;";
        let count: i64 = self.spy.run(StatementCategory::Statement, SQL, || {
            self.conn.query_row(SQL, [], |row| row.get(0))
        })?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn delete(&self, book: &Book) -> RepoResult<()> {
        if let Some(id) = book.id {
            self.delete_one(id, StatementCategory::Statement)?;
        }
        Ok(())
    }

    fn delete_all_of(&self, books: &[Book]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for id in books.iter().filter_map(|book| book.id) {
            self.delete_one(id, StatementCategory::Batch)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<()> {
        const SQL: &str = "DELETE FROM books;";
        self.spy
            .run(StatementCategory::Statement, SQL, || self.conn.execute(SQL, []))?;
        Ok(())
    }

    fn delete_by_id(&self, id: BookId) -> RepoResult<()> {
        if self.delete_one(id, StatementCategory::Statement)? == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

/// How a write treats an id that is already stored.
#[derive(Debug, Clone, Copy)]
enum WriteMode {
    Upsert,
    InsertOnly,
}

/// Column values as stored, before domain validation.
struct RawBookRow {
    id: BookId,
    name: String,
    author: String,
    print_year: i32,
    is_read: i64,
}

impl RawBookRow {
    fn into_book(self) -> RepoResult<Book> {
        let is_read = match self.is_read {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid is_read value `{other}` in books.is_read for id {}",
                    self.id
                )));
            }
        };

        Ok(Book {
            id: Some(self.id),
            name: self.name,
            author: self.author,
            print_year: self.print_year,
            is_read,
        })
    }
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawBookRow> {
    Ok(RawBookRow {
        id: row.get("id")?,
        name: row.get("name")?,
        author: row.get("author")?,
        print_year: row.get("print_year")?,
        is_read: row.get("is_read")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
