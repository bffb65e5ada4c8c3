use bookshelf_core::db::migrations::latest_version;
use bookshelf_core::db::{open_configured, open_db, open_db_in_memory, DbError};
use bookshelf_core::{Book, BookService, DatabaseSettings, SqliteBookRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "books");
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookshelf.db");

    let conn_first = open_db(&path).unwrap();
    let added = BookService::new(SqliteBookRepository::new(&conn_first))
        .add(&Book::new("test firstBook", "test firstAuthor", 2000))
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let service = BookService::new(SqliteBookRepository::new(&conn_second));
    assert_eq!(service.get_all().unwrap(), vec![added]);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn open_configured_uses_file_path_or_memory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");

    let file_settings = DatabaseSettings {
        path: Some(path.to_str().unwrap().to_string()),
        busy_timeout_ms: 250,
    };
    let conn = open_configured(&file_settings).unwrap();
    assert_table_exists(&conn, "books");
    drop(conn);
    assert!(path.exists());

    let conn = open_configured(&DatabaseSettings::default()).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
