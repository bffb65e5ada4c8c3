//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `bookshelf_core` linkage and configured wiring end to end.
//! - Keep output deterministic for quick local sanity checks.

use bookshelf_core::{
    init_from_settings, open_configured, BookService, CatalogConfig, SqlSpy, SqliteBookRepository,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("bookshelf_core ping={}", bookshelf_core::ping());
    println!("bookshelf_core version={}", bookshelf_core::core_version());

    match report_catalog() {
        Ok(count) => {
            println!("bookshelf_core books={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("bookshelf_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn report_catalog() -> Result<u64, Box<dyn Error>> {
    let config = CatalogConfig::load()?;
    init_from_settings(&config.logging)?;
    info!("event=cli_start module=cli status=ok");

    let conn = open_configured(&config.database)?;
    let repo = SqliteBookRepository::new(&conn).with_sql_spy(SqlSpy::from_settings(&config.sql));
    let service = BookService::new(repo);
    Ok(service.count()?)
}
