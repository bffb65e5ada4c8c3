//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide the catalog entry points over a `BookRepository`.
//! - Enforce the existence policy: no insert over an existing id, explicit
//!   not-found on point lookup.
//!
//! # Invariants
//! - Duplicate detection happens here, before delegating, by id only.
//! - Batch checks cover the whole input before the first write.
//! - Repository failures are propagated unchanged inside `ServiceError::Repo`.
//! - The existence check and the following insert are not atomic; two callers
//!   racing on the same id can both pass the check. Inserts never overwrite,
//!   so the primary key rejects the loser with `Repo(Integrity)`.

use crate::model::book::{Book, BookId};
use crate::repo::book_repo::{BookRepository, RepoError};
use log::{debug, info, warn};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from catalog service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Insert target id is already stored; update it or add a new book.
    #[error("book {id} already exists; update it or add a new one")]
    AlreadyExists { id: BookId },
    #[error("book not found: {0}")]
    NotFound(BookId),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Use-case service wrapper for catalog operations.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a book, assigning an id when it has none.
    ///
    /// # Errors
    /// - `AlreadyExists` when `book.id` is set and already stored; nothing is written.
    /// - `Repo(Integrity)` when the store rejects the values (e.g. blank name)
    ///   or another caller stored the same id after the check.
    pub fn add(&self, book: &Book) -> ServiceResult<Book> {
        info!("event=book_add module=service status=start id={:?}", book.id);

        self.ensure_absent(book)?;
        let saved = self.repo.insert(book).inspect_err(|err| {
            warn!("event=book_add module=service status=error error={err}");
        })?;

        info!("event=book_add module=service status=ok id={:?}", saved.id);
        Ok(saved)
    }

    /// Adds every book after checking that none of them already exists.
    ///
    /// # Errors
    /// - `AlreadyExists` for the first stored id found; nothing is written.
    /// - Store errors abort the batch.
    pub fn add_all(&self, books: &[Book]) -> ServiceResult<Vec<Book>> {
        info!(
            "event=book_add_all module=service status=start count={}",
            books.len()
        );

        for book in books {
            self.ensure_absent(book)?;
        }
        let saved = self.repo.insert_all(books)?;

        info!(
            "event=book_add_all module=service status=ok count={}",
            saved.len()
        );
        Ok(saved)
    }

    /// Returns the stored book with this id.
    pub fn get_by_id(&self, id: BookId) -> ServiceResult<Book> {
        debug!("event=book_get module=service status=start id={id}");

        match self.repo.find_by_id(id)? {
            Some(book) => Ok(book),
            None => {
                info!("event=book_get module=service status=not_found id={id}");
                Err(ServiceError::NotFound(id))
            }
        }
    }

    pub fn get_by_name(&self, name: &str) -> ServiceResult<Vec<Book>> {
        let books = self.repo.find_by_name(name)?;
        debug!(
            "event=book_find module=service status=ok field=name count={}",
            books.len()
        );
        Ok(books)
    }

    pub fn get_by_author(&self, author: &str) -> ServiceResult<Vec<Book>> {
        let books = self.repo.find_by_author(author)?;
        debug!(
            "event=book_find module=service status=ok field=author count={}",
            books.len()
        );
        Ok(books)
    }

    pub fn get_by_print_year(&self, print_year: i32) -> ServiceResult<Vec<Book>> {
        let books = self.repo.find_by_print_year(print_year)?;
        debug!(
            "event=book_find module=service status=ok field=print_year value={print_year} count={}",
            books.len()
        );
        Ok(books)
    }

    pub fn get_by_read(&self, is_read: bool) -> ServiceResult<Vec<Book>> {
        let books = self.repo.find_by_read(is_read)?;
        debug!(
            "event=book_find module=service status=ok field=is_read value={is_read} count={}",
            books.len()
        );
        Ok(books)
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Book>> {
        let books = self.repo.find_all()?;
        debug!(
            "event=book_get_all module=service status=ok count={}",
            books.len()
        );
        Ok(books)
    }

    pub fn count(&self) -> ServiceResult<u64> {
        let count = self.repo.count()?;
        debug!("event=book_count module=service status=ok count={count}");
        Ok(count)
    }

    /// Upserts by id. Unlike `add`, an existing id is expected, not rejected.
    pub fn update(&self, book: &Book) -> ServiceResult<Book> {
        info!("event=book_update module=service status=start id={:?}", book.id);
        let saved = self.repo.save(book)?;
        info!("event=book_update module=service status=ok id={:?}", saved.id);
        Ok(saved)
    }

    pub fn update_all(&self, books: &[Book]) -> ServiceResult<Vec<Book>> {
        info!(
            "event=book_update_all module=service status=start count={}",
            books.len()
        );
        let saved = self.repo.save_all(books)?;
        info!(
            "event=book_update_all module=service status=ok count={}",
            saved.len()
        );
        Ok(saved)
    }

    /// Removes the stored book with the same id. Books without id, or with
    /// an id that is not stored, leave the catalog unchanged.
    pub fn remove(&self, book: &Book) -> ServiceResult<()> {
        info!("event=book_remove module=service status=start id={:?}", book.id);
        self.repo.delete(book)?;
        info!("event=book_remove module=service status=ok id={:?}", book.id);
        Ok(())
    }

    /// Removes every listed book that carries a stored id.
    pub fn remove_all_of(&self, books: &[Book]) -> ServiceResult<()> {
        info!(
            "event=book_remove_all module=service status=start count={}",
            books.len()
        );
        self.repo.delete_all_of(books)?;
        info!(
            "event=book_remove_all module=service status=ok count={}",
            books.len()
        );
        Ok(())
    }

    /// Removes every stored book. A no-op on an empty catalog.
    pub fn remove_all(&self) -> ServiceResult<()> {
        info!("event=book_clear module=service status=start");
        self.repo.delete_all()?;
        info!("event=book_clear module=service status=ok");
        Ok(())
    }

    fn ensure_absent(&self, book: &Book) -> ServiceResult<()> {
        let Some(id) = book.id else {
            return Ok(());
        };

        let exists = self.repo.exists_by_id(id)?;
        debug!("event=book_exists module=service id={id} exists={exists}");
        if exists {
            info!("event=book_add module=service status=rejected reason=already_exists id={id}");
            return Err(ServiceError::AlreadyExists { id });
        }
        Ok(())
    }
}
