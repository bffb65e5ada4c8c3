use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{Book, BookFilter, BookRepository, RepoError, SqlSpy, SqliteBookRepository};
use rusqlite::params;

fn first_book() -> Book {
    Book::new("test firstBook", "test firstAuthor", 2000)
}

fn second_book() -> Book {
    Book::new("test secondBook", "test secondAuthor", 2010).read(true)
}

#[test]
fn save_assigns_id_and_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    let saved = repo.save(&first_book()).unwrap();
    let id = saved.id.expect("store should assign an id");

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.name, "test firstBook");
    assert!(!loaded.is_read);
}

#[test]
fn save_with_existing_id_overwrites_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    let mut saved = repo.save(&first_book()).unwrap();
    saved.name = "renamed".to_string();
    saved.is_read = true;
    repo.save(&saved).unwrap();

    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(repo.find_by_id(saved.id.unwrap()).unwrap().unwrap(), saved);
}

#[test]
fn save_with_unknown_explicit_id_inserts_with_that_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    let saved = repo.save(&first_book().with_id(42)).unwrap();
    assert_eq!(saved.id, Some(42));
    assert!(repo.exists_by_id(42).unwrap());

    let next = repo.save(&second_book()).unwrap();
    assert!(next.id.unwrap() > 42);
}

#[test]
fn insert_never_overwrites_a_stored_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    let stored = repo.insert(&first_book().with_id(3)).unwrap();
    let err = repo.insert(&second_book().with_id(3)).unwrap_err();
    assert!(matches!(err, RepoError::Integrity(_)));
    assert_eq!(repo.find_by_id(3).unwrap(), Some(stored.clone()));

    let err = repo
        .insert_all(&[second_book(), first_book().with_id(3)])
        .unwrap_err();
    assert!(matches!(err, RepoError::Integrity(_)));
    assert_eq!(repo.find_all().unwrap(), vec![stored]);

    let generated = repo.insert(&second_book()).unwrap();
    assert!(generated.id.unwrap() > 3);
}

#[test]
fn blank_required_fields_are_integrity_violations() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    let err = repo.save(&Book::new("", "someone", 1990)).unwrap_err();
    assert!(matches!(err, RepoError::Integrity(ref message) if message.contains("books_name_not_blank")));

    let err = repo.save(&Book::new("title", "   ", 1990)).unwrap_err();
    assert!(matches!(err, RepoError::Integrity(ref message) if message.contains("books_author_not_blank")));

    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn save_all_is_atomic_on_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    let err = repo
        .save_all(&[first_book(), Book::new("", "nobody", 1)])
        .unwrap_err();
    assert!(matches!(err, RepoError::Integrity(_)));
    assert_eq!(repo.count().unwrap(), 0);

    let saved = repo.save_all(&[first_book(), second_book()]).unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|book| book.id.is_some()));
}

#[test]
fn field_lookups_match_exactly_and_may_be_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);
    let saved = repo.save_all(&[first_book(), second_book()]).unwrap();

    assert_eq!(repo.find_by_name("test firstBook").unwrap(), vec![saved[0].clone()]);
    assert_eq!(repo.find_by_author("test secondAuthor").unwrap(), vec![saved[1].clone()]);
    assert_eq!(repo.find_by_print_year(2010).unwrap(), vec![saved[1].clone()]);
    assert_eq!(repo.find_by_read(false).unwrap(), vec![saved[0].clone()]);

    assert!(repo.find_by_name("test").unwrap().is_empty());
    assert!(repo.find_by(&BookFilter::PrintYear(1800)).unwrap().is_empty());
}

#[test]
fn find_all_is_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    repo.save(&second_book().with_id(9)).unwrap();
    repo.save(&first_book().with_id(3)).unwrap();

    let ids: Vec<_> = repo.find_all().unwrap().into_iter().map(|book| book.id).collect();
    assert_eq!(ids, vec![Some(3), Some(9)]);
}

#[test]
fn delete_variants() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);
    let saved = repo.save_all(&[first_book(), second_book()]).unwrap();

    repo.delete(&first_book()).unwrap();
    assert_eq!(repo.count().unwrap(), 2, "transient book delete is a no-op");

    repo.delete(&saved[0]).unwrap();
    repo.delete(&saved[0]).unwrap();
    assert_eq!(repo.find_all().unwrap(), vec![saved[1].clone()]);

    let missing = repo.delete_by_id(saved[0].id.unwrap()).unwrap_err();
    assert!(matches!(missing, RepoError::NotFound(id) if Some(id) == saved[0].id));

    repo.delete_all_of(&saved).unwrap();
    assert_eq!(repo.count().unwrap(), 0);

    repo.delete_all().unwrap();
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn corrupted_read_flag_is_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);
    conn.execute(
        "INSERT INTO books (id, name, author, print_year, is_read) VALUES (?1, ?2, ?3, ?4, ?5);",
        params![1, "n", "a", 2000, 7],
    )
    .unwrap();

    let err = repo.find_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("is_read")));
}

#[test]
fn spying_repository_behaves_like_plain_one() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn).with_sql_spy(SqlSpy::new());

    let saved = repo.save_all(&[first_book(), second_book()]).unwrap();
    assert_eq!(repo.find_all().unwrap(), saved);
}
