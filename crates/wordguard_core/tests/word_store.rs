use rusqlite::Connection;
use wordguard_core::db::migrations::latest_version;
use wordguard_core::db::{open_db, open_db_in_memory, DbError};
use wordguard_core::{RepoError, SqliteWordRepository, Word, WordRepository};

fn repo() -> SqliteWordRepository {
    SqliteWordRepository::try_new(open_db_in_memory().unwrap()).unwrap()
}

#[test]
fn insert_assigns_ids_and_lists_by_text() {
    let repo = repo();
    let spam = repo.insert(&Word::new("spam")).unwrap();
    let ham = repo.insert(&Word::new("ham")).unwrap();
    let eggs = repo.insert(&Word::new("Eggs")).unwrap();

    assert!(spam > 0 && ham > 0 && eggs > 0);
    assert_ne!(spam, ham);

    let words = repo.list_all().unwrap();
    let texts: Vec<&str> = words.iter().map(|word| word.text.as_str()).collect();
    assert_eq!(texts, vec!["Eggs", "ham", "spam"]);
    assert!(words.iter().all(|word| !word.matched));
}

#[test]
fn insert_with_existing_id_replaces_row() {
    let repo = repo();
    let id = repo.insert(&Word::new("spam")).unwrap();

    repo.insert(&Word::new("ham").with_id(id).with_matched(true))
        .unwrap();

    let words = repo.list_all().unwrap();
    assert_eq!(words, vec![Word::new("ham").with_id(id).with_matched(true)]);
}

#[test]
fn text_uniqueness_is_not_a_store_constraint() {
    let repo = repo();
    repo.insert(&Word::new("spam")).unwrap();
    repo.insert(&Word::new("spam")).unwrap();
    assert_eq!(repo.list_all().unwrap().len(), 2);
}

#[test]
fn update_changes_matched_flag_and_reports_missing_rows() {
    let repo = repo();
    let id = repo.insert(&Word::new("spam")).unwrap();

    repo.update(&Word::new("spam").with_id(id).with_matched(true))
        .unwrap();
    let matched = repo.list_matched().unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, id);

    let err = repo.update(&Word::new("ghost").with_id(999)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(999)));
}

#[test]
fn blank_words_are_rejected_before_persistence() {
    let repo = repo();
    let err = repo.insert(&Word::new("   ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn delete_removes_given_words_only() {
    let repo = repo();
    let spam = repo.insert(&Word::new("spam")).unwrap();
    repo.insert(&Word::new("ham")).unwrap();
    repo.insert(&Word::new("eggs")).unwrap();

    repo.delete(&[Word::new("spam").with_id(spam), Word::new("eggs")])
        .unwrap();

    let words = repo.list_all().unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].text, "ham");

    repo.delete(&[Word::new("spam").with_id(spam)]).unwrap();
}

#[test]
fn replace_all_keeps_persisted_ids_and_assigns_the_rest() {
    let repo = repo();
    let old = repo.insert(&Word::new("spam")).unwrap();
    repo.insert(&Word::new("ham")).unwrap();

    let replaced = repo
        .replace_all(&[
            Word::new("toast").with_id(old),
            Word::new("beans").with_matched(true),
        ])
        .unwrap();
    assert_eq!(replaced, 2);

    let words = repo.list_all().unwrap();
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].text, "beans");
    assert!(words[0].matched);
    assert!(words[0].id > old);
    assert_eq!(words[1], Word::new("toast").with_id(old));

    repo.delete_all().unwrap();
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn observers_see_whole_committed_snapshots() {
    let repo = repo();
    repo.insert(&Word::new("spam")).unwrap();
    let mut feed = repo.observe_all();
    assert_eq!(feed.borrow_and_update().len(), 1);

    repo.replace_all(&[Word::new("a"), Word::new("b"), Word::new("c")])
        .unwrap();

    assert!(feed.has_changed().unwrap());
    let snapshot = feed.borrow_and_update().clone();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(*snapshot, repo.list_all().unwrap());
    assert_eq!(*repo.snapshot(), *snapshot);
}

#[test]
fn store_survives_reopen_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.db");

    let repo = SqliteWordRepository::try_new(open_db(&path).unwrap()).unwrap();
    repo.insert(&Word::new("spam")).unwrap();
    drop(repo);

    let reopened = SqliteWordRepository::try_new(open_db(&path).unwrap()).unwrap();
    assert_eq!(reopened.snapshot().len(), 1);
    assert_eq!(schema_version(&open_db(&path).unwrap()), latest_version());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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
fn corrupt_matched_value_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO words (text, matched) VALUES ('spam', 7);",
    )
    .unwrap();

    let err = SqliteWordRepository::try_new(conn).err().unwrap();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}
