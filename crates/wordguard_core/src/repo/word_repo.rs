//! Word repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete/replace APIs over the `words` table.
//! - Publish the ordered collection to observers after every commit.
//!
//! # Invariants
//! - All mutations on one repository are serialized by its connection lock.
//! - Each mutation runs in one transaction; the published snapshot is read
//!   inside that transaction, so no partial state is observable.
//! - Snapshots are ordered by `text` ascending (binary collation).

use crate::db::DbError;
use crate::model::word::{Word, WordId, WordValidationError};
use log::{debug, error};
use rusqlite::{params, Connection, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

const WORD_SELECT_SQL: &str = "SELECT id, text, matched FROM words";

pub type RepoResult<T> = Result<T, RepoError>;

/// Immutable, ordered view of the whole collection at one commit.
pub type WordSnapshot = Arc<Vec<Word>>;

/// Live, restartable view of the collection. Always holds the latest snapshot.
pub type WordFeed = watch::Receiver<WordSnapshot>;

/// Store error for word persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(WordValidationError),
    Db(DbError),
    NotFound(WordId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "word not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted word data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<WordValidationError> for RepoError {
    fn from(value: WordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistent store contract for the word list.
pub trait WordRepository: Send + Sync {
    /// Inserts one word. A persisted id replaces the row with that id;
    /// an unassigned id gets a fresh store id.
    fn insert(&self, word: &Word) -> RepoResult<WordId>;
    /// Updates `text`/`matched` of the row with `word.id`.
    fn update(&self, word: &Word) -> RepoResult<()>;
    /// Deletes the given words. Missing rows are not an error.
    fn delete(&self, words: &[Word]) -> RepoResult<()>;
    fn delete_all(&self) -> RepoResult<()>;
    /// Wipes the collection and inserts `words`, atomically. Persisted ids
    /// are kept; unassigned words get fresh ids above them.
    fn replace_all(&self, words: &[Word]) -> RepoResult<usize>;
    fn list_all(&self) -> RepoResult<Vec<Word>>;
    fn list_matched(&self) -> RepoResult<Vec<Word>>;
    /// Subscribes to the live collection.
    fn observe_all(&self) -> WordFeed;
}

/// SQLite-backed word repository.
pub struct SqliteWordRepository {
    conn: Mutex<Connection>,
    feed: watch::Sender<WordSnapshot>,
}

impl SqliteWordRepository {
    /// Wraps a migrated connection and seeds the feed with its content.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let initial = query_words(&conn, WORD_SELECT_SQL)?;
        let (feed, _) = watch::channel(Arc::new(initial));
        Ok(Self {
            conn: Mutex::new(conn),
            feed,
        })
    }

    /// Returns the latest published snapshot without subscribing.
    pub fn snapshot(&self) -> WordSnapshot {
        self.feed.borrow().clone()
    }

    fn mutate<T>(
        &self,
        operation: &'static str,
        op: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        match run_in_transaction(&mut conn, op) {
            Ok((value, snapshot)) => {
                debug!(
                    "event=word_store_mutation module=repo status=ok operation={operation} count={}",
                    snapshot.len()
                );
                // Published while the lock is held so feed order follows commit order.
                self.feed.send_replace(Arc::new(snapshot));
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event=word_store_mutation module=repo status=error operation={operation} error={err}"
                );
                Err(err)
            }
        }
    }

    fn read<T>(&self, op: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        op(&conn)
    }
}

impl WordRepository for SqliteWordRepository {
    fn insert(&self, word: &Word) -> RepoResult<WordId> {
        word.validate()?;

        self.mutate("insert", |tx| {
            if word.is_persisted() {
                tx.execute(
                    "INSERT OR REPLACE INTO words (id, text, matched) VALUES (?1, ?2, ?3);",
                    params![word.id, word.text.as_str(), bool_to_int(word.matched)],
                )?;
                Ok(word.id)
            } else {
                tx.execute(
                    "INSERT INTO words (text, matched) VALUES (?1, ?2);",
                    params![word.text.as_str(), bool_to_int(word.matched)],
                )?;
                Ok(tx.last_insert_rowid())
            }
        })
    }

    fn update(&self, word: &Word) -> RepoResult<()> {
        word.validate()?;

        self.mutate("update", |tx| {
            let changed = tx.execute(
                "UPDATE words SET text = ?1, matched = ?2 WHERE id = ?3;",
                params![word.text.as_str(), bool_to_int(word.matched), word.id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(word.id));
            }
            Ok(())
        })
    }

    fn delete(&self, words: &[Word]) -> RepoResult<()> {
        self.mutate("delete", |tx| {
            for word in words {
                if word.is_persisted() {
                    tx.execute("DELETE FROM words WHERE id = ?1;", [word.id])?;
                } else {
                    tx.execute("DELETE FROM words WHERE text = ?1;", [word.text.as_str()])?;
                }
            }
            Ok(())
        })
    }

    fn delete_all(&self) -> RepoResult<()> {
        self.mutate("delete_all", |tx| {
            tx.execute("DELETE FROM words;", [])?;
            Ok(())
        })
    }

    fn replace_all(&self, words: &[Word]) -> RepoResult<usize> {
        for word in words {
            word.validate()?;
        }

        self.mutate("replace_all", |tx| {
            tx.execute("DELETE FROM words;", [])?;
            let (kept, fresh): (Vec<&Word>, Vec<&Word>) =
                words.iter().partition(|word| word.is_persisted());

            let mut with_id =
                tx.prepare("INSERT INTO words (id, text, matched) VALUES (?1, ?2, ?3);")?;
            for word in kept {
                with_id.execute(params![word.id, word.text.as_str(), bool_to_int(word.matched)])?;
            }
            let mut without_id = tx.prepare("INSERT INTO words (text, matched) VALUES (?1, ?2);")?;
            for word in fresh {
                without_id.execute(params![word.text.as_str(), bool_to_int(word.matched)])?;
            }
            Ok(words.len())
        })
    }

    fn list_all(&self) -> RepoResult<Vec<Word>> {
        self.read(|conn| query_words(conn, WORD_SELECT_SQL))
    }

    fn list_matched(&self) -> RepoResult<Vec<Word>> {
        self.read(|conn| query_words(conn, &format!("{WORD_SELECT_SQL} WHERE matched = 1")))
    }

    fn observe_all(&self) -> WordFeed {
        self.feed.subscribe()
    }
}

fn run_in_transaction<T>(
    conn: &mut Connection,
    op: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<(T, Vec<Word>)> {
    let tx = conn.transaction()?;
    let value = op(&tx)?;
    let snapshot = query_words(&tx, WORD_SELECT_SQL)?;
    tx.commit()?;
    Ok((value, snapshot))
}

fn query_words(conn: &Connection, select_sql: &str) -> RepoResult<Vec<Word>> {
    let mut stmt = conn.prepare(&format!("{select_sql} ORDER BY text ASC, id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut words = Vec::new();

    while let Some(row) = rows.next()? {
        words.push(parse_word_row(row)?);
    }

    Ok(words)
}

fn parse_word_row(row: &Row<'_>) -> RepoResult<Word> {
    let matched = match row.get::<_, i64>("matched")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid matched value `{other}` in words.matched"
            )));
        }
    };

    let word = Word {
        id: row.get("id")?,
        text: row.get("text")?,
        matched,
    };
    word.validate()?;
    Ok(word)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{SqliteWordRepository, WordRepository};
    use crate::db::open_db_in_memory;
    use crate::model::word::Word;

    fn repo() -> SqliteWordRepository {
        SqliteWordRepository::try_new(open_db_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn feed_publishes_after_each_commit() {
        let repo = repo();
        let mut feed = repo.observe_all();
        assert!(feed.borrow_and_update().is_empty());

        repo.insert(&Word::new("spam")).unwrap();
        assert!(feed.has_changed().unwrap());
        let snapshot = feed.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].text, "spam");
    }

    #[test]
    fn failed_mutation_does_not_publish() {
        let repo = repo();
        let mut feed = repo.observe_all();
        feed.borrow_and_update();

        assert!(repo.update(&Word::new("ghost").with_id(99)).is_err());
        assert!(!feed.has_changed().unwrap());
    }

    #[test]
    fn replace_all_rejects_blank_words_before_touching_rows() {
        let repo = repo();
        repo.insert(&Word::new("keep")).unwrap();

        assert!(repo
            .replace_all(&[Word::new("ok"), Word::new("   ")])
            .is_err());
        let words = repo.list_all().unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "keep");
    }
}
