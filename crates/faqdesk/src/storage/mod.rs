//! Storage layer for faqdesk.
//!
//! This module provides `SQLite`-based persistent storage for FAQs and their
//! answers. Every mutating operation runs inside a single transaction; a
//! transaction that is not committed is rolled back when it is dropped, so
//! early returns and `?` never leave partial writes behind.

pub mod migrations;
pub mod schema;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Answer, Faq, FaqDraft, FaqId};

/// Storage engine for FAQs.
///
/// Holds one connection for the whole process. Access is serialized through a
/// mutex; callers never hold it across an `.await`.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Brings the schema up to date.
    ///
    /// The database stays in rollback-journal mode so that the main file holds
    /// every committed write; the backup stage copies only that file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        let storage = Self::from_connection(path, conn)?;
        info!("Database opened at {}", storage.path.display());
        Ok(storage)
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        Self::from_connection(PathBuf::from(":memory:"), conn)
    }

    fn from_connection(path: PathBuf, mut conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::initialize_schema(&mut conn)?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("storage connection lock poisoned"))
    }

    /// Insert a FAQ and all of its answers atomically.
    ///
    /// Returns the identifier generated for the new FAQ.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is written in that case.
    pub fn create_faq(&self, draft: &FaqDraft) -> Result<FaqId> {
        let id = FaqId::new();
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO faqs (id, question, tr_question) VALUES (?1, ?2, ?3)",
            params![id.to_string(), draft.question, draft.tr_question],
        )?;
        insert_answers(&tx, &id, &draft.answers)?;

        tx.commit()?;
        debug!("Created FAQ {} with {} answers", id, draft.answers.len());
        Ok(id)
    }

    /// Update a FAQ's questions and replace its answers in one transaction.
    ///
    /// Returns `false` if no FAQ has this identifier; nothing is written then.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; the transaction is rolled back.
    pub fn update_faq(&self, id: &FaqId, draft: &FaqDraft) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE faqs SET question = ?2, tr_question = ?3 WHERE id = ?1",
            params![id.to_string(), draft.question, draft.tr_question],
        )?;
        if updated == 0 {
            return Ok(false);
        }
        replace_answers_in(&tx, id, &draft.answers)?;

        tx.commit()?;
        debug!("Updated FAQ {} with {} answers", id, draft.answers.len());
        Ok(true)
    }

    /// Replace the full answer set of a FAQ.
    ///
    /// Returns `false` if no FAQ has this identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; the previous answers are kept.
    pub fn replace_answers(&self, id: &FaqId, answers: &[Answer]) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if !faq_exists(&tx, id)? {
            return Ok(false);
        }
        replace_answers_in(&tx, id, answers)?;

        tx.commit()?;
        Ok(true)
    }

    /// Delete a FAQ by identifier. Its answers are removed by cascade.
    ///
    /// Returns the number of FAQ rows deleted (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_faq(&self, id: &FaqId) -> Result<usize> {
        let conn = self.lock()?;
        let affected = conn.execute("DELETE FROM faqs WHERE id = ?1", [id.to_string()])?;
        debug!("Deleted {} FAQ rows for {}", affected, id);
        Ok(affected)
    }

    /// Get a FAQ with its answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_faq(&self, id: &FaqId) -> Result<Option<Faq>> {
        let conn = self.lock()?;

        let faq = conn
            .query_row(
                "SELECT id, question, tr_question FROM faqs WHERE id = ?1",
                [id.to_string()],
                row_to_faq,
            )
            .optional()?;

        let Some(mut faq) = faq else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            r"
            SELECT title, tr_title, answer, tr_answer
            FROM answers WHERE faq_id = ?1 ORDER BY id
            ",
        )?;
        faq.answers = stmt
            .query_map([id.to_string()], |row| row_to_answer(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Some(faq))
    }

    /// List every FAQ with its answers, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_faqs(&self) -> Result<Vec<Faq>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT id, question, tr_question FROM faqs ORDER BY rowid")?;
        let mut faqs = stmt
            .query_map([], row_to_faq)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let positions: HashMap<FaqId, usize> = faqs
            .iter()
            .enumerate()
            .map(|(pos, faq)| (faq.id, pos))
            .collect();

        let mut stmt = conn.prepare(
            r"
            SELECT faq_id, title, tr_title, answer, tr_answer
            FROM answers ORDER BY id
            ",
        )?;
        let rows = stmt.query_map([], |row| Ok((faq_id_at(row, 0)?, row_to_answer(row, 1)?)))?;

        for row in rows {
            let (faq_id, answer) = row?;
            if let Some(&pos) = positions.get(&faq_id) {
                faqs[pos].answers.push(answer);
            }
        }

        Ok(faqs)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let conn = self.lock()?;

        let faqs: i64 = conn.query_row("SELECT COUNT(*) FROM faqs", [], |row| row.get(0))?;
        let answers: i64 = conn.query_row("SELECT COUNT(*) FROM answers", [], |row| row.get(0))?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            faqs,
            answers,
            db_size_bytes,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of FAQs stored.
    pub faqs: i64,
    /// Number of answers stored across all FAQs.
    pub answers: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

fn faq_exists(conn: &Connection, id: &FaqId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM faqs WHERE id = ?1",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn insert_answers(conn: &Connection, id: &FaqId, answers: &[Answer]) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        r"
        INSERT INTO answers (faq_id, title, tr_title, answer, tr_answer)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ",
    )?;
    let faq_id = id.to_string();
    for answer in answers {
        stmt.execute(params![
            faq_id,
            answer.title,
            answer.tr_title,
            answer.answer,
            answer.tr_answer,
        ])?;
    }
    Ok(())
}

/// Delete-then-insert on an open transaction; no diffing.
fn replace_answers_in(conn: &Connection, id: &FaqId, answers: &[Answer]) -> Result<()> {
    let removed = conn.execute("DELETE FROM answers WHERE faq_id = ?1", [id.to_string()])?;
    debug!("Removed {} answers of FAQ {}", removed, id);
    insert_answers(conn, id, answers)
}

fn faq_id_at(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<FaqId> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_faq(row: &rusqlite::Row) -> rusqlite::Result<Faq> {
    Ok(Faq {
        id: faq_id_at(row, 0)?,
        question: row.get(1)?,
        tr_question: row.get(2)?,
        answers: Vec::new(),
    })
}

fn row_to_answer(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<Answer> {
    Ok(Answer {
        title: row.get(offset)?,
        tr_title: row.get(offset + 1)?,
        answer: row.get(offset + 2)?,
        tr_answer: row.get(offset + 3)?,
    })
}
