//! `SQLite` schema definitions for faqdesk.
//!
//! Statements are applied by [`super::migrations`] in version order.

/// SQL statement to create the faqs table.
pub const CREATE_FAQS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS faqs (
    id TEXT PRIMARY KEY NOT NULL,
    question TEXT NOT NULL CHECK (length(question) > 0),
    tr_question TEXT NOT NULL CHECK (length(tr_question) > 0)
)
";

/// SQL statement to create the answers table.
///
/// Answers go away with their FAQ (`ON DELETE CASCADE`); this needs
/// `PRAGMA foreign_keys = ON` on every connection.
pub const CREATE_ANSWERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS answers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    faq_id TEXT NOT NULL REFERENCES faqs(id) ON DELETE CASCADE,
    title TEXT NOT NULL DEFAULT '',
    tr_title TEXT NOT NULL DEFAULT '',
    answer TEXT NOT NULL DEFAULT '',
    tr_answer TEXT NOT NULL DEFAULT ''
)
";

/// SQL statement to create an index on `faq_id` for answer lookups.
pub const CREATE_ANSWERS_FAQ_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_answers_faq_id ON answers(faq_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faqs_table_requires_questions() {
        assert!(CREATE_FAQS_TABLE.contains("id TEXT PRIMARY KEY"));
        assert!(CREATE_FAQS_TABLE.contains("CHECK (length(question) > 0)"));
        assert!(CREATE_FAQS_TABLE.contains("CHECK (length(tr_question) > 0)"));
    }

    #[test]
    fn test_answers_cascade_with_faq() {
        assert!(CREATE_ANSWERS_TABLE.contains("REFERENCES faqs(id) ON DELETE CASCADE"));
    }
}
