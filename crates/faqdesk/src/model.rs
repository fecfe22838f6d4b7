//! Core FAQ types for faqdesk.
//!
//! This module defines the FAQ entity, its answers, and the request payload
//! that gets validated into a [`FaqDraft`] before it reaches storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque, server-generated identifier of a FAQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaqId(Uuid);

impl FaqId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FaqId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FaqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for FaqId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One answer option belonging to a FAQ.
///
/// Every field is optional on the wire; missing or `null` fields become empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Answer {
    /// Answer title.
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    /// Translated answer title.
    #[serde(deserialize_with = "null_as_empty")]
    pub tr_title: String,
    /// Answer body.
    #[serde(deserialize_with = "null_as_empty")]
    pub answer: String,
    /// Translated answer body.
    #[serde(deserialize_with = "null_as_empty")]
    pub tr_answer: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A stored FAQ together with its answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    /// Identifier assigned at creation.
    pub id: FaqId,
    /// The question.
    pub question: String,
    /// The translated question.
    pub tr_question: String,
    /// Answers, in insertion order.
    pub answers: Vec<Answer>,
}

/// A validated FAQ ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqDraft {
    /// The question.
    pub question: String,
    /// The translated question.
    pub tr_question: String,
    /// Answers replacing whatever is stored.
    pub answers: Vec<Answer>,
}

/// The body accepted by create and update requests.
///
/// Fields are optional here so that validation can report every missing field
/// at once instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqPayload {
    /// The question.
    pub question: Option<String>,
    /// The translated question.
    pub tr_question: Option<String>,
    /// The answers; `[]` is accepted, `null` or absent is not.
    pub answers: Option<Vec<Answer>>,
}

/// Required payload fields that were absent or empty, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(pub Vec<&'static str>);

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for field in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{field} is required.")?;
            first = false;
        }
        Ok(())
    }
}

impl FaqPayload {
    /// Check required fields and turn the payload into a draft.
    ///
    /// # Errors
    ///
    /// Returns every missing required field when validation fails.
    pub fn validate(self) -> Result<FaqDraft, MissingFields> {
        let mut missing = Vec::new();

        let question = self.question.filter(|q| !q.is_empty());
        if question.is_none() {
            missing.push("question");
        }
        let tr_question = self.tr_question.filter(|q| !q.is_empty());
        if tr_question.is_none() {
            missing.push("trQuestion");
        }
        if self.answers.is_none() {
            missing.push("answers");
        }

        match (question, tr_question, self.answers) {
            (Some(question), Some(tr_question), Some(answers)) => Ok(FaqDraft {
                question,
                tr_question,
                answers,
            }),
            _ => Err(MissingFields(missing)),
        }
    }
}
