//! Student submissions.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// A student's response to one question.
///
/// The shape depends on the question type: a single string for choice and
/// free-text questions, one string per blank for fill-in-blank, and a
/// left → right mapping for matching questions. Unfilled blanks and
/// unmatched items arrive as `null` and grade as wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Text(String),
    List(Vec<Option<String>>),
    Mapping(BTreeMap<String, Option<String>>),
}

impl SubmittedAnswer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SubmittedAnswer::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Option<String>]> {
        match self {
            SubmittedAnswer::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Option<String>>> {
        match self {
            SubmittedAnswer::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub(crate) fn shape(&self) -> &'static str {
        match self {
            SubmittedAnswer::Text(_) => "text",
            SubmittedAnswer::List(_) => "list",
            SubmittedAnswer::Mapping(_) => "mapping",
        }
    }
}

impl From<&str> for SubmittedAnswer {
    fn from(s: &str) -> Self {
        SubmittedAnswer::Text(s.to_string())
    }
}

impl From<String> for SubmittedAnswer {
    fn from(s: String) -> Self {
        SubmittedAnswer::Text(s)
    }
}

impl From<Vec<String>> for SubmittedAnswer {
    fn from(items: Vec<String>) -> Self {
        SubmittedAnswer::List(items.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<String>>> for SubmittedAnswer {
    fn from(items: Vec<Option<String>>) -> Self {
        SubmittedAnswer::List(items)
    }
}

impl From<BTreeMap<String, String>> for SubmittedAnswer {
    fn from(map: BTreeMap<String, String>) -> Self {
        SubmittedAnswer::Mapping(map.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}

/// Answers keyed by question id. Ordered so serialized output is stable.
pub type AnswerSheet = BTreeMap<String, SubmittedAnswer>;

/// Deserialize an [`AnswerSheet`], treating `null` answers as absent.
///
/// For use with `#[serde(deserialize_with = ...)]` on embedded sheets.
pub fn deserialize_answer_sheet<'de, D>(deserializer: D) -> Result<AnswerSheet, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Option<SubmittedAnswer>>::deserialize(deserializer)?;
    Ok(drop_unanswered(raw))
}

fn drop_unanswered(raw: BTreeMap<String, Option<SubmittedAnswer>>) -> AnswerSheet {
    raw.into_iter()
        .filter_map(|(id, answer)| answer.map(|a| (id, a)))
        .collect()
}

/// Load an answer sheet from a JSON object file.
pub fn load_answer_sheet(path: &Path) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers from {}", path.display()))?;
    parse_answer_sheet(&content)
        .with_context(|| format!("failed to parse answers in {}", path.display()))
}

/// Parse an answer sheet from a JSON object string.
pub fn parse_answer_sheet(content: &str) -> Result<AnswerSheet> {
    let raw: BTreeMap<String, Option<SubmittedAnswer>> =
        serde_json::from_str(content).context("answers must be a JSON object of question id → answer")?;
    Ok(drop_unanswered(raw))
}
