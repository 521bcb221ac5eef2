//! Insertion-ordered question -> answer table.
//!
//! Iteration order is part of the contract: the dataset artifact lists
//! examples in the order the table yields them, so a table loaded from the
//! same file always serializes to the same bytes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QaTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl QaTable {
    pub fn new() -> Self { Self::default() }

    pub fn from_pairs<I, Q, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        let mut table = Self::new();
        for (q, a) in pairs {
            table.insert(q, a);
        }
        table
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        let question = question.into();
        let answer = answer.into();
        match self.index.get(&question) {
            Some(&pos) => self.entries[pos].1 = answer,
            None => {
                self.index.insert(question.clone(), self.entries.len());
                self.entries.push((question, answer));
            }
        }
    }

    /// Exact, verbatim lookup.
    pub fn get(&self, question: &str) -> Option<&str> {
        self.index.get(question).map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains(&self, question: &str) -> bool { self.index.contains_key(question) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    /// Build from a parsed JSON value, which must be a non-empty object of
    /// string values.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::EmptyInput("Q/A data must be a JSON object of question -> answer".to_string()));
        };
        if map.is_empty() {
            return Err(Error::EmptyInput("Q/A data must be a non-empty mapping".to_string()));
        }
        let mut table = Self::new();
        for (question, answer) in map {
            match answer {
                Value::String(answer) => table.insert(question, answer),
                other => {
                    return Err(Error::EmptyInput(format!(
                        "answer for {question:?} must be a string, found {other}"
                    )))
                }
            }
        }
        Ok(table)
    }
}

/// Load a question -> answer table from a JSON object file, keeping the
/// file's key order.
pub fn load_qa_table(path: &Path) -> Result<QaTable> {
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let value: Value = serde_json::from_str(&raw)?;
    let table = QaTable::from_json(value)?;
    tracing::debug!(path = %path.display(), entries = table.len(), "loaded Q/A table");
    Ok(table)
}
