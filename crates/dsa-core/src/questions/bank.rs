//! Question bank loaded from a JSON object of `category -> [question, ...]`.

use crate::error::{CoreError, CoreResult};
use std::path::Path;

/// Immutable category → ordered questions mapping. Category order follows the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    categories: Vec<(String, Vec<String>)>,
}

impl QuestionBank {
    /// Reads and parses the question source at `path`. Any failure is fatal for the caller.
    pub fn load_json_path<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CoreError::QuestionSource {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::from_json_str(&raw)?;
        tracing::info!(
            target: "dsa::questions",
            path = %path.display(),
            categories = bank.len(),
            "Question bank loaded ({} categories)",
            bank.len()
        );
        Ok(bank)
    }

    /// Parses a question bank from JSON text.
    pub fn from_json_str(raw: &str) -> CoreResult<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| CoreError::QuestionFormat(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| CoreError::QuestionFormat("top level must be an object".into()))?;
        if object.is_empty() {
            return Err(CoreError::QuestionFormat("no categories defined".into()));
        }

        let mut categories = Vec::with_capacity(object.len());
        for (category, questions) in object {
            if category.trim().is_empty() {
                return Err(CoreError::QuestionFormat("empty category name".into()));
            }
            let items = questions.as_array().ok_or_else(|| {
                CoreError::QuestionFormat(format!("category '{}' must map to an array", category))
            })?;
            let questions = items
                .iter()
                .map(|q| {
                    q.as_str().map(str::to_string).ok_or_else(|| {
                        CoreError::QuestionFormat(format!(
                            "category '{}' contains a non-string question",
                            category
                        ))
                    })
                })
                .collect::<CoreResult<Vec<_>>>()?;
            categories.push((category.clone(), questions));
        }
        Ok(Self { categories })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category names in source order.
    pub fn list_categories(&self) -> Vec<String> {
        self.categories.iter().map(|(c, _)| c.clone()).collect()
    }

    /// Questions for `category`, in source order.
    pub fn get_questions(&self, category: &str) -> CoreResult<&[String]> {
        self.categories
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, q)| q.as_slice())
            .ok_or_else(|| CoreError::not_found("Category not found"))
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|(c, _)| c == category)
    }

    /// True when `question` is listed verbatim under `category`.
    pub fn contains_question(&self, category: &str, question: &str) -> bool {
        self.get_questions(category)
            .map(|qs| qs.iter().any(|q| q == question))
            .unwrap_or(false)
    }

    /// Iterates `(category, questions)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(c, q)| (c.as_str(), q.as_slice()))
    }
}
