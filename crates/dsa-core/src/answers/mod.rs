//! Per-actor answer records and their sled-backed store.
//!
//! | Tree        | Key        | Value                         |
//! |-------------|------------|-------------------------------|
//! | `users`     | userId     | JSON [`ActorRecord`]          |
//! | `sessions`  | sessionId  | JSON [`ActorRecord`]          |
//! | `questions` | category   | JSON array mirroring the bank |

mod store;

pub use store::AnswerStore;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// question → answer, in the order questions were first answered.
pub type AnswerMap = IndexMap<String, String>;

/// Everything one actor has answered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    #[serde(default)]
    pub general: AnswerMap,
    /// A category is absent until its first answer.
    #[serde(default)]
    pub categories: IndexMap<String, AnswerMap>,
}

impl ActorRecord {
    /// Applies one answer. General answers ignore `category`.
    pub fn apply(&mut self, category: &str, question: &str, answer: &str, is_general: bool) {
        let target = if is_general {
            &mut self.general
        } else {
            self.categories.entry(category.to_string()).or_default()
        };
        target.insert(question.to_string(), answer.to_string());
    }

    /// Answers for `category`, empty if none were recorded.
    pub fn answers_for(&self, category: &str) -> AnswerMap {
        self.categories.get(category).cloned().unwrap_or_default()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// `{ general, answers }` view of one actor for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAnswers {
    pub general: AnswerMap,
    pub answers: AnswerMap,
}
