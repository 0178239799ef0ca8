//! dsa-core: survey core for the Design System Awards API (question bank,
//! per-actor answer store, and generate payloads).
//!
//! The gateway and any other front end share this public API.

mod answers;
mod error;
mod questions;
mod shared;
mod survey;

pub use shared::{ActorIdentity, CoreConfig, DEFAULT_GENERAL_CATEGORIES, DEFAULT_GENERAL_QUESTIONS};

pub use error::{CoreError, CoreResult};

pub use questions::{QuestionBank, SurveyPolicy};

pub use answers::{ActorRecord, AnswerMap, AnswerStore, CategoryAnswers};

pub use survey::{AnswerSubmission, GeneratePayload, SurveyService};
