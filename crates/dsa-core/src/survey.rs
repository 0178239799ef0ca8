//! Survey service: joins the question bank, the answer store and the survey policy.

use crate::answers::{AnswerMap, AnswerStore, CategoryAnswers};
use crate::error::{CoreError, CoreResult};
use crate::questions::{QuestionBank, SurveyPolicy};
use crate::shared::ActorIdentity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Bundle handed to document generation: each question can be paired with its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratePayload {
    pub id: String,
    pub category: String,
    pub general: AnswerMap,
    pub answers: AnswerMap,
    pub questions: Vec<String>,
}

/// One submitted answer, as received from a client.
#[derive(Debug, Clone)]
pub struct AnswerSubmission<'a> {
    pub category: &'a str,
    pub question: &'a str,
    pub answer: &'a str,
    pub is_general: bool,
}

pub struct SurveyService {
    bank: Arc<QuestionBank>,
    store: Arc<AnswerStore>,
    policy: Arc<SurveyPolicy>,
}

impl SurveyService {
    pub fn new(bank: Arc<QuestionBank>, store: Arc<AnswerStore>, policy: Arc<SurveyPolicy>) -> Self {
        Self { bank, store, policy }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn store(&self) -> &AnswerStore {
        &self.store
    }

    pub fn policy(&self) -> &SurveyPolicy {
        &self.policy
    }

    #[inline]
    pub fn needs_general(&self, category: &str) -> bool {
        self.policy.needs_general(category)
    }

    /// Rejects answers whose category or question is not part of the survey.
    pub fn validate(&self, submission: &AnswerSubmission<'_>) -> CoreResult<()> {
        if submission.is_general {
            if !self.policy.is_general_question(submission.question) {
                return Err(CoreError::invalid(format!(
                    "Unknown general question: {}",
                    submission.question
                )));
            }
            return Ok(());
        }
        if !self.bank.has_category(submission.category) {
            return Err(CoreError::invalid(format!(
                "Unknown category: {}",
                submission.category
            )));
        }
        if !self
            .bank
            .contains_question(submission.category, submission.question)
        {
            return Err(CoreError::invalid(format!(
                "Unknown question for category {}: {}",
                submission.category, submission.question
            )));
        }
        Ok(())
    }

    /// Validates and records an answer, creating the actor if needed.
    pub fn submit_answer(
        &self,
        actor: &ActorIdentity,
        submission: &AnswerSubmission<'_>,
    ) -> CoreResult<()> {
        self.validate(submission)?;
        self.store.record_answer(
            actor,
            submission.category,
            submission.question,
            submission.answer,
            submission.is_general,
        )
    }

    /// What `actor` has answered so far for `category`.
    pub fn answers(&self, actor: &ActorIdentity, category: &str) -> CoreResult<CategoryAnswers> {
        self.store.get_answers(actor, category)
    }

    /// Assembles the generate payload. Fails with `NotFound` for a category outside
    /// the bank, or while the actor has no answers in `category`.
    pub fn generate(&self, actor: &ActorIdentity, category: &str) -> CoreResult<GeneratePayload> {
        let questions = self.bank.get_questions(category)?.to_vec();
        let CategoryAnswers { general, answers } = self.store.get_answers(actor, category)?;
        if answers.is_empty() {
            return Err(CoreError::not_found("No answers found for that category."));
        }
        Ok(GeneratePayload {
            id: actor.id().to_string(),
            category: category.to_string(),
            general,
            answers,
            questions,
        })
    }
}
