use crate::shared::CoreConfig;
use std::collections::HashSet;

/// Which categories need the general answers, and which general questions exist.
/// Injected at startup from [`CoreConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyPolicy {
    general_questions: Vec<String>,
    general_categories: HashSet<String>,
}

impl SurveyPolicy {
    pub fn new<Q, C>(general_questions: Q, general_categories: C) -> Self
    where
        Q: IntoIterator,
        Q::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            general_questions: general_questions.into_iter().map(Into::into).collect(),
            general_categories: general_categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            config.general_questions.iter().cloned(),
            config.general_categories.iter().cloned(),
        )
    }

    /// Membership test against the configured category set.
    #[inline]
    pub fn needs_general(&self, category: &str) -> bool {
        self.general_categories.contains(category)
    }

    pub fn general_questions(&self) -> &[String] {
        &self.general_questions
    }

    pub fn is_general_question(&self, question: &str) -> bool {
        self.general_questions.iter().any(|q| q == question)
    }
}

impl Default for SurveyPolicy {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}
