//! Static survey content: the award question bank and the general-question policy.
//!
//! Both are loaded once at startup and never mutated afterwards.

mod bank;
mod policy;

pub use bank::QuestionBank;
pub use policy::SurveyPolicy;
