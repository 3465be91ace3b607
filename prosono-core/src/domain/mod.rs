//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external
//! dependencies.

mod assessment;
mod daily;
mod user;
pub mod date;
pub mod result;

pub use assessment::{
    AssessmentDraft, AssessmentStep, AssessmentWizard, AttitudeAnswers, FrequencyAnswers,
    KnowledgeAnswers, StepAnswers, StepTransition,
};
pub use daily::{DailySurveyDraft, DEFAULT_SLEEP_QUALITY};
pub use user::{
    AttitudeMeans, DailySurveysSummary, EvaluationSurvey, Gender, LoginCredentials, MeanMetrics,
    RegisterData, User, UserStatus, UserUpdate,
};
