//! Business logic services
//!
//! Services orchestrate the domain and the adapters: the auth session
//! lifecycle, the multi-step assessment submission and the nightly log.

mod assessment;
mod auth;
mod daily;

pub use assessment::{AssessmentOutcome, AssessmentService};
pub use auth::AuthService;
pub use daily::DailySurveyService;
