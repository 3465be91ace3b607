//! ProSono Core - client logic for the ProSono sleep-education program
//!
//! This crate implements the client-side core following hexagonal
//! architecture:
//!
//! - **domain**: form drafts, the user model and validation - no I/O
//! - **ports**: trait definitions for external dependencies (TokenStore)
//! - **services**: session and survey-submission orchestration
//! - **adapters**: concrete implementations (file token store, HTTP API client)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::api::ApiClient;
use adapters::file_store::FileTokenStore;
use config::Config;
use ports::TokenStore;
use services::{AssessmentService, AuthService, DailySurveyService};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    AssessmentDraft, AssessmentStep, AssessmentWizard, AttitudeAnswers, DailySurveyDraft,
    FrequencyAnswers, Gender, KnowledgeAnswers, LoginCredentials, RegisterData, StepAnswers,
    StepTransition, User, UserStatus, UserUpdate,
};
pub use services::AssessmentOutcome;

/// Main context for ProSono client operations
///
/// This is the primary entry point. It holds the configuration, the durable
/// token store and all services, wired once per process. Created at startup,
/// torn down on logout, re-created on re-login - there is no global session
/// state.
pub struct ProsonoContext {
    pub config: Config,
    pub token_store: Arc<dyn TokenStore>,
    pub api: Arc<ApiClient>,
    pub auth_service: Arc<AuthService>,
    pub assessment_service: AssessmentService,
    pub daily_survey_service: DailySurveyService,
}

impl ProsonoContext {
    /// Create a new ProSono context rooted at the given directory
    pub fn new(prosono_dir: &Path) -> Result<Self> {
        let config = Config::load(prosono_dir)?;

        let token_store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(prosono_dir));
        let api = Arc::new(ApiClient::new(&config.api_base_url, Arc::clone(&token_store))?);

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&api),
            Arc::clone(&token_store),
            config.enforce_age_range,
        ));
        let assessment_service =
            AssessmentService::new(Arc::clone(&api), Arc::clone(&auth_service));
        let daily_survey_service = DailySurveyService::new(Arc::clone(&api));

        Ok(Self {
            config,
            token_store,
            api,
            auth_service,
            assessment_service,
            daily_survey_service,
        })
    }
}
