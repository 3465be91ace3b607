//! End-to-end tests for prosono-core services
//!
//! These tests exercise the full stack - config, token store, HTTP client,
//! services - against the mock ProSono backend. Nothing is stubbed below the
//! service layer; requests really go over a socket.
//!
//! Run with: cargo test --test e2e_tests -- --nocapture

use tempfile::TempDir;

use prosono_core::adapters::mock_api::{sample_user, MockConfig, MockProsonoServer};
use prosono_core::config::Config;
use prosono_core::ports::TokenStore;
use prosono_core::{
    AssessmentWizard, AttitudeAnswers, DailySurveyDraft, Error, FrequencyAnswers,
    KnowledgeAnswers, LoginCredentials, ProsonoContext, RegisterData, StepAnswers, User,
    UserStatus,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Build a context whose settings point at the given mock server
fn create_test_context(server: &MockProsonoServer) -> (TempDir, ProsonoContext) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        api_base_url: server.base_url(),
        enforce_age_range: false,
    };
    config.save(dir.path()).expect("Failed to save settings");
    let ctx = ProsonoContext::new(dir.path()).expect("Failed to create context");
    (dir, ctx)
}

fn credentials() -> LoginCredentials {
    LoginCredentials {
        email: "ana@example.com".to_string(),
        password: "correct-horse".to_string(),
    }
}

fn attitude_answers() -> AttitudeAnswers {
    AttitudeAnswers {
        sleep_well_or_poorly: 7,
        enjoy_sleeping: 9,
        sleep_is_important: 8,
        sleep_self_knowledge: 5,
    }
}

fn frequency_answers() -> FrequencyAnswers {
    FrequencyAnswers {
        doze_in_morning_classes: 1,
        last_school_day_without_fatigue: 2,
        doze_in_last_class: 0,
        drowsy_in_car_five_minutes: 3,
        wide_awake_all_day: 2,
        doze_in_afternoon_classes: 1,
        alert_during_classes: 3,
        drowsy_after_school_day: 2,
        drowsy_on_bus_to_activity: 1,
        doze_at_school_mornings: 0,
        alert_in_classes: 3,
        drowsy_during_evening_homework: 2,
        alert_in_last_class: 2,
        doze_on_transport: 1,
        dozed_off_at_school: 0,
        doze_during_evening_homework: 1,
    }
}

fn all_true_knowledge() -> KnowledgeAnswers {
    KnowledgeAnswers {
        short_sleep_causes_irritability: true,
        falling_asleep_raises_body_temperature: true,
        bedtime_does_not_affect_quality: true,
        evening_computer_harms_sleep: true,
        teens_need_eight_hours: true,
        concentration_independent_of_sleep: true,
        sleep_without_brain_activity: true,
        day_or_night_sleep_equivalent: true,
        heavy_meals_harm_sleep: true,
        night_messaging_harms_sleep: true,
        short_sleep_increases_illness: true,
        late_study_as_effective_as_daytime: true,
        bright_light_alters_rhythm: true,
        exercise_helps_falling_asleep: true,
        lost_sleep_recovered_next_night: true,
        insufficient_sleep_causes_weight_gain: true,
        naps_do_not_affect_night_sleep: true,
        sunlight_helps_sleep: true,
        short_sleep_increases_accidents: true,
        several_sleep_stages_per_night: true,
    }
}

/// Walk the wizard to completion and hand back the draft
fn finished_draft(survey_date: &str) -> prosono_core::AssessmentDraft {
    let mut wizard = AssessmentWizard::new(survey_date);
    wizard.complete_step(StepAnswers::Intro).unwrap();
    wizard
        .complete_step(StepAnswers::Attitude(attitude_answers()))
        .unwrap();
    wizard
        .complete_step(StepAnswers::Frequency(frequency_answers()))
        .unwrap();
    wizard
        .complete_step(StepAnswers::Knowledge(all_true_knowledge()))
        .unwrap();
    wizard.finish().unwrap()
}

// ============================================================================
// Session lifecycle
// ============================================================================

/// Scenario A: login persists the token, fetches the profile, and the session
/// user equals that profile exactly.
#[tokio::test]
async fn test_login_resolves_full_profile() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    ctx.auth_service.login(&credentials()).await.unwrap();

    assert!(ctx.token_store.has_access_token());
    assert!(ctx.auth_service.is_authenticated());

    let expected: User = serde_json::from_value(sample_user()).unwrap();
    assert_eq!(ctx.auth_service.current_user().unwrap(), expected);
}

#[tokio::test]
async fn test_login_with_bad_credentials_fails_cleanly() {
    let config = MockConfig {
        fail_login: true,
        ..Default::default()
    };
    let server = MockProsonoServer::start(config).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    let err = ctx.auth_service.login(&credentials()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!ctx.auth_service.is_authenticated());
    assert!(!ctx.token_store.has_access_token());
}

/// Login is still a success when the follow-up profile fetch fails; a
/// minimal placeholder user stands in so nothing downstream sees a null user.
#[tokio::test]
async fn test_login_with_failing_user_fetch_degrades_to_placeholder() {
    let config = MockConfig {
        fail_user_fetch: true,
        ..Default::default()
    };
    let server = MockProsonoServer::start(config).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    ctx.auth_service.login(&credentials()).await.unwrap();

    assert!(ctx.auth_service.is_authenticated());
    let user = ctx.auth_service.current_user().unwrap();
    assert_eq!(user.id, "unknown");
    assert_eq!(user.email, "ana@example.com");
    assert_eq!(user.status, UserStatus::PreEvaluation);
}

#[tokio::test]
async fn test_initialize_rebuilds_session_from_stored_token() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (dir, ctx) = create_test_context(&server);
    ctx.auth_service.login(&credentials()).await.unwrap();
    drop(ctx);

    // A fresh process: same directory, tokens still on disk
    let ctx = ProsonoContext::new(dir.path()).unwrap();
    assert!(ctx.auth_service.is_authenticated());
    assert!(ctx.auth_service.current_user().is_none());

    ctx.auth_service.initialize().await;
    assert_eq!(
        ctx.auth_service.current_user().unwrap().first_name,
        "Ana"
    );
}

#[tokio::test]
async fn test_initialize_clears_tokens_when_session_is_invalid() {
    let config = MockConfig {
        fail_user_fetch: true,
        ..Default::default()
    };
    let server = MockProsonoServer::start(config).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    ctx.token_store
        .set_access_token(&prosono_core::adapters::mock_api::issue_token(3600));
    ctx.auth_service.initialize().await;

    assert!(!ctx.token_store.has_access_token());
    assert!(!ctx.auth_service.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);
    ctx.auth_service.login(&credentials()).await.unwrap();

    ctx.auth_service.logout().await;

    assert!(!ctx.auth_service.is_authenticated());
    assert!(ctx.auth_service.current_user().is_none());
    assert!(!ctx.token_store.has_access_token());
}

#[tokio::test]
async fn test_register_never_establishes_a_session() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    let data = RegisterData {
        email: "novo@example.com".to_string(),
        password: "long-enough-password".to_string(),
        first_name: "Rui".to_string(),
        last_name: "Costa".to_string(),
        birth_date: chrono::NaiveDate::from_ymd_opt(2009, 3, 2).unwrap(),
        gender: None,
        school: None,
        school_year: None,
    };
    ctx.auth_service.register(&data).await.unwrap();

    assert!(!ctx.auth_service.is_authenticated());
    assert!(!ctx.token_store.has_access_token());
}

#[tokio::test]
async fn test_duplicate_registration_surfaces_conflict() {
    let config = MockConfig {
        duplicate_registration: true,
        ..Default::default()
    };
    let server = MockProsonoServer::start(config).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    let data = RegisterData {
        email: "ana@example.com".to_string(),
        password: "long-enough-password".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Silva".to_string(),
        birth_date: chrono::NaiveDate::from_ymd_opt(2009, 6, 1).unwrap(),
        gender: None,
        school: None,
        school_year: None,
    };
    let err = ctx.auth_service.register(&data).await.unwrap_err();
    assert!(err.is_conflict());
}

// ============================================================================
// Token refresh
// ============================================================================

/// An expired access token plus a stored refresh token triggers a transparent
/// refresh round trip before the actual request goes out.
#[tokio::test]
async fn test_proactive_refresh_before_request() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    ctx.token_store.set_token_pair(
        &prosono_core::adapters::mock_api::issue_token(-60),
        Some("stored-refresh-token"),
    );

    let user = ctx.auth_service.refresh_user().await.unwrap();
    assert_eq!(user.first_name, "Ana");

    // The refresh ran first and rotated the stored pair
    assert_eq!(server.requests_to("POST", "/auth/refresh").len(), 1);
    assert_eq!(
        ctx.token_store.refresh_token().as_deref(),
        Some("rotated-refresh-token")
    );
}

/// A failing refresh is a hard session termination, not a recoverable error.
#[tokio::test]
async fn test_failed_proactive_refresh_terminates_session() {
    let config = MockConfig {
        fail_refresh: true,
        ..Default::default()
    };
    let server = MockProsonoServer::start(config).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    ctx.token_store.set_token_pair(
        &prosono_core::adapters::mock_api::issue_token(-60),
        Some("stored-refresh-token"),
    );

    let err = ctx.auth_service.refresh_user().await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired(_)));
    assert!(!ctx.token_store.has_access_token());
    assert_eq!(ctx.token_store.refresh_token(), None);
}

#[tokio::test]
async fn test_explicit_refresh_rotates_pair() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    ctx.token_store
        .set_token_pair(&prosono_core::adapters::mock_api::issue_token(3600), Some("old-refresh"));

    ctx.auth_service.refresh_token().await.unwrap();
    assert_eq!(
        ctx.token_store.refresh_token().as_deref(),
        Some("rotated-refresh-token")
    );
}

#[tokio::test]
async fn test_explicit_refresh_failure_clears_session_and_propagates() {
    let config = MockConfig {
        fail_refresh: true,
        ..Default::default()
    };
    let server = MockProsonoServer::start(config).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    // Unexpired access token so the transparent pre-request refresh stays out
    // of the way and the explicit exchange is the one that fails.
    ctx.token_store
        .set_token_pair(&prosono_core::adapters::mock_api::issue_token(3600), Some("old-refresh"));

    let err = ctx.auth_service.refresh_token().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!ctx.token_store.has_access_token());
}

// ============================================================================
// Assessment submission
// ============================================================================

/// Scenario B: all 20 knowledge answers true, date 25-12-2024 on the display
/// side, lands on the wire as 2024-12-25 with 20 boolean fields.
#[tokio::test]
async fn test_knowledge_survey_wire_payload() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);
    ctx.auth_service.login(&credentials()).await.unwrap();

    let draft = finished_draft("25-12-2024");
    let outcome = ctx.assessment_service.submit(&draft).await.unwrap();
    assert_eq!(outcome.submitted_count(), 3);

    let knowledge_posts = server.requests_to("POST", "/surveys");
    assert_eq!(knowledge_posts.len(), 1);
    let body = knowledge_posts[0].body.as_object().unwrap();

    assert_eq!(body["surveyDate"], "2024-12-25");
    let booleans: Vec<_> = body.iter().filter(|(key, _)| *key != "surveyDate").collect();
    assert_eq!(booleans.len(), 20);
    assert!(booleans.iter().all(|(_, v)| v.as_bool() == Some(true)));

    // The sibling payloads carry the same converted date
    let attitude_posts = server.requests_to("POST", "/my-sleep-surveys");
    assert_eq!(attitude_posts[0].body["surveyDate"], "2024-12-25");
    let frequency_posts = server.requests_to("POST", "/cleveland-surveys");
    assert_eq!(frequency_posts[0].body["surveyDate"], "2024-12-25");
}

/// Scenario D: the frequency endpoint fails, the other two succeed - the
/// orchestrator still classifies success, refreshes the user and reports
/// which member failed.
#[tokio::test]
async fn test_partial_failure_still_counts_as_success() {
    let config = MockConfig {
        fail_frequency: true,
        ..Default::default()
    };
    let server = MockProsonoServer::start(config).unwrap();
    let (_dir, ctx) = create_test_context(&server);
    ctx.auth_service.login(&credentials()).await.unwrap();

    let draft = finished_draft("25-12-2024");
    let outcome = ctx.assessment_service.submit(&draft).await.unwrap();

    assert_eq!(outcome.submitted_count(), 2);
    assert_eq!(outcome.attitude_id, Some(101));
    assert_eq!(outcome.frequency_id, None);
    assert_eq!(outcome.knowledge_id, Some(303));
    assert!(outcome
        .message
        .starts_with("2 of 3 surveys submitted successfully"));
    assert!(outcome.message.contains("frequency survey"));

    // One GET /user at login, one refresh after the submission
    assert_eq!(server.requests_to("GET", "/user").len(), 2);
}

#[tokio::test]
async fn test_total_failure_raises_aggregate_error() {
    let config = MockConfig {
        fail_attitude: true,
        fail_frequency: true,
        fail_knowledge: true,
        ..Default::default()
    };
    let server = MockProsonoServer::start(config).unwrap();
    let (_dir, ctx) = create_test_context(&server);
    ctx.auth_service.login(&credentials()).await.unwrap();

    let draft = finished_draft("25-12-2024");
    let err = ctx.assessment_service.submit(&draft).await.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("Failed to submit all surveys"));
    assert!(message.contains("attitude survey"));
    assert!(message.contains("frequency survey"));
    assert!(message.contains("knowledge survey"));
}

// ============================================================================
// Daily survey
// ============================================================================

/// Scenario C: wake 07:30, bedtime 23:00, total sleep 08:15 transmits
/// horasQueDormiste = 495.
#[tokio::test]
async fn test_daily_survey_wire_payload() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);
    ctx.auth_service.login(&credentials()).await.unwrap();

    let mut draft = DailySurveyDraft::for_date("26-12-2024");
    draft.wake_time = "07:30".to_string();
    draft.bedtime = "23:00".to_string();
    draft.minutes_to_fall_asleep = 15;
    draft.night_awakenings = 1;
    draft.sleep_duration = "08:15".to_string();
    draft.sleep_quality = 4;

    let created = ctx.daily_survey_service.submit(&draft).await.unwrap();
    assert_eq!(created.id, "daily-1");

    let posts = server.requests_to("POST", "/daily-surveys");
    assert_eq!(posts.len(), 1);
    let body = posts[0].body.as_object().unwrap();
    assert_eq!(body["horasQueDormiste"], 495);
    assert_eq!(body["horaLevantasteHoje"], "07:30");
    assert_eq!(body["horaDeitasteOntem"], "23:00");
    assert_eq!(body["surveyDate"], "2024-12-26");
    assert!(!body.contains_key("observacaoNoitePassada"));
}

#[tokio::test]
async fn test_invalid_daily_draft_never_reaches_the_network() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);

    let draft = DailySurveyDraft::for_date("26-12-2024");
    let err = ctx.daily_survey_service.submit(&draft).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(server.requests_to("POST", "/daily-surveys").is_empty());
}

#[tokio::test]
async fn test_missing_daily_survey_reads_as_none() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);
    ctx.auth_service.login(&credentials()).await.unwrap();

    let latest = ctx.daily_survey_service.latest().await.unwrap();
    assert!(latest.is_none());
}

#[tokio::test]
async fn test_existing_daily_survey_is_returned() {
    let config = MockConfig {
        no_daily_survey: false,
        ..Default::default()
    };
    let server = MockProsonoServer::start(config).unwrap();
    let (_dir, ctx) = create_test_context(&server);
    ctx.auth_service.login(&credentials()).await.unwrap();

    let latest = ctx.daily_survey_service.latest().await.unwrap().unwrap();
    assert_eq!(latest.total_sleep_minutes, 480);
    assert_eq!(latest.wake_time, "07:30");
}

// ============================================================================
// Profile updates
// ============================================================================

#[tokio::test]
async fn test_profile_update_replaces_local_user_wholesale() {
    let server = MockProsonoServer::start(MockConfig::default()).unwrap();
    let (_dir, ctx) = create_test_context(&server);
    ctx.auth_service.login(&credentials()).await.unwrap();

    let update = prosono_core::UserUpdate {
        school: Some("Escola Nova".to_string()),
        ..Default::default()
    };
    let updated = ctx.auth_service.update_profile(&update).await.unwrap();

    assert_eq!(updated.school.as_deref(), Some("Escola Nova"));
    assert_eq!(
        ctx.auth_service.current_user().unwrap().school.as_deref(),
        Some("Escola Nova")
    );

    // Only the set field went over the wire
    let puts = server.requests_to("PUT", "/user");
    assert_eq!(puts.len(), 1);
    let body = puts[0].body.as_object().unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body["school"], "Escola Nova");
}
