//! User domain model and the inputs that create or change it

use chrono::{Datelike, Local, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Program phase for a participant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    PreEvaluation,
    SleepTracking,
    PostEvaluation,
    SleepRelationship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

/// Mean of a metric over trailing windows, as computed by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeanMetrics {
    pub last7_days: Option<f64>,
    pub last15_days: Option<f64>,
    pub last30_days: Option<f64>,
}

/// Aggregated nightly-log statistics (summary only; raw logs stay server-side)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySurveysSummary {
    pub target: u32,
    pub dates: Vec<NaiveDate>,
    #[serde(default)]
    pub streak: u32,
    /// Minutes
    pub mean_sleep_duration: MeanMetrics,
    /// Minutes from midnight
    pub mean_wake_time: MeanMetrics,
    /// Minutes from midnight
    pub mean_bedtime: MeanMetrics,
    /// Minutes
    pub mean_time_to_sleep: MeanMetrics,
    pub mean_night_awakenings: MeanMetrics,
    /// 0-5 scale
    pub mean_sleep_quality: MeanMetrics,
}

/// Per-question means for one "My sleep" attitude assessment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttitudeMeans {
    #[serde(rename = "durmoMalOuBem")]
    pub sleep_well_or_poorly: f64,
    #[serde(rename = "gostoDeDormir")]
    pub enjoy_sleeping: f64,
    #[serde(rename = "achoSonoImportanteParaMim")]
    pub sleep_is_important: f64,
    #[serde(rename = "oQueSeiSobreSono")]
    pub sleep_self_knowledge: f64,
}

/// One completed evaluation (the three questionnaires of a single date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSurvey {
    pub date: NaiveDate,
    pub score: i32,
    #[serde(default)]
    pub my_sleep_means: Option<AttitudeMeans>,
    #[serde(default)]
    pub cleveland_mean: Option<f64>,
}

/// An authenticated participant
///
/// Owned exclusively by the auth service: it is replaced wholesale by profile
/// updates and refreshes, never patched field by field elsewhere. The email is
/// immutable after registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_year: Option<u8>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_surveys: Option<Vec<EvaluationSurvey>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_surveys: Option<DailySurveysSummary>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl User {
    /// Minimal stand-in used when login succeeds but the profile fetch fails.
    ///
    /// The token is valid, so the session is authenticated; this placeholder
    /// keeps dependent code from having to handle a missing user.
    pub fn placeholder(email: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: "unknown".to_string(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            birth_date: None,
            gender: None,
            school: None,
            school_year: None,
            status: UserStatus::PreEvaluation,
            evaluation_surveys: None,
            daily_surveys: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Registration input
///
/// Optional fields are omitted from the outbound payload when unset rather
/// than sent as null or empty strings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_year: Option<u8>,
}

/// Youngest and oldest ages accepted when age-range enforcement is enabled
pub const MIN_AGE: i32 = 15;
pub const MAX_AGE: i32 = 18;

impl RegisterData {
    /// Field-level validation, run before any network call.
    ///
    /// The age gate only applies when the deployment enables it
    /// (`enforce_age_range` in the config).
    pub fn validate(&self, enforce_age_range: bool) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(Error::validation("First name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(Error::validation("Last name is required"));
        }

        let email_re = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
        if self.email.trim().is_empty() {
            return Err(Error::validation("Email is required"));
        }
        if !email_re.is_match(&self.email) {
            return Err(Error::validation("Invalid email address"));
        }

        if self.password.len() < 8 {
            return Err(Error::validation(
                "Password must be at least 8 characters",
            ));
        }

        if let Some(year) = self.school_year {
            if !matches!(year, 10..=12) {
                return Err(Error::validation("School year must be 10, 11 or 12"));
            }
        }

        if enforce_age_range {
            let age = age_on(Local::now().date_naive(), self.birth_date);
            if !(MIN_AGE..=MAX_AGE).contains(&age) {
                return Err(Error::validation(format!(
                    "Participants must be between {MIN_AGE} and {MAX_AGE} years old"
                )));
            }
        }

        Ok(())
    }
}

/// Whole years completed between `birth` and `today`
fn age_on(today: NaiveDate, birth: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Partial profile update; only set fields are transmitted
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_year: Option<u8>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.birth_date.is_none()
            && self.gender.is_none()
            && self.school.is_none()
            && self.school_year.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegisterData {
        RegisterData {
            email: "ana@example.com".to_string(),
            password: "correct-horse".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2009, 6, 1).unwrap(),
            gender: Some(Gender::Female),
            school: Some("Escola Secundária".to_string()),
            school_year: Some(10),
        }
    }

    #[test]
    fn test_placeholder_user() {
        let user = User::placeholder("teen@example.com");
        assert_eq!(user.id, "unknown");
        assert_eq!(user.email, "teen@example.com");
        assert_eq!(user.status, UserStatus::PreEvaluation);
        assert!(user.first_name.is_empty());
    }

    #[test]
    fn test_user_status_wire_names() {
        let json = serde_json::to_string(&UserStatus::SleepTracking).unwrap();
        assert_eq!(json, r#""sleep_tracking""#);
        let status: UserStatus = serde_json::from_str(r#""post_evaluation""#).unwrap();
        assert_eq!(status, UserStatus::PostEvaluation);
    }

    #[test]
    fn test_user_deserializes_from_backend_shape() {
        let body = r#"{
            "email": "ana@example.com",
            "firstName": "Ana",
            "lastName": "Silva",
            "birthDate": "2009-06-01",
            "gender": "F",
            "school": "Escola Secundária",
            "schoolYear": 10,
            "status": "sleep_tracking",
            "evaluationSurveys": [
                {"date": "2024-12-25", "score": 14,
                 "mySleepMeans": {"durmoMalOuBem": 7.0, "gostoDeDormir": 9.0,
                                  "achoSonoImportanteParaMim": 8.0, "oQueSeiSobreSono": 5.0},
                 "clevelandMean": 1.5}
            ],
            "dailySurveys": {
                "target": 14,
                "dates": ["2024-12-26", "2024-12-27"],
                "streak": 2,
                "meanSleepDuration": {"last7Days": 465.0, "last15Days": null, "last30Days": null},
                "meanWakeTime": {"last7Days": 450.0, "last15Days": null, "last30Days": null},
                "meanBedtime": {"last7Days": 1380.0, "last15Days": null, "last30Days": null},
                "meanTimeToSleep": {"last7Days": 15.0, "last15Days": null, "last30Days": null},
                "meanNightAwakenings": {"last7Days": 1.0, "last15Days": null, "last30Days": null},
                "meanSleepQuality": {"last7Days": 3.5, "last15Days": null, "last30Days": null}
            },
            "createdAt": "2024-11-01T10:00:00Z",
            "updatedAt": "2024-12-27T08:30:00Z"
        }"#;

        let user: User = serde_json::from_str(body).unwrap();
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.status, UserStatus::SleepTracking);
        assert_eq!(user.gender, Some(Gender::Female));
        let summary = user.daily_surveys.unwrap();
        assert_eq!(summary.dates.len(), 2);
        assert_eq!(summary.mean_sleep_duration.last7_days, Some(465.0));
        let surveys = user.evaluation_surveys.unwrap();
        assert_eq!(surveys[0].my_sleep_means.unwrap().enjoy_sleeping, 9.0);
    }

    #[test]
    fn test_registration_validation_rejects_missing_fields() {
        let mut data = valid_registration();
        data.first_name = "  ".to_string();
        assert!(data.validate(false).is_err());

        let mut data = valid_registration();
        data.email = "not-an-email".to_string();
        assert!(data.validate(false).is_err());

        let mut data = valid_registration();
        data.password = "short".to_string();
        assert!(data.validate(false).is_err());

        let mut data = valid_registration();
        data.school_year = Some(9);
        assert!(data.validate(false).is_err());
    }

    #[test]
    fn test_registration_age_gate() {
        let today = Local::now().date_naive();

        // 16 years old: inside the window either way
        let mut data = valid_registration();
        data.birth_date = NaiveDate::from_ymd_opt(today.year() - 16, 1, 1).unwrap();
        assert!(data.validate(true).is_ok());

        // 12 years old: rejected only when the gate is on
        let mut data = valid_registration();
        data.birth_date = NaiveDate::from_ymd_opt(today.year() - 12, 1, 1).unwrap();
        assert!(data.validate(false).is_ok());
        assert!(data.validate(true).is_err());

        // 30 years old: rejected when the gate is on
        let mut data = valid_registration();
        data.birth_date = NaiveDate::from_ymd_opt(today.year() - 30, 1, 1).unwrap();
        assert!(data.validate(true).is_err());
    }

    #[test]
    fn test_age_counts_whole_years_only() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        // Birthday later this year: still 14
        assert_eq!(
            age_on(today, NaiveDate::from_ymd_opt(2010, 6, 16).unwrap()),
            14
        );
        // Birthday today: already 15
        assert_eq!(
            age_on(today, NaiveDate::from_ymd_opt(2010, 6, 15).unwrap()),
            15
        );
    }

    #[test]
    fn test_register_payload_omits_unset_fields() {
        let mut data = valid_registration();
        data.gender = None;
        data.school = None;
        data.school_year = None;

        let value = serde_json::to_value(&data).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("firstName"));
        assert!(obj.contains_key("birthDate"));
        assert!(!obj.contains_key("gender"));
        assert!(!obj.contains_key("school"));
        assert!(!obj.contains_key("schoolYear"));
    }

    #[test]
    fn test_user_update_is_empty() {
        assert!(UserUpdate::default().is_empty());
        let update = UserUpdate {
            school: Some("Nova Escola".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
    }
}
