//! Assessment submission service
//!
//! Takes a finished wizard draft and writes the three questionnaires to
//! their three independent endpoints. Submission is best-effort per survey:
//! all three requests go out concurrently, the service waits for every one
//! to settle, and the aggregate outcome is classified afterwards - one or
//! two failures still count as success so a multi-minute questionnaire is
//! never redone because of a single unrelated backend write.

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::api::{
    ApiClient, AttitudeSurveyPayload, FrequencySurveyPayload, KnowledgeSurveyPayload,
    SurveyCreated,
};
use crate::domain::date;
use crate::domain::result::{Error, Result};
use crate::domain::AssessmentDraft;
use crate::services::AuthService;

/// Aggregate outcome of one assessment submission
///
/// A `None` id means that survey's write failed; the message enumerates
/// every failed member when fewer than three succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentOutcome {
    pub attitude_id: Option<i64>,
    pub frequency_id: Option<i64>,
    pub knowledge_id: Option<i64>,
    pub message: String,
}

impl AssessmentOutcome {
    pub fn submitted_count(&self) -> usize {
        [self.attitude_id, self.frequency_id, self.knowledge_id]
            .iter()
            .filter(|id| id.is_some())
            .count()
    }

    /// True when at least one survey failed (but not all three)
    pub fn is_partial(&self) -> bool {
        self.submitted_count() < 3
    }
}

pub struct AssessmentService {
    api: Arc<ApiClient>,
    auth: Arc<AuthService>,
}

impl AssessmentService {
    pub fn new(api: Arc<ApiClient>, auth: Arc<AuthService>) -> Self {
        Self { api, auth }
    }

    /// Submit all three questionnaires of a finished draft
    ///
    /// The display-format survey date is converted to wire format exactly
    /// once, here. Returns the aggregate outcome; only the all-three-failed
    /// case is an error.
    pub async fn submit(&self, draft: &AssessmentDraft) -> Result<AssessmentOutcome> {
        let attitude = draft
            .attitude
            .as_ref()
            .ok_or_else(|| Error::validation("Attitude questionnaire not completed"))?;
        let frequency = draft
            .frequency
            .as_ref()
            .ok_or_else(|| Error::validation("Frequency questionnaire not completed"))?;
        let knowledge = draft
            .knowledge
            .as_ref()
            .ok_or_else(|| Error::validation("Knowledge questionnaire not completed"))?;

        let wire_date = date::to_wire_date(&draft.survey_date);
        let attitude_payload = AttitudeSurveyPayload::new(attitude, &wire_date);
        let frequency_payload = FrequencySurveyPayload::new(frequency, &wire_date);
        let knowledge_payload = KnowledgeSurveyPayload::new(knowledge, &wire_date);

        // All three in flight at once; wait for every one to settle before
        // classifying - no fail-fast.
        let (attitude_result, frequency_result, knowledge_result) = tokio::join!(
            self.api.submit_attitude_survey(&attitude_payload),
            self.api.submit_frequency_survey(&frequency_payload),
            self.api.submit_knowledge_survey(&knowledge_payload),
        );

        let outcome = classify_outcome(attitude_result, frequency_result, knowledge_result)?;

        // Best-effort refresh so the dashboard reflects the new submission;
        // the submission outcome stands even if this fails.
        let _ = self.auth.refresh_user().await;

        Ok(outcome)
    }
}

/// Classify the three settled submission results into the aggregate outcome
fn classify_outcome(
    attitude: Result<SurveyCreated>,
    frequency: Result<SurveyCreated>,
    knowledge: Result<SurveyCreated>,
) -> Result<AssessmentOutcome> {
    let mut errors: Vec<String> = Vec::new();

    let attitude_id = match attitude {
        Ok(created) => Some(created.id),
        Err(e) => {
            errors.push(format!("Failed to submit attitude survey: {e}"));
            None
        }
    };
    let frequency_id = match frequency {
        Ok(created) => Some(created.id),
        Err(e) => {
            errors.push(format!("Failed to submit frequency survey: {e}"));
            None
        }
    };
    let knowledge_id = match knowledge {
        Ok(created) => Some(created.id),
        Err(e) => {
            errors.push(format!("Failed to submit knowledge survey: {e}"));
            None
        }
    };

    let submitted = [attitude_id, frequency_id, knowledge_id]
        .iter()
        .filter(|id| id.is_some())
        .count();

    if submitted == 0 {
        return Err(Error::Submission(format!(
            "Failed to submit all surveys: {}",
            errors.join(", ")
        )));
    }

    let message = if submitted == 3 {
        "All surveys submitted successfully".to_string()
    } else {
        format!(
            "{submitted} of 3 surveys submitted successfully. Errors: {}",
            errors.join(", ")
        )
    };

    Ok(AssessmentOutcome {
        attitude_id,
        frequency_id,
        knowledge_id,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(id: i64) -> Result<SurveyCreated> {
        Ok(SurveyCreated { id })
    }

    fn server_error() -> Result<SurveyCreated> {
        Err(Error::api("Internal server error", 500))
    }

    #[test]
    fn test_all_three_succeed() {
        let outcome = classify_outcome(ok(1), ok(2), ok(3)).unwrap();
        assert_eq!(outcome.attitude_id, Some(1));
        assert_eq!(outcome.frequency_id, Some(2));
        assert_eq!(outcome.knowledge_id, Some(3));
        assert_eq!(outcome.message, "All surveys submitted successfully");
        assert_eq!(outcome.submitted_count(), 3);
        assert!(!outcome.is_partial());
    }

    #[test]
    fn test_one_failure_still_succeeds() {
        let outcome = classify_outcome(ok(1), server_error(), ok(3)).unwrap();
        assert_eq!(outcome.frequency_id, None);
        assert_eq!(outcome.submitted_count(), 2);
        assert!(outcome.is_partial());
        assert!(outcome
            .message
            .starts_with("2 of 3 surveys submitted successfully"));
        assert!(outcome.message.contains("frequency survey"));
        assert!(!outcome.message.contains("attitude survey"));
    }

    #[test]
    fn test_two_failures_still_succeed_and_name_both() {
        let outcome = classify_outcome(server_error(), ok(2), server_error()).unwrap();
        assert_eq!(outcome.submitted_count(), 1);
        assert!(outcome
            .message
            .starts_with("1 of 3 surveys submitted successfully"));
        assert!(outcome.message.contains("attitude survey"));
        assert!(outcome.message.contains("knowledge survey"));
        assert!(!outcome.message.contains("frequency survey"));
    }

    #[test]
    fn test_all_failures_escalate_with_every_reason() {
        let err = classify_outcome(server_error(), server_error(), server_error()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to submit all surveys"));
        assert!(message.contains("attitude survey"));
        assert!(message.contains("frequency survey"));
        assert!(message.contains("knowledge survey"));
    }

    #[test]
    fn test_every_single_success_subset_counts_as_success() {
        // |S| >= 1 must classify as overall success
        for mask in 1u8..8 {
            let result = classify_outcome(
                if mask & 1 != 0 { ok(1) } else { server_error() },
                if mask & 2 != 0 { ok(2) } else { server_error() },
                if mask & 4 != 0 { ok(3) } else { server_error() },
            );
            let outcome = result.unwrap();
            assert_eq!(outcome.submitted_count(), mask.count_ones() as usize);
        }
    }
}
