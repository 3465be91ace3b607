//! Daily survey service
//!
//! The single-step sibling of the assessment pipeline: validates the nightly
//! log draft, shapes the wire payload and submits it. Validation failures
//! never reach the network.

use std::sync::Arc;

use crate::adapters::api::{ApiClient, DailySurveyCreated, DailySurveyPayload, DailySurveyRecord};
use crate::domain::date;
use crate::domain::result::{Error, Result};
use crate::domain::DailySurveyDraft;

pub struct DailySurveyService {
    api: Arc<ApiClient>,
}

impl DailySurveyService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Validate the draft and shape the outbound payload
    ///
    /// Times are normalized to zero-padded HH:MM, the entered sleep duration
    /// becomes total minutes, the date goes to wire format, and a blank note
    /// is omitted entirely rather than sent as an empty string.
    pub fn build_payload(draft: &DailySurveyDraft) -> Result<DailySurveyPayload> {
        draft.validate()?;

        let wake_time = date::normalize_time(&draft.wake_time)
            .ok_or_else(|| Error::validation("Invalid wake-up time"))?;
        let bedtime = date::normalize_time(&draft.bedtime)
            .ok_or_else(|| Error::validation("Invalid bedtime"))?;
        let total_sleep_minutes = date::duration_to_minutes(&draft.sleep_duration)
            .ok_or_else(|| Error::validation("Invalid sleep duration"))?;

        let note = draft.note.trim();
        let note = if note.is_empty() {
            None
        } else {
            Some(note.to_string())
        };

        Ok(DailySurveyPayload {
            wake_time,
            bedtime,
            minutes_to_fall_asleep: draft.minutes_to_fall_asleep,
            night_awakenings: draft.night_awakenings,
            total_sleep_minutes,
            sleep_quality: draft.sleep_quality,
            note,
            survey_date: date::to_wire_date(&draft.survey_date),
        })
    }

    pub async fn submit(&self, draft: &DailySurveyDraft) -> Result<DailySurveyCreated> {
        let payload = Self::build_payload(draft)?;
        self.api.submit_daily_survey(&payload).await
    }

    /// Latest stored nightly log, or `None` when the participant has none yet
    pub async fn latest(&self) -> Result<Option<DailySurveyRecord>> {
        self.api.latest_daily_survey().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_draft() -> DailySurveyDraft {
        DailySurveyDraft {
            wake_time: "07:30".to_string(),
            bedtime: "23:00".to_string(),
            minutes_to_fall_asleep: 15,
            night_awakenings: 2,
            sleep_duration: "08:15".to_string(),
            sleep_quality: 4,
            note: String::new(),
            survey_date: "26-12-2024".to_string(),
        }
    }

    #[test]
    fn test_sleep_duration_becomes_total_minutes() {
        let payload = DailySurveyService::build_payload(&filled_draft()).unwrap();
        assert_eq!(payload.total_sleep_minutes, 495);
        assert_eq!(payload.wake_time, "07:30");
        assert_eq!(payload.bedtime, "23:00");
    }

    #[test]
    fn test_times_are_normalized() {
        let mut draft = filled_draft();
        draft.wake_time = "7:30".to_string();
        draft.bedtime = "23:5".to_string();
        let payload = DailySurveyService::build_payload(&draft).unwrap();
        assert_eq!(payload.wake_time, "07:30");
        assert_eq!(payload.bedtime, "23:05");
    }

    #[test]
    fn test_date_goes_out_in_wire_format() {
        let payload = DailySurveyService::build_payload(&filled_draft()).unwrap();
        assert_eq!(payload.survey_date, "2024-12-26");
    }

    #[test]
    fn test_blank_note_is_omitted() {
        let mut draft = filled_draft();
        draft.note = "   ".to_string();
        let payload = DailySurveyService::build_payload(&draft).unwrap();
        assert_eq!(payload.note, None);

        let value = serde_json::to_value(&payload).unwrap();
        assert!(!value.as_object().unwrap().contains_key("observacaoNoitePassada"));
    }

    #[test]
    fn test_nonblank_note_is_trimmed_and_kept() {
        let mut draft = filled_draft();
        draft.note = "  slept with the window open  ".to_string();
        let payload = DailySurveyService::build_payload(&draft).unwrap();
        assert_eq!(payload.note.as_deref(), Some("slept with the window open"));
    }

    #[test]
    fn test_invalid_draft_builds_no_payload() {
        let mut draft = filled_draft();
        draft.wake_time = "24:00".to_string();
        assert!(DailySurveyService::build_payload(&draft).is_err());
    }
}
