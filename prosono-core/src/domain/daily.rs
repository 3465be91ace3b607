//! Nightly sleep log draft
//!
//! Single-step form state for "how did you sleep last night". The date names
//! the morning the participant woke up; every other field refers to the night
//! before it.

use crate::domain::date;
use crate::domain::result::{Error, Result};

/// Default quality score for a fresh draft (middle of the 0-5 scale)
pub const DEFAULT_SLEEP_QUALITY: u8 = 3;

/// In-memory state of the nightly log form
///
/// Invariant: a draft never mixes answers entered for one date with a newly
/// selected different date. Changing the date rebuilds the draft from
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySurveyDraft {
    /// HH:MM, this morning
    pub wake_time: String,
    /// HH:MM, last night
    pub bedtime: String,
    pub minutes_to_fall_asleep: u32,
    pub night_awakenings: u32,
    /// HH:MM duration as entered; converted to total minutes at submission
    pub sleep_duration: String,
    /// 0-5
    pub sleep_quality: u8,
    /// Free text; blank after trimming means "no observation"
    pub note: String,
    /// Display format (DD-MM-YYYY)
    pub survey_date: String,
}

impl DailySurveyDraft {
    pub fn for_date(survey_date: impl Into<String>) -> Self {
        Self {
            wake_time: String::new(),
            bedtime: String::new(),
            minutes_to_fall_asleep: 0,
            night_awakenings: 0,
            sleep_duration: String::new(),
            sleep_quality: DEFAULT_SLEEP_QUALITY,
            note: String::new(),
            survey_date: survey_date.into(),
        }
    }

    pub fn for_today() -> Self {
        Self::for_date(date::today_display())
    }

    /// Switch the draft to a different date, resetting every other field
    pub fn change_date(&mut self, new_date: impl Into<String>) {
        *self = Self::for_date(new_date);
    }

    /// Field-level validation; nothing goes out on the wire if this fails
    pub fn validate(&self) -> Result<()> {
        if self.wake_time.is_empty()
            || self.bedtime.is_empty()
            || self.sleep_duration.is_empty()
            || self.survey_date.is_empty()
        {
            return Err(Error::validation("Please fill in all required fields"));
        }

        if date::normalize_time(&self.wake_time).is_none() {
            return Err(Error::validation(
                "Invalid wake-up time. Use HH:MM (00:00 to 23:59)",
            ));
        }
        if date::normalize_time(&self.bedtime).is_none() {
            return Err(Error::validation(
                "Invalid bedtime. Use HH:MM (00:00 to 23:59)",
            ));
        }
        if date::normalize_time(&self.sleep_duration).is_none() {
            return Err(Error::validation(
                "Invalid sleep duration. Use HH:MM (00:00 to 23:59)",
            ));
        }

        date::validate_display_date(&self.survey_date)?;

        if self.sleep_quality > 5 {
            return Err(Error::validation("Sleep quality must be between 0 and 5"));
        }

        Ok(())
    }
}
