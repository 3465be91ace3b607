//! Evaluation assessment: answer records and the step wizard
//!
//! One evaluation is three questionnaires answered in sequence behind an
//! intro screen. The wizard walks a fixed ordered step list, collecting each
//! step's answers into a draft that lives only until submission.

use crate::domain::result::{Error, Result};

/// Answers to the "My sleep" attitude questionnaire (each 0-10)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttitudeAnswers {
    /// Do I sleep poorly or well?
    pub sleep_well_or_poorly: u8,
    /// Do I like sleeping?
    pub enjoy_sleeping: u8,
    /// Is sleep important to me?
    pub sleep_is_important: u8,
    /// How much do I know about sleep?
    pub sleep_self_knowledge: u8,
}

impl AttitudeAnswers {
    pub fn validate(&self) -> Result<()> {
        let answers = [
            self.sleep_well_or_poorly,
            self.enjoy_sleeping,
            self.sleep_is_important,
            self.sleep_self_knowledge,
        ];
        if answers.iter().any(|&a| a > 10) {
            return Err(Error::validation("Attitude answers must be between 0 and 10"));
        }
        Ok(())
    }
}

/// Answers to the daytime-sleepiness frequency questionnaire (each 0-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyAnswers {
    pub doze_in_morning_classes: u8,
    pub last_school_day_without_fatigue: u8,
    pub doze_in_last_class: u8,
    pub drowsy_in_car_five_minutes: u8,
    pub wide_awake_all_day: u8,
    pub doze_in_afternoon_classes: u8,
    pub alert_during_classes: u8,
    pub drowsy_after_school_day: u8,
    pub drowsy_on_bus_to_activity: u8,
    pub doze_at_school_mornings: u8,
    pub alert_in_classes: u8,
    pub drowsy_during_evening_homework: u8,
    pub alert_in_last_class: u8,
    pub doze_on_transport: u8,
    pub dozed_off_at_school: u8,
    pub doze_during_evening_homework: u8,
}

impl FrequencyAnswers {
    pub fn validate(&self) -> Result<()> {
        let answers = [
            self.doze_in_morning_classes,
            self.last_school_day_without_fatigue,
            self.doze_in_last_class,
            self.drowsy_in_car_five_minutes,
            self.wide_awake_all_day,
            self.doze_in_afternoon_classes,
            self.alert_during_classes,
            self.drowsy_after_school_day,
            self.drowsy_on_bus_to_activity,
            self.doze_at_school_mornings,
            self.alert_in_classes,
            self.drowsy_during_evening_homework,
            self.alert_in_last_class,
            self.doze_on_transport,
            self.dozed_off_at_school,
            self.doze_during_evening_homework,
        ];
        if answers.iter().any(|&a| a > 4) {
            return Err(Error::validation(
                "Frequency answers must be between 0 and 4",
            ));
        }
        Ok(())
    }
}

/// True/false answers to the sleep-knowledge questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnowledgeAnswers {
    pub short_sleep_causes_irritability: bool,
    pub falling_asleep_raises_body_temperature: bool,
    pub bedtime_does_not_affect_quality: bool,
    pub evening_computer_harms_sleep: bool,
    pub teens_need_eight_hours: bool,
    pub concentration_independent_of_sleep: bool,
    pub sleep_without_brain_activity: bool,
    pub day_or_night_sleep_equivalent: bool,
    pub heavy_meals_harm_sleep: bool,
    pub night_messaging_harms_sleep: bool,
    pub short_sleep_increases_illness: bool,
    pub late_study_as_effective_as_daytime: bool,
    pub bright_light_alters_rhythm: bool,
    pub exercise_helps_falling_asleep: bool,
    pub lost_sleep_recovered_next_night: bool,
    pub insufficient_sleep_causes_weight_gain: bool,
    pub naps_do_not_affect_night_sleep: bool,
    pub sunlight_helps_sleep: bool,
    pub short_sleep_increases_accidents: bool,
    pub several_sleep_stages_per_night: bool,
}

/// Ordered wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentStep {
    Intro,
    Attitude,
    Frequency,
    Knowledge,
}

impl AssessmentStep {
    pub const ALL: [AssessmentStep; 4] = [
        AssessmentStep::Intro,
        AssessmentStep::Attitude,
        AssessmentStep::Frequency,
        AssessmentStep::Knowledge,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AssessmentStep::Intro => "Introduction",
            AssessmentStep::Attitude => "My sleep",
            AssessmentStep::Frequency => "Daytime sleepiness scale",
            AssessmentStep::Knowledge => "Ideas about sleep",
        }
    }

    /// 0-based position in the step list
    pub fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

/// Answers handed over when a step is completed
#[derive(Debug, Clone)]
pub enum StepAnswers {
    Intro,
    Attitude(AttitudeAnswers),
    Frequency(FrequencyAnswers),
    Knowledge(KnowledgeAnswers),
}

/// Transient, unpersisted state collected across the wizard steps
///
/// Each sub-record stays `None` until its step completes; the whole draft is
/// discarded after submission, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentDraft {
    pub attitude: Option<AttitudeAnswers>,
    pub frequency: Option<FrequencyAnswers>,
    pub knowledge: Option<KnowledgeAnswers>,
    /// Display format (DD-MM-YYYY); converted to wire format once, at submission
    pub survey_date: String,
}

impl AssessmentDraft {
    fn new(survey_date: String) -> Self {
        Self {
            attitude: None,
            frequency: None,
            knowledge: None,
            survey_date,
        }
    }
}

/// What happened after completing a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTransition {
    /// Moved forward to the given step
    Advanced(AssessmentStep),
    /// The last step completed; the draft is ready to submit
    Finished,
}

/// The 4-step evaluation wizard
///
/// Completing a step stores that step's answers and advances. Going backward
/// returns to the immediately preceding step without discarding anything
/// already collected. Submission is only reachable from the last step.
#[derive(Debug, Clone)]
pub struct AssessmentWizard {
    position: usize,
    draft: AssessmentDraft,
}

impl AssessmentWizard {
    pub fn new(survey_date: impl Into<String>) -> Self {
        Self {
            position: 0,
            draft: AssessmentDraft::new(survey_date.into()),
        }
    }

    pub fn current_step(&self) -> AssessmentStep {
        AssessmentStep::ALL[self.position]
    }

    pub fn is_last_step(&self) -> bool {
        self.position == AssessmentStep::ALL.len() - 1
    }

    pub fn survey_date(&self) -> &str {
        &self.draft.survey_date
    }

    /// Store the current step's answers and advance
    ///
    /// The answers must belong to the current step; range validation happens
    /// here so a step never completes with out-of-scale values.
    pub fn complete_step(&mut self, answers: StepAnswers) -> Result<StepTransition> {
        match (self.current_step(), answers) {
            (AssessmentStep::Intro, StepAnswers::Intro) => {}
            (AssessmentStep::Attitude, StepAnswers::Attitude(a)) => {
                a.validate()?;
                self.draft.attitude = Some(a);
            }
            (AssessmentStep::Frequency, StepAnswers::Frequency(f)) => {
                f.validate()?;
                self.draft.frequency = Some(f);
            }
            (AssessmentStep::Knowledge, StepAnswers::Knowledge(k)) => {
                self.draft.knowledge = Some(k);
            }
            (step, _) => {
                return Err(Error::validation(format!(
                    "Answers do not match the current step ({})",
                    step.title()
                )));
            }
        }

        if self.is_last_step() {
            Ok(StepTransition::Finished)
        } else {
            self.position += 1;
            Ok(StepTransition::Advanced(self.current_step()))
        }
    }

    /// Step back to the preceding step, keeping all collected answers
    ///
    /// Returns the new current step, or `None` when already on the first step.
    pub fn go_back(&mut self) -> Option<AssessmentStep> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        Some(self.current_step())
    }

    /// Hand over the finished draft for submission
    ///
    /// Only valid once every questionnaire step has answers; the intro does
    /// not count.
    pub fn finish(self) -> Result<AssessmentDraft> {
        if self.draft.attitude.is_none()
            || self.draft.frequency.is_none()
            || self.draft.knowledge.is_none()
        {
            return Err(Error::validation(
                "All three questionnaires must be completed before submitting",
            ));
        }
        Ok(self.draft)
    }
}
