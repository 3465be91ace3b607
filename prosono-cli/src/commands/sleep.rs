//! Sleep command - record last night's sleep
//!
//! The date names the morning you woke up; all answers refer to the night
//! before it. Picking a different date mid-form starts the draft over so
//! answers never leak between nights.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use prosono_core::domain::date;
use prosono_core::DailySurveyDraft;

use super::{get_context, require_session, with_spinner};
use crate::output;

pub async fn run(date_arg: Option<String>) -> Result<()> {
    let ctx = get_context()?;
    require_session(&ctx)?;

    let survey_date = match date_arg {
        Some(display) => {
            date::validate_display_date(&display)?;
            display
        }
        None => date::today_display(),
    };

    println!("How did you sleep? Answers are for the night before {survey_date}.");
    println!();

    let mut draft = DailySurveyDraft::for_date(survey_date);

    if !Confirm::new()
        .with_prompt(format!("Log the night of {}?", draft.survey_date))
        .default(true)
        .interact()?
    {
        let new_date = prompt_date()?;
        // A new date means a fresh draft; nothing entered so far carries over
        draft.change_date(new_date);
    }

    draft.wake_time = time_question("What time did you get up this morning?")?;
    draft.bedtime = time_question("What time did you go to bed last night?")?;
    draft.minutes_to_fall_asleep = Input::new()
        .with_prompt("How long did it take you to fall asleep? (minutes)")
        .default(0)
        .interact_text()?;
    draft.night_awakenings = Input::new()
        .with_prompt("How many times did you wake up during the night?")
        .default(0)
        .interact_text()?;
    draft.sleep_duration = time_question("How long do you think you slept? (e.g. 08:30)")?;

    let quality_labels = [
        "0 - Very bad",
        "1 - Bad",
        "2 - Fair",
        "3 - Good",
        "4 - Very good",
        "5 - Excellent",
    ];
    draft.sleep_quality = Select::new()
        .with_prompt("How was your sleep last night?")
        .items(&quality_labels)
        .default(3)
        .interact()? as u8;

    draft.note = Input::new()
        .with_prompt("Any notes about last night? (optional)")
        .allow_empty(true)
        .interact_text()?;

    with_spinner("Saving sleep data...", ctx.daily_survey_service.submit(&draft)).await?;

    println!();
    output::success("Sleep data saved.");
    println!("Run 'prosono status' to see your updated statistics.");
    Ok(())
}

fn prompt_date() -> Result<String> {
    let display: String = Input::new()
        .with_prompt("Which morning is this for? (DD-MM-YYYY)")
        .validate_with(|input: &String| -> Result<(), String> {
            date::validate_display_date(input).map_err(|e| e.to_string())
        })
        .interact_text()?;
    Ok(display)
}

fn time_question(text: &str) -> Result<String> {
    let time: String = Input::new()
        .with_prompt(format!("{text} (HH:MM)"))
        .validate_with(|input: &String| -> Result<(), String> {
            match date::normalize_time(input) {
                Some(_) => Ok(()),
                None => Err("Use HH:MM (00:00 to 23:59)".to_string()),
            }
        })
        .interact_text()?;
    Ok(time)
}
