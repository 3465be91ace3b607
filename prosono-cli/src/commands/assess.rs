//! Assess command - the 4-step sleep evaluation wizard
//!
//! intro -> attitude -> frequency -> knowledge, with back navigation that
//! keeps already-collected answers. The final step submits all three
//! questionnaires in one go.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use prosono_core::domain::date;
use prosono_core::{
    AssessmentStep, AssessmentWizard, AttitudeAnswers, FrequencyAnswers, KnowledgeAnswers,
    StepAnswers, StepTransition,
};

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

    let mut wizard = AssessmentWizard::new(survey_date);

    loop {
        print_step_header(&wizard);

        match wizard.current_step() {
            AssessmentStep::Intro => {
                println!("Throughout the ProSono program we ask a few questions about your sleep.");
                println!("This evaluation is three short questionnaires: \"My sleep\",");
                println!("\"Daytime sleepiness scale\" and \"Ideas about sleep\".");
                println!("Assessment date: {}", wizard.survey_date());
                println!();
                if !Confirm::new()
                    .with_prompt("Start the evaluation?")
                    .default(true)
                    .interact()?
                {
                    output::info("Evaluation cancelled.");
                    return Ok(());
                }
                wizard.complete_step(StepAnswers::Intro)?;
            }
            AssessmentStep::Attitude => match prompt_attitude()? {
                Some(answers) => {
                    wizard.complete_step(StepAnswers::Attitude(answers))?;
                }
                None => {
                    wizard.go_back();
                }
            },
            AssessmentStep::Frequency => match prompt_frequency()? {
                Some(answers) => {
                    wizard.complete_step(StepAnswers::Frequency(answers))?;
                }
                None => {
                    wizard.go_back();
                }
            },
            AssessmentStep::Knowledge => match prompt_knowledge()? {
                Some(answers) => {
                    if wizard.complete_step(StepAnswers::Knowledge(answers))?
                        == StepTransition::Finished
                    {
                        break;
                    }
                }
                None => {
                    wizard.go_back();
                }
            },
        }
    }

    let draft = wizard.finish()?;
    let outcome = with_spinner(
        "Submitting your answers...",
        ctx.assessment_service.submit(&draft),
    )
    .await?;

    println!();
    if outcome.is_partial() {
        output::warning(&outcome.message);
    } else {
        output::success(&outcome.message);
    }
    println!("Run 'prosono status' to see your updated dashboard.");
    Ok(())
}

fn print_step_header(wizard: &AssessmentWizard) {
    let step = wizard.current_step();
    println!();
    println!(
        "{}",
        format!(
            "Step {} of {} - {}",
            step.position() + 1,
            AssessmentStep::ALL.len(),
            step.title()
        )
        .bold()
    );
    println!();
}

/// Offer the choice between answering this questionnaire and stepping back.
/// `Ok(false)` means "go back one step".
fn begin_or_back() -> Result<bool> {
    let choice = Select::new()
        .items(&["Answer this questionnaire", "Go back one step"])
        .default(0)
        .interact()?;
    Ok(choice == 0)
}

/// Ask one 0..=max scale question
fn scale_question(text: &str, max: u8) -> Result<u8> {
    let answer = Input::<u8>::new()
        .with_prompt(format!("{text} [0-{max}]"))
        .validate_with(move |value: &u8| -> Result<(), String> {
            if *value <= max {
                Ok(())
            } else {
                Err(format!("Answer must be between 0 and {max}"))
            }
        })
        .interact_text()?;
    Ok(answer)
}

/// Ask one true/false statement
fn statement_question(text: &str) -> Result<bool> {
    let choice = Select::new()
        .with_prompt(text)
        .items(&["True", "False"])
        .default(0)
        .interact()?;
    Ok(choice == 0)
}

fn prompt_attitude() -> Result<Option<AttitudeAnswers>> {
    if !begin_or_back()? {
        return Ok(None);
    }
    println!("Four quick questions about how you feel about sleep.");
    println!();

    Ok(Some(AttitudeAnswers {
        sleep_well_or_poorly: scale_question(
            "Do I sleep poorly or well? (0 = very poorly, 10 = very well)",
            10,
        )?,
        enjoy_sleeping: scale_question("Do I like sleeping? (0 = not at all, 10 = very much)", 10)?,
        sleep_is_important: scale_question(
            "Is sleep important to me? (0 = not at all, 10 = very important)",
            10,
        )?,
        sleep_self_knowledge: scale_question(
            "How much do I know about sleep? (0 = nothing, 10 = a lot)",
            10,
        )?,
    }))
}

fn prompt_frequency() -> Result<Option<FrequencyAnswers>> {
    if !begin_or_back()? {
        return Ok(None);
    }
    println!("How often does each situation happen to you?");
    println!("0 = never, 1 = rarely, 2 = sometimes, 3 = often, 4 = always");
    println!();

    Ok(Some(FrequencyAnswers {
        doze_in_morning_classes: scale_question("I fall asleep during morning classes", 4)?,
        last_school_day_without_fatigue: scale_question(
            "I can get through the whole school day without feeling tired",
            4,
        )?,
        doze_in_last_class: scale_question("I fall asleep in the last class of the day", 4)?,
        drowsy_in_car_five_minutes: scale_question(
            "I get sleepy in a car ride longer than 5 minutes",
            4,
        )?,
        wide_awake_all_day: scale_question("I stay wide awake the whole day", 4)?,
        doze_in_afternoon_classes: scale_question(
            "I fall asleep in afternoon classes at school",
            4,
        )?,
        alert_during_classes: scale_question("I feel alert during classes", 4)?,
        drowsy_after_school_day: scale_question(
            "I feel sleepy at the end of the day, after classes",
            4,
        )?,
        drowsy_on_bus_to_activity: scale_question(
            "I feel sleepy on the bus to a school activity",
            4,
        )?,
        doze_at_school_mornings: scale_question(
            "In the morning, when I am at school, I fall asleep",
            4,
        )?,
        alert_in_classes: scale_question("When I am in class I feel wide awake", 4)?,
        drowsy_during_evening_homework: scale_question(
            "I feel sleepy when doing homework in the evening",
            4,
        )?,
        alert_in_last_class: scale_question("I am wide awake in the last class of the day", 4)?,
        doze_on_transport: scale_question("I fall asleep when riding a car, bus or train", 4)?,
        dozed_off_at_school: scale_question(
            "During the school day there were moments when I actually fell asleep",
            4,
        )?,
        doze_during_evening_homework: scale_question(
            "I fall asleep doing homework at night at home",
            4,
        )?,
    }))
}

fn prompt_knowledge() -> Result<Option<KnowledgeAnswers>> {
    if !begin_or_back()? {
        return Ok(None);
    }
    println!("Mark each statement true or false.");
    println!();

    Ok(Some(KnowledgeAnswers {
        short_sleep_causes_irritability: statement_question(
            "Sleeping too little makes people aggressive and irritable",
        )?,
        falling_asleep_raises_body_temperature: statement_question(
            "Falling asleep raises the body's temperature",
        )?,
        bedtime_does_not_affect_quality: statement_question(
            "The time you go to bed does not influence sleep quality",
        )?,
        evening_computer_harms_sleep: statement_question(
            "Using the computer at night harms sleep",
        )?,
        teens_need_eight_hours: statement_question(
            "Teenagers should sleep around 8 hours per night",
        )?,
        concentration_independent_of_sleep: statement_question(
            "Concentration does not depend on sleep",
        )?,
        sleep_without_brain_activity: statement_question(
            "There is no brain activity during sleep",
        )?,
        day_or_night_sleep_equivalent: statement_question(
            "Sleeping during the day or at night makes no difference",
        )?,
        heavy_meals_harm_sleep: statement_question(
            "Eating a lot right before bed harms sleep",
        )?,
        night_messaging_harms_sleep: statement_question(
            "Exchanging messages late at night harms sleep",
        )?,
        short_sleep_increases_illness: statement_question(
            "Sleeping too little increases the risk of illness",
        )?,
        late_study_as_effective_as_daytime: statement_question(
            "Studying late at night is as effective as studying during the day",
        )?,
        bright_light_alters_rhythm: statement_question(
            "A lot of light at night alters the body's rhythm",
        )?,
        exercise_helps_falling_asleep: statement_question(
            "Physical effort helps you fall asleep",
        )?,
        lost_sleep_recovered_next_night: statement_question(
            "Lost sleep can be fully recovered the next night",
        )?,
        insufficient_sleep_causes_weight_gain: statement_question(
            "Insufficient sleep can make you gain weight",
        )?,
        naps_do_not_affect_night_sleep: statement_question(
            "An afternoon nap does not affect night sleep",
        )?,
        sunlight_helps_sleep: statement_question("Sunlight helps you sleep well")?,
        short_sleep_increases_accidents: statement_question(
            "Sleeping too little increases the risk of accidents",
        )?,
        several_sleep_stages_per_night: statement_question(
            "There are several types of sleep during the night",
        )?,
    }))
}
