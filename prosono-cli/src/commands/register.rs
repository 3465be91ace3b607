//! Register command - create a new participant account
//!
//! Registration never logs the participant in; a dedicated success screen
//! points at the login command instead.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dialoguer::{Input, Password, Select};
use prosono_core::domain::date;
use prosono_core::{Gender, RegisterData};

use super::{get_context, with_spinner};
use crate::output;

pub async fn run() -> Result<()> {
    let ctx = get_context()?;

    let email: String = Input::new().with_prompt("Email").interact_text()?;

    let password = Password::new()
        .with_prompt("Password (at least 8 characters)")
        .interact()?;
    let confirmation = Password::new().with_prompt("Confirm password").interact()?;
    if password != confirmation {
        anyhow::bail!("Passwords do not match");
    }

    let first_name: String = Input::new().with_prompt("First name").interact_text()?;
    let last_name: String = Input::new().with_prompt("Last name").interact_text()?;
    let birth_date = prompt_birth_date()?;

    let gender_options = ["Male", "Female", "Other", "Prefer not to say"];
    let gender = match Select::new()
        .with_prompt("Gender")
        .items(&gender_options)
        .default(3)
        .interact()?
    {
        0 => Some(Gender::Male),
        1 => Some(Gender::Female),
        2 => Some(Gender::Other),
        _ => None,
    };

    let school: String = Input::new()
        .with_prompt("School (optional)")
        .allow_empty(true)
        .interact_text()?;
    let school = if school.trim().is_empty() {
        None
    } else {
        Some(school.trim().to_string())
    };

    let school_year: String = Input::new()
        .with_prompt("School year, 10-12 (optional)")
        .allow_empty(true)
        .interact_text()?;
    let school_year = if school_year.trim().is_empty() {
        None
    } else {
        Some(
            school_year
                .trim()
                .parse::<u8>()
                .context("School year must be a number")?,
        )
    };

    let data = RegisterData {
        email,
        password,
        first_name,
        last_name,
        birth_date,
        gender,
        school,
        school_year,
    };

    if let Err(e) = with_spinner("Creating account...", ctx.auth_service.register(&data)).await {
        if e.is_conflict() {
            anyhow::bail!("That email is already registered");
        }
        return Err(e.into());
    }

    // No session exists yet, so show a success screen instead of a dashboard
    println!();
    output::success("Account created successfully!");
    println!("You can now log in with 'prosono login'.");
    Ok(())
}

fn prompt_birth_date() -> Result<NaiveDate> {
    let display: String = Input::new()
        .with_prompt("Birth date (DD-MM-YYYY)")
        .validate_with(|input: &String| -> Result<(), String> {
            date::validate_display_date(input).map_err(|e| e.to_string())
        })
        .interact_text()?;

    NaiveDate::parse_from_str(&date::to_wire_date(&display), "%Y-%m-%d")
        .context("Birth date is not a real calendar date")
}
