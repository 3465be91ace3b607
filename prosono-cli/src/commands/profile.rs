//! Profile command - partial profile updates

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use prosono_core::domain::date;
use prosono_core::{Gender, UserUpdate};

use super::{get_context, require_session, with_spinner};

pub struct ProfileArgs {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub school: Option<String>,
    pub school_year: Option<u8>,
}

pub async fn run(args: ProfileArgs) -> Result<()> {
    let ctx = get_context()?;
    require_session(&ctx)?;

    let birth_date = match args.birth_date {
        Some(display) => {
            date::validate_display_date(&display)?;
            Some(
                NaiveDate::parse_from_str(&date::to_wire_date(&display), "%Y-%m-%d")
                    .context("Birth date is not a real calendar date")?,
            )
        }
        None => None,
    };

    let gender = match args.gender.as_deref() {
        Some(value) => Some(parse_gender(value)?),
        None => None,
    };

    let update = UserUpdate {
        first_name: args.first_name,
        last_name: args.last_name,
        birth_date,
        gender,
        school: args.school,
        school_year: args.school_year,
    };

    if update.is_empty() {
        anyhow::bail!(
            "Nothing to update. Pass at least one field, e.g. --school 'Escola Nova'."
        );
    }

    let user = with_spinner(
        "Updating profile...",
        ctx.auth_service.update_profile(&update),
    )
    .await?;

    println!(
        "{} Profile updated for {} {}",
        "Success!".green(),
        user.first_name,
        user.last_name
    );
    Ok(())
}

fn parse_gender(value: &str) -> Result<Gender> {
    match value.to_uppercase().as_str() {
        "M" | "MALE" => Ok(Gender::Male),
        "F" | "FEMALE" => Ok(Gender::Female),
        "O" | "OTHER" => Ok(Gender::Other),
        other => anyhow::bail!("Unknown gender: {}. Use M, F or O.", other),
    }
}
