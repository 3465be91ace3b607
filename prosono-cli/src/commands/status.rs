//! Status command - the dashboard: profile, program phase and statistics

use anyhow::Result;
use colored::Colorize;
use prosono_core::{User, UserStatus};

use super::{get_context, require_session, with_spinner};
use crate::output::{self, format_clock, format_duration};

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_session(&ctx)?;

    with_spinner("Loading dashboard...", ctx.auth_service.initialize()).await;

    let user = match ctx.auth_service.current_user() {
        Some(user) => user,
        None => anyhow::bail!("Session expired. Run 'prosono login' again."),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    print_profile(&user);
    print_daily_statistics(&user);
    print_evaluations(&user);

    Ok(())
}

fn phase_label(status: UserStatus) -> &'static str {
    match status {
        UserStatus::PreEvaluation => "Initial evaluation pending - run 'prosono assess'",
        UserStatus::SleepTracking => "Sleep tracking - log nights with 'prosono sleep'",
        UserStatus::PostEvaluation => "Final evaluation pending - run 'prosono assess'",
        UserStatus::SleepRelationship => "Sleep relationship module",
    }
}

fn print_profile(user: &User) {
    println!("{}", "ProSono Dashboard".bold());
    println!();
    println!(
        "  {} {} {}",
        "Participant:".cyan(),
        user.first_name,
        user.last_name
    );
    println!("  {} {}", "Email:".cyan(), user.email);
    if let Some(school) = &user.school {
        match user.school_year {
            Some(year) => println!("  {} {} (year {})", "School:".cyan(), school, year),
            None => println!("  {} {}", "School:".cyan(), school),
        }
    }
    println!("  {} {}", "Phase:".cyan(), phase_label(user.status));
    println!();
}

fn print_daily_statistics(user: &User) {
    let Some(summary) = &user.daily_surveys else {
        output::info("No sleep log statistics yet. Record a night with 'prosono sleep'.");
        println!();
        return;
    };

    println!("{}", "Sleep log".bold());
    println!(
        "  {} of {} nights logged, current streak {}",
        summary.dates.len(),
        summary.target,
        summary.streak
    );
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Metric", "Last 7 days", "Last 15 days", "Last 30 days"]);
    add_metric_row(&mut table, "Sleep duration", &summary.mean_sleep_duration, format_duration);
    add_metric_row(&mut table, "Wake-up time", &summary.mean_wake_time, format_clock);
    add_metric_row(&mut table, "Bedtime", &summary.mean_bedtime, format_clock);
    add_metric_row(&mut table, "Time to fall asleep", &summary.mean_time_to_sleep, |m| {
        format!("{:.0} min", m)
    });
    add_metric_row(&mut table, "Night awakenings", &summary.mean_night_awakenings, |m| {
        format!("{:.1}", m)
    });
    add_metric_row(&mut table, "Sleep quality (0-5)", &summary.mean_sleep_quality, |m| {
        format!("{:.1}", m)
    });
    println!("{}", table);
    println!();
}

fn add_metric_row(
    table: &mut comfy_table::Table,
    label: &str,
    metrics: &prosono_core::domain::MeanMetrics,
    format: impl Fn(f64) -> String,
) {
    let cell = |value: Option<f64>| value.map(&format).unwrap_or_else(|| "-".to_string());
    table.add_row(vec![
        label.to_string(),
        cell(metrics.last7_days),
        cell(metrics.last15_days),
        cell(metrics.last30_days),
    ]);
}

fn print_evaluations(user: &User) {
    let Some(surveys) = &user.evaluation_surveys else {
        return;
    };
    if surveys.is_empty() {
        return;
    }

    println!("{}", "Evaluations".bold());
    let mut table = output::create_table();
    table.set_header(vec!["Date", "Knowledge score", "Sleepiness mean"]);
    for survey in surveys {
        let cleveland = survey
            .cleveland_mean
            .map(|m| format!("{:.2}", m))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            survey.date.format("%d-%m-%Y").to_string(),
            survey.score.to_string(),
            cleveland,
        ]);
    }
    println!("{}", table);
}
