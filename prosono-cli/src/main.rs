//! ProSono CLI - the sleep-education program in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{assess, login, logout, profile, refresh, register, sleep, status};

/// ProSono - sleep program client
#[derive(Parser)]
#[command(name = "prosono", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the ProSono program
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Create a new participant account
    Register,

    /// Log out and clear the stored session
    Logout,

    /// Exchange the stored refresh token for a new access token
    Refresh,

    /// Show the dashboard: profile, program phase and sleep statistics
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update profile fields (email cannot be changed)
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Birth date (DD-MM-YYYY)
        #[arg(long)]
        birth_date: Option<String>,
        /// M, F or O
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        school: Option<String>,
        /// 10, 11 or 12
        #[arg(long)]
        school_year: Option<u8>,
    },

    /// Run the sleep evaluation (three questionnaires)
    Assess {
        /// Assessment date (DD-MM-YYYY, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Record how you slept last night
    Sleep {
        /// Date of the morning you woke up (DD-MM-YYYY, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email } => login::run(email).await,
        Commands::Register => register::run().await,
        Commands::Logout => logout::run().await,
        Commands::Refresh => refresh::run().await,
        Commands::Status { json } => status::run(json).await,
        Commands::Profile {
            first_name,
            last_name,
            birth_date,
            gender,
            school,
            school_year,
        } => {
            profile::run(profile::ProfileArgs {
                first_name,
                last_name,
                birth_date,
                gender,
                school,
                school_year,
            })
            .await
        }
        Commands::Assess { date } => assess::run(date).await,
        Commands::Sleep { date } => sleep::run(date).await,
    }
}
