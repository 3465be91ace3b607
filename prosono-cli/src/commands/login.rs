//! Login command - exchange credentials for a session

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use prosono_core::LoginCredentials;

use super::{get_context, with_spinner};

pub async fn run(email: Option<String>) -> Result<()> {
    let ctx = get_context()?;

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    let password = if atty::isnt(atty::Stream::Stdin) {
        // Allow piping the password in for scripted use
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        line.trim_end().to_string()
    } else {
        Password::new().with_prompt("Password").interact()?
    };

    let credentials = LoginCredentials { email, password };
    with_spinner("Logging in...", ctx.auth_service.login(&credentials)).await?;

    println!("{} Logged in as {}", "Success!".green(), credentials.email);
    println!("Run 'prosono status' to see your dashboard.");
    Ok(())
}
