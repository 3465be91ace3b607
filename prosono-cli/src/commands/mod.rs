//! CLI command implementations

pub mod assess;
pub mod login;
pub mod logout;
pub mod profile;
pub mod refresh;
pub mod register;
pub mod sleep;
pub mod status;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use prosono_core::ProsonoContext;

/// Get the prosono directory from environment or default
pub fn get_prosono_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PROSONO_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".prosono")
    }
}

/// Get or create the prosono context
pub fn get_context() -> Result<ProsonoContext> {
    let prosono_dir = get_prosono_dir();

    std::fs::create_dir_all(&prosono_dir)
        .with_context(|| format!("Failed to create prosono directory: {:?}", prosono_dir))?;

    ProsonoContext::new(&prosono_dir).context("Failed to initialize prosono context")
}

/// Run an operation behind a terminal spinner
///
/// Every submit path shows one for the duration of the request.
pub async fn with_spinner<T>(message: &str, operation: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = operation.await;
    spinner.finish_and_clear();
    result
}

/// Bail with a consistent message when no session is stored
pub fn require_session(ctx: &ProsonoContext) -> Result<()> {
    if !ctx.auth_service.is_authenticated() {
        anyhow::bail!("Not logged in. Run 'prosono login' first.");
    }
    Ok(())
}
