//! Logout command - clear the stored session

use anyhow::Result;

use super::{get_context, with_spinner};
use crate::output;

pub async fn run() -> Result<()> {
    let ctx = get_context()?;

    // Server-side invalidation is best-effort; local state always clears
    with_spinner("Logging out...", ctx.auth_service.logout()).await;

    output::success("Logged out.");
    Ok(())
}
