//! Refresh command - explicit token refresh

use anyhow::Result;

use super::{get_context, with_spinner};
use crate::output;

pub async fn run() -> Result<()> {
    let ctx = get_context()?;

    match with_spinner("Refreshing session...", ctx.auth_service.refresh_token()).await {
        Ok(()) => {
            output::success("Session refreshed.");
            Ok(())
        }
        Err(e) => {
            // Session state is already cleared at this point
            anyhow::bail!("Could not refresh the session ({e}). Run 'prosono login' again.");
        }
    }
}
