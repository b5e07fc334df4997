use datebook_client::SyncLoop;
use tokio::sync::broadcast::error::RecvError;

use crate::context::CliContext;
use crate::output;

pub async fn handle(ctx: &CliContext, interval: Option<u64>) -> anyhow::Result<()> {
    let mut settings = ctx.config.sync.clone();
    if let Some(secs) = interval {
        settings.events_interval_secs = secs;
    }

    let handle = SyncLoop::spawn(ctx.store.clone(), settings);
    let mut updates = handle.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = updates.recv() => match update {
                Ok(update) => {
                    output::output_line(&update);
                    if !ctx.store.is_signed_in() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} sync updates", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    handle.shutdown().await;

    if ctx.store.needs_login() {
        anyhow::bail!("Session expired; sign in again");
    }
    Ok(())
}
