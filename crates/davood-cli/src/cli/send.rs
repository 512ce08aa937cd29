//! One-shot `davood send`: restore context, send a single message, print
//! the reply.

use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;

use davood_core::chat::session::{RejectReason, SubmitOutcome};

use super::command_view;
use crate::state::AppState;

pub async fn send_message(
    state: &AppState,
    message: &str,
    no_context: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let view = command_view(json, quiet);
    let session = state.build_session(view).await?;
    let restored = session.restore().await?;
    tracing::debug!(restored, "Transcript restored for one-shot send");

    // The process exits right after the reply, which would cut speech off.
    session.adjust_settings(|settings| {
        settings.voice_enabled = false;
        if no_context {
            settings.include_context = false;
        }
    });

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("Interrupted, cancelling request");
                cancel.cancel();
            }
        })
    };

    let outcome = session.submit(message, &cancel).await;
    interrupt.abort();

    match outcome {
        SubmitOutcome::Rejected(RejectReason::Empty) => bail!("Message is empty"),
        SubmitOutcome::Rejected(RejectReason::Busy) => bail!("Another message is in progress"),
        SubmitOutcome::Replied(sent) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&sent)?);
            }
        }
        SubmitOutcome::Failed(error) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({"success": false, "error": error})
                );
            }
            bail!("Failed to complete exchange: {error}");
        }
    }
    Ok(())
}
