//! `holicard serve`: the Telegram bot.
//!
//! Long-polls `getUpdates`, routes each event to its session's worker via
//! [`SessionDispatcher`], and shuts down gracefully on Ctrl+C or SIGTERM,
//! letting in-flight events finish. Before polling it sends one tiny
//! completion so a bad key or model fails at startup, not per card.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use console::style;
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use holicard_core::flow::dispatcher::SessionDispatcher;
use holicard_infra::secret::TELEGRAM_TOKEN_ENV;
use holicard_infra::telegram::TelegramClient;
use holicard_infra::telegram::updates::UpdatePoller;

use crate::cli::check::ensure_generator;
use crate::state::AppState;

const MIN_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

pub async fn serve(state: &AppState, skip_llm_check: bool) -> anyhow::Result<()> {
    let token = state
        .credentials
        .telegram_token
        .as_ref()
        .with_context(|| format!("{TELEGRAM_TOKEN_ENV} is not set"))?;
    let client = TelegramClient::new(SecretString::from(token.expose_secret().to_string()))?;

    let me = client
        .get_me()
        .await
        .context("could not reach the Telegram Bot API, check the token")?;

    state.warn_missing_credentials();

    if skip_llm_check {
        warn!("skipping the text generator check");
    } else {
        let check = ensure_generator(state.card_service().generator()).await?;
        info!(
            provider = %check.provider,
            model = %check.model,
            latency_ms = check.latency.as_millis() as u64,
            "text generator is reachable"
        );
    }

    let controller = state.controller(client)?;
    let dispatcher = SessionDispatcher::new(Arc::new(controller));

    println!(
        "  {} Holicard bot running as {}",
        style("🎄").bold(),
        style(format!("@{}", me.username.as_deref().unwrap_or("unknown"))).cyan()
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());
    info!(bot_id = me.id, "polling for updates");

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    let mut poller = UpdatePoller::new();
    let mut backoff = MIN_BACKOFF;

    loop {
        let batch = tokio::select! {
            _ = cancel.cancelled() => break,
            batch = poller.next_batch(dispatcher.handler().transport()) => batch,
        };

        match batch {
            Ok(events) => {
                backoff = MIN_BACKOFF;
                for event in events {
                    if let Err(e) = dispatcher.dispatch(event) {
                        warn!(error = %e, "dropping event");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, retry_in = ?backoff, "failed to fetch updates");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }

    info!(
        sessions = dispatcher.active_sessions(),
        offset = poller.offset(),
        "stopping, waiting for in-flight events"
    );
    dispatcher.shutdown().await;
    println!("\n  Bot stopped.");

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
