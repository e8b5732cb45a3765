//! `holicard check`: verify the text generator accepts the configured key
//! and model before real users hit it.

use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;

use holicard_core::card::generator::{CardGenerator, GeneratorCheck};

use crate::state::AppState;

/// Send one tiny completion and report the outcome.
pub async fn check(state: &AppState, json: bool) -> Result<()> {
    let service = state.card_service();
    let generator = service.generator();

    let spinner = (!json).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_message(format!("Asking {}...", generator.provider_name()));
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    });
    let result = ensure_generator(generator).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match (&result, json) {
        (Ok(check), true) => {
            let out = serde_json::json!({
                "ok": true,
                "provider": check.provider,
                "model": check.model,
                "latency_ms": check.latency.as_millis() as u64,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        (Err(e), true) => {
            let out = serde_json::json!({
                "ok": false,
                "provider": generator.provider_name(),
                "error": format!("{e:#}"),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        (Ok(check), false) => {
            println!(
                "\n  {} {} answered with {} in {} ms\n",
                style("✓").green().bold(),
                style(&check.provider).bold(),
                style(&check.model).cyan(),
                check.latency.as_millis()
            );
        }
        (Err(_), false) => {}
    }

    result.map(|_| ())
}

/// Fail with an actionable error when the generator is unusable.
pub async fn ensure_generator(generator: &CardGenerator) -> Result<GeneratorCheck> {
    generator.check().await.with_context(|| {
        format!(
            "text generator '{}' did not answer; check the API key and model, or pass --skip-llm-check",
            generator.provider_name()
        )
    })
}
