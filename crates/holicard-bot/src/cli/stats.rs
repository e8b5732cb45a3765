//! Cache statistics command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Print how many countries and cards are cached.
pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.card_service().stats().await?;

    if json {
        let out = serde_json::json!({
            "countries": stats.countries,
            "cards": stats.cards,
            "database": state.data_dir.join(holicard_infra::sqlite::pool::DATABASE_FILE).display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} Cache statistics", style("📊").bold());
    println!();
    println!("  Countries cached: {}", style(stats.countries).bold());
    println!("  Cards stored:     {}", style(stats.cards).bold());
    println!(
        "  Database:         {}",
        style(state.data_dir.join(holicard_infra::sqlite::pool::DATABASE_FILE).display()).dim()
    );
    println!();

    Ok(())
}
