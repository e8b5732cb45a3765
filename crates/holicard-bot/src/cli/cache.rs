//! Card cache inspection and maintenance.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use holicard_types::card::CachedCard;

use crate::state::AppState;

/// Longest body preview shown in the table, in characters.
const PREVIEW_CHARS: usize = 60;

/// List every cached card, ordered by country then holiday.
pub async fn list_cards(state: &AppState, json: bool) -> Result<()> {
    let cards = state.card_service().list_cards().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    if cards.is_empty() {
        println!();
        println!(
            "  {} The cache is empty. Cards are stored as they are generated.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Country").fg(Color::White),
        Cell::new("Holiday").fg(Color::White),
        Cell::new("Preview").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for card in &cards {
        table.add_row(vec![
            Cell::new(&card.key.country).fg(Color::Cyan),
            Cell::new(format!("{} {}", card.key.holiday.emoji(), card.key.holiday.label())),
            preview_cell(card),
            Cell::new(card.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} card{}",
        style(cards.len()).bold(),
        if cards.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

fn preview_cell(card: &CachedCard) -> Cell {
    let text = preview(&card.body);
    if card.body.starts_with(holicard_core::card::generator::FAILURE_PREFIX) {
        Cell::new(text).fg(Color::Yellow)
    } else {
        Cell::new(text)
    }
}

/// First line of `body`, cut to [`PREVIEW_CHARS`] characters.
fn preview(body: &str) -> String {
    let first_line = body.lines().find(|l| !l.trim().is_empty()).unwrap_or_default().trim();
    if first_line.chars().count() > PREVIEW_CHARS {
        let cut: String = first_line.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}

/// Delete every cached card, asking first unless `force`.
pub async fn clear_cache(state: &AppState, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} cached cards?",
                style("all").red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let removed = state.card_service().clear().await?;

    if json {
        println!("{}", serde_json::json!({ "cleared": removed }));
    } else {
        println!(
            "  {} Removed {} card{}.",
            style("✓").red().bold(),
            removed,
            if removed == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_uses_first_non_empty_line() {
        assert_eq!(preview("\n  Attire: kimono\nFood: mochi"), "Attire: kimono");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let body = "🎄".repeat(80);
        let p = preview(&body);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_preview_empty_body() {
        assert_eq!(preview(""), "");
    }
}
