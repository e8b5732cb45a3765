//! User-facing texts and keyboards of the conversation.

use holicard_types::card::CacheStats;
use holicard_types::chat::{Button, ButtonAction, Keyboard};
use holicard_types::holiday::{CardKey, HolidayKind};

use super::state::Hint;

pub const WELCOME: &str = "\
🎄 Hi! I'm the Holiday Traditions Bot!

I'll show you how Christmas and New Year are celebrated around the world.

📋 Commands:
/holiday - Random country and holiday
/christmas - Christmas traditions in a random country
/newyear - New Year traditions in a random country
/custom - Choose the country yourself
/another - Same holiday, another country
/stats - Cache statistics

✨ Every card covers:
- Traditional attire
- Customs and food
- A film to watch
- A song or piece of music
- A tip for trying the tradition at home
- Festive photos

Try /holiday right now!";

pub const CHOOSE_METHOD: &str = "How should we pick the country?";

pub const TYPE_COUNTRY: &str = "Type the name of a country:\n\nFor example: Japan, France, Brazil";

pub const GENERIC_ERROR: &str = "Something went wrong while handling your request. Please try again.";

/// Transient message shown while a card is being prepared.
pub fn working(key: &CardKey) -> String {
    format!("Generating info about {} in {}...", key.holiday.label(), key.country)
}

pub fn holiday_offer(country: &str, typed: bool) -> String {
    if typed {
        format!("Great! Country selected: {country}\n\nWhich holiday?")
    } else {
        format!("Country selected: {country}\n\nWhich holiday?")
    }
}

pub fn stats(stats: &CacheStats) -> String {
    format!(
        "📊 Cache statistics:\n\n🌍 Countries cached: {}\n📝 Cards stored: {}\n💾 Storage: SQLite\n\nCached cards load instantly!",
        stats.countries, stats.cards
    )
}

pub fn hint(hint: Hint) -> &'static str {
    match hint {
        Hint::StartOver => "That button is no longer active. Use /custom to choose a country.",
        Hint::ChooseMethod => "Please pick one of the options above, or use /custom to start over.",
        Hint::TypeCountry => "Please type a country name.",
        Hint::ChooseHoliday => "Please choose a holiday with the buttons above.",
    }
}

/// "Random country" / "Type a country".
pub fn country_method_keyboard() -> Keyboard {
    Keyboard::column([
        Button::new("🎲 Random country", ButtonAction::RandomCountry),
        Button::new("✍️ Type a country", ButtonAction::TypeCountry),
    ])
}

pub fn holiday_keyboard() -> Keyboard {
    Keyboard::column(HolidayKind::ALL.map(|kind| {
        Button::new(
            format!("{} {}", kind.emoji(), kind.label()),
            ButtonAction::PickHoliday(kind),
        )
    }))
}

/// Controls attached to every rendered card.
pub fn follow_up_keyboard() -> Keyboard {
    Keyboard::column([
        Button::new("🔄 Another country", ButtonAction::Another),
        Button::new("🌍 Choose country", ButtonAction::Custom),
    ])
}
