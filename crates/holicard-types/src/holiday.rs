//! Holiday kinds and the (country, holiday) pair that keys the card cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The occasions a card can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayKind {
    Christmas,
    #[serde(rename = "newyear")]
    NewYear,
}

impl HolidayKind {
    /// Every supported holiday, in menu order.
    pub const ALL: [HolidayKind; 2] = [HolidayKind::Christmas, HolidayKind::NewYear];

    /// Stable symbolic name, used as the persisted cache column value
    /// and in button payloads.
    pub fn slug(&self) -> &'static str {
        match self {
            HolidayKind::Christmas => "christmas",
            HolidayKind::NewYear => "newyear",
        }
    }

    /// Label shown to users and passed to the text generator.
    pub fn label(&self) -> &'static str {
        match self {
            HolidayKind::Christmas => "Christmas",
            HolidayKind::NewYear => "New Year",
        }
    }

    /// English name used when building image search queries.
    pub fn english_name(&self) -> &'static str {
        match self {
            HolidayKind::Christmas => "Christmas",
            HolidayKind::NewYear => "New Year",
        }
    }

    /// Emoji used on the holiday-choice buttons.
    pub fn emoji(&self) -> &'static str {
        match self {
            HolidayKind::Christmas => "🎄",
            HolidayKind::NewYear => "🎆",
        }
    }
}

impl fmt::Display for HolidayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for HolidayKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "christmas" => Ok(HolidayKind::Christmas),
            "newyear" | "new_year" | "new-year" => Ok(HolidayKind::NewYear),
            other => Err(format!("invalid holiday kind: '{other}'")),
        }
    }
}

/// A chosen (country, holiday) pair.
///
/// Doubles as the cache key: countries are compared exactly and
/// case-sensitively, with no normalization of spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardKey {
    pub country: String,
    pub holiday: HolidayKind,
}

impl CardKey {
    pub fn new(country: impl Into<String>, holiday: HolidayKind) -> Self {
        Self {
            country: country.into(),
            holiday,
        }
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.holiday.label(), self.country)
    }
}
