//! Static reference data: the country list and the holiday labels.

use rand::Rng;

use holicard_types::holiday::HolidayKind;

/// Countries offered by the random pickers, in display order.
pub const COUNTRIES: &[&str] = &[
    "Argentina",
    "Australia",
    "Austria",
    "Brazil",
    "Bulgaria",
    "Canada",
    "Chile",
    "China",
    "Colombia",
    "Czech Republic",
    "Denmark",
    "Egypt",
    "Ethiopia",
    "Finland",
    "France",
    "Georgia",
    "Germany",
    "Ghana",
    "Greece",
    "Iceland",
    "India",
    "Ireland",
    "Italy",
    "Japan",
    "Kenya",
    "Mexico",
    "Netherlands",
    "New Zealand",
    "Norway",
    "Peru",
    "Philippines",
    "Poland",
    "Portugal",
    "Russia",
    "South Africa",
    "South Korea",
    "Spain",
    "Sweden",
    "Switzerland",
    "Thailand",
    "Ukraine",
    "United Kingdom",
    "United States",
    "Venezuela",
    "Vietnam",
];

/// Symbolic holiday names mapped to their display labels.
pub fn holiday_labels() -> [(&'static str, &'static str); 2] {
    HolidayKind::ALL.map(|kind| (kind.slug(), kind.label()))
}

pub fn random_country<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    COUNTRIES[rng.random_range(0..COUNTRIES.len())]
}

pub fn random_holiday<R: Rng + ?Sized>(rng: &mut R) -> HolidayKind {
    HolidayKind::ALL[rng.random_range(0..HolidayKind::ALL.len())]
}
