//! SQLite storage for the card cache.

pub mod card_cache;
pub mod pool;
