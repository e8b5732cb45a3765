//! Storage abstractions for Holicard.
//!
//! Defines the card cache trait. Implementations live in holicard-infra.

pub mod card_cache;
