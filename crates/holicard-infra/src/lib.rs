//! Infrastructure layer for Holicard.
//!
//! Contains implementations of the traits defined in `holicard-core`:
//! SQLite card storage, the OpenAI-compatible text generator, Unsplash
//! image search and the Telegram transport, plus config and credential
//! loading.

pub mod config;
pub mod image;
pub mod llm;
pub mod secret;
pub mod sqlite;
pub mod telegram;
