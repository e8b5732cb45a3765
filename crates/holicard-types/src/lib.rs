//! Shared domain types for Holicard.
//!
//! This crate contains the core domain types used across the workspace:
//! holiday kinds, cache keys and cached cards, LLM request/response shapes,
//! image search queries, chat events, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod card;
pub mod chat;
pub mod config;
pub mod error;
pub mod holiday;
pub mod image;
pub mod llm;
