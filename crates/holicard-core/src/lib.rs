//! Business logic and port trait definitions for Holicard.
//!
//! This crate defines the "ports" (cache store, text generator, image
//! search, chat transport) that the infrastructure layer implements, plus
//! the logic that drives them: cache-backed card generation and the
//! per-session conversation flow. It depends only on `holicard-types` --
//! never on `holicard-infra` or any database/HTTP crate.

pub mod card;
pub mod flow;
pub mod image;
pub mod llm;
pub mod reference;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
