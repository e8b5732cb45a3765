//! Conversation flow: per-session state machine, the controller that
//! carries out its effects, and the dispatcher that serializes events
//! per session.

pub mod controller;
pub mod dispatcher;
pub mod replies;
pub mod state;
pub mod transport;

use holicard_types::error::{RepositoryError, TransportError};
use thiserror::Error;

/// Errors that abort handling of a single event.
///
/// Generator and image failures never show up here; they degrade inside
/// the card service and the image finder.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("card cache error: {0}")]
    Cache(#[from] RepositoryError),

    #[error("chat transport error: {0}")]
    Transport(#[from] TransportError),
}
