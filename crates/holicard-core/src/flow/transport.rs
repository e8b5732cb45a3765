//! Chat transport trait.
//!
//! The outbound side of a conversational surface. Implementations live in
//! holicard-infra (Telegram) and holicard-bot (terminal).

use holicard_types::chat::{Keyboard, MessageRef, SessionId};
use holicard_types::error::TransportError;

/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ChatTransport: Send + Sync {
    /// Send a text message, optionally with a keyboard of choices.
    fn send_text(
        &self,
        session: SessionId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl std::future::Future<Output = Result<MessageRef, TransportError>> + Send;

    /// Send several photos as one group.
    fn send_photos(
        &self,
        session: SessionId,
        urls: &[String],
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Replace the text (and keyboard) of a previously sent message.
    fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    fn delete_message(
        &self,
        message: MessageRef,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Acknowledge a button press so the client stops its spinner.
    fn acknowledge(
        &self,
        callback_id: &str,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}
