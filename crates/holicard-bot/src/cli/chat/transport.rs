//! Terminal implementation of [`ChatTransport`].
//!
//! Messages are printed to stdout. A message sent without buttons is shown
//! as a spinner until something else is printed, so the working indicator
//! spins while a card is generated and disappears when it is deleted.
//! Buttons are numbered; the chat loop maps a typed number back to the
//! most recently offered keyboard.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use holicard_core::flow::transport::ChatTransport;
use holicard_types::chat::{ButtonAction, Keyboard, MessageRef, SessionId};
use holicard_types::error::TransportError;

/// The single conversation of a terminal chat.
pub const LOCAL_SESSION: SessionId = SessionId(1);

struct LiveMessage {
    message_id: i64,
    text: String,
    spinner: ProgressBar,
}

/// The most recent keyboard and the message it belongs to.
#[derive(Debug, Clone)]
pub struct OfferedKeyboard {
    pub message: MessageRef,
    pub keyboard: Keyboard,
}

impl OfferedKeyboard {
    /// Action of the `n`-th button (1-based).
    pub fn choose(&self, n: usize) -> Option<ButtonAction> {
        self.keyboard.buttons().nth(n.checked_sub(1)?).map(|b| b.action)
    }
}

#[derive(Default)]
pub struct TerminalTransport {
    next_id: AtomicI64,
    live: Mutex<Option<LiveMessage>>,
    offered: Mutex<Option<OfferedKeyboard>>,
}

impl TerminalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The keyboard a numbered answer refers to.
    pub fn offered(&self) -> Option<OfferedKeyboard> {
        lock(&self.offered).clone()
    }

    /// Print the spinning message, if any, as a regular message.
    pub fn settle(&self) {
        if let Some(live) = lock(&self.live).take() {
            live.spinner.finish_and_clear();
            print_block(&live.text);
        }
    }

    fn next_ref(&self) -> MessageRef {
        MessageRef {
            session: LOCAL_SESSION,
            message_id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }

    fn show(&self, message: MessageRef, text: &str, keyboard: Option<&Keyboard>) {
        self.settle();
        match keyboard {
            Some(keyboard) => {
                print_block(text);
                print_keyboard(keyboard);
                *lock(&self.offered) = Some(OfferedKeyboard {
                    message,
                    keyboard: keyboard.clone(),
                });
            }
            None => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::default_spinner()
                        .template("  {spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                spinner.set_message(text.to_string());
                spinner.enable_steady_tick(Duration::from_millis(80));
                *lock(&self.live) = Some(LiveMessage {
                    message_id: message.message_id,
                    text: text.to_string(),
                    spinner,
                });
            }
        }
    }

    /// Drop the keyboard attached to `message`, if it is the offered one.
    fn retract_keyboard(&self, message: MessageRef) {
        let mut offered = lock(&self.offered);
        if offered.as_ref().is_some_and(|o| o.message == message) {
            *offered = None;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn print_block(text: &str) {
    println!();
    for line in text.lines() {
        println!("  {line}");
    }
}

fn print_keyboard(keyboard: &Keyboard) {
    println!();
    for (i, button) in keyboard.buttons().enumerate() {
        println!("  {} {}", style(format!("[{}]", i + 1)).cyan().bold(), button.label);
    }
}

impl ChatTransport for TerminalTransport {
    async fn send_text(
        &self,
        _session: SessionId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError> {
        let message = self.next_ref();
        self.show(message, text, keyboard);
        Ok(message)
    }

    async fn send_photos(&self, _session: SessionId, urls: &[String]) -> Result<(), TransportError> {
        self.settle();
        println!();
        for url in urls {
            println!("  {} {}", style("📷").bold(), style(url).underlined().blue());
        }
        Ok(())
    }

    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.retract_keyboard(message);

        {
            let live = lock(&self.live);
            if let Some(live) = live.as_ref().filter(|l| l.message_id == message.message_id) {
                if keyboard.is_none() {
                    live.spinner.set_message(text.to_string());
                    return Ok(());
                }
            }
        }

        self.show(message, text, keyboard);
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), TransportError> {
        self.retract_keyboard(message);

        let mut live = lock(&self.live);
        if live.as_ref().is_some_and(|l| l.message_id == message.message_id) {
            if let Some(live) = live.take() {
                live.spinner.finish_and_clear();
            }
        }
        Ok(())
    }

    async fn acknowledge(&self, _callback_id: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holicard_types::chat::Button;
    use holicard_types::holiday::HolidayKind;

    fn keyboard() -> Keyboard {
        Keyboard::column([
            Button::new("Christmas", ButtonAction::PickHoliday(HolidayKind::Christmas)),
            Button::new("New Year", ButtonAction::PickHoliday(HolidayKind::NewYear)),
        ])
    }

    #[tokio::test]
    async fn test_message_ids_increase() {
        let transport = TerminalTransport::new();
        let a = transport.send_text(LOCAL_SESSION, "a", Some(&keyboard())).await.unwrap();
        let b = transport.send_text(LOCAL_SESSION, "b", Some(&keyboard())).await.unwrap();
        assert_eq!(a.message_id, 1);
        assert_eq!(b.message_id, 2);
    }

    #[tokio::test]
    async fn test_numbered_choice_maps_to_latest_keyboard() {
        let transport = TerminalTransport::new();
        let message = transport
            .send_text(LOCAL_SESSION, "Which holiday?", Some(&keyboard()))
            .await
            .unwrap();

        let offered = transport.offered().unwrap();
        assert_eq!(offered.message, message);
        assert_eq!(offered.choose(2), Some(ButtonAction::PickHoliday(HolidayKind::NewYear)));
        assert_eq!(offered.choose(0), None);
        assert_eq!(offered.choose(3), None);
    }

    #[tokio::test]
    async fn test_editing_away_the_keyboard_retracts_it() {
        let transport = TerminalTransport::new();
        let message = transport
            .send_text(LOCAL_SESSION, "Which holiday?", Some(&keyboard()))
            .await
            .unwrap();

        transport.edit_text(message, "Generating...", None).await.unwrap();
        assert!(transport.offered().is_none());
    }

    #[tokio::test]
    async fn test_deleted_indicator_is_not_settled() {
        let transport = TerminalTransport::new();
        let indicator = transport
            .send_text(LOCAL_SESSION, "Generating...", None)
            .await
            .unwrap();
        transport.delete_message(indicator).await.unwrap();

        assert!(lock(&transport.live).is_none());
    }
}
