//! Local terminal chat (`holicard chat`).
//!
//! Runs the same flow controller as the Telegram bot against a
//! [`TerminalTransport`], one event at a time.

pub mod input;
pub mod transport;

use console::style;

use holicard_types::chat::{Command, EventKind, InboundEvent};

use crate::state::AppState;

use self::input::{ChatInput, InputEvent};
use self::transport::{LOCAL_SESSION, TerminalTransport};

/// Run the interactive chat until `/exit` or Ctrl+D.
pub async fn run_chat(state: &AppState) -> anyhow::Result<()> {
    state.warn_missing_credentials();

    let controller = state.controller(TerminalTransport::new())?;

    println!();
    println!(
        "  {}",
        style("Type a command, a number to press a button, or a country name. /exit quits.").dim()
    );

    controller
        .handle_event(InboundEvent::command(LOCAL_SESSION, Command::Start))
        .await;
    controller.transport().settle();

    let (mut chat_input, _writer) = ChatInput::new("you> ".to_string())
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let event = match chat_input.read_line().await {
            InputEvent::Exit => break,
            InputEvent::Empty => continue,
            InputEvent::Unknown(cmd) => {
                println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(cmd).dim()
                );
                continue;
            }
            InputEvent::Command(command) => InboundEvent::command(LOCAL_SESSION, command),
            InputEvent::Choice(n) => match choice_event(controller.transport(), n) {
                Some(event) => event,
                None => InboundEvent::text(LOCAL_SESSION, n.to_string()),
            },
            InputEvent::Text(text) => InboundEvent::text(LOCAL_SESSION, text),
        };

        controller.handle_event(event).await;
        controller.transport().settle();
    }

    chat_input.flush();
    println!("\n  {}", style("Bye!").dim());
    Ok(())
}

/// Button press for the `n`-th option of the latest keyboard.
fn choice_event(transport: &TerminalTransport, n: usize) -> Option<InboundEvent> {
    let offered = transport.offered()?;
    let action = offered.choose(n)?;
    Some(InboundEvent {
        session: LOCAL_SESSION,
        kind: EventKind::Button {
            action,
            callback_id: None,
            origin: Some(offered.message),
        },
    })
}
