//! Async readline input for the terminal chat.
//!
//! Wraps `rustyline_async::Readline` and classifies each line as a
//! command, a numbered choice or free text.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

use holicard_types::chat::Command;

/// Events produced by the input handler.
#[derive(Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A bot command such as `/holiday`.
    Command(Command),
    /// A number, picking one of the offered buttons.
    Choice(usize),
    /// Anything else (a typed country name).
    Text(String),
    /// `/exit`, `/quit`, Ctrl+D or Ctrl+C.
    Exit,
    /// A `/word` that is not a known command.
    Unknown(String),
    Empty,
}

/// Classify one input line.
pub fn classify(line: &str) -> InputEvent {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputEvent::Empty;
    }

    if trimmed.starts_with('/') {
        if matches!(trimmed, "/exit" | "/quit") {
            return InputEvent::Exit;
        }
        return match Command::parse(trimmed) {
            Some(command) => InputEvent::Command(command),
            None => InputEvent::Unknown(trimmed.to_string()),
        };
    }

    match trimmed.parse::<usize>() {
        Ok(n) if n > 0 => InputEvent::Choice(n),
        _ => InputEvent::Text(trimmed.to_string()),
    }
}

pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Create the input handler with the given prompt.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt)?;
        Ok((Self { rl }, stdout))
    }

    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let _ = self.rl.add_history_entry(line.clone());
                classify(&line)
            }
            Ok(ReadlineEvent::Eof) | Ok(ReadlineEvent::Interrupted) => InputEvent::Exit,
            Err(_) => InputEvent::Exit,
        }
    }

    /// Restore the terminal before exiting.
    pub fn flush(&mut self) {
        let _ = self.rl.flush();
    }
}
