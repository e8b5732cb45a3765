//! Conversational surface types: inbound events, commands, buttons, and
//! the keyboards attached to outgoing messages.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::holiday::HolidayKind;

/// Identifies one user conversation (a Telegram chat id, or a fixed id for
/// the local terminal session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a message previously sent by the bot, for later edit/delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub session: SessionId,
    pub message_id: i64,
}

/// Slash commands a user may issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Random country, random holiday.
    Holiday,
    /// Random country, fixed holiday.
    Fixed(HolidayKind),
    /// Last holiday again, new random country.
    Another,
    /// Start the country-selection wizard.
    Custom,
    Stats,
}

impl Command {
    /// Parse a message text as a command.
    ///
    /// Accepts a leading `/`, an optional `@botname` suffix and trailing
    /// arguments (ignored). Returns `None` for non-command text or unknown
    /// commands.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let name = trimmed.strip_prefix('/')?;
        let name = name.split_whitespace().next().unwrap_or_default();
        let name = name.split('@').next().unwrap_or_default().to_lowercase();

        match name.as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "holiday" => Some(Command::Holiday),
            "christmas" => Some(Command::Fixed(HolidayKind::Christmas)),
            "newyear" => Some(Command::Fixed(HolidayKind::NewYear)),
            "another" => Some(Command::Another),
            "custom" => Some(Command::Custom),
            "stats" => Some(Command::Stats),
            _ => None,
        }
    }
}

/// What a button press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Follow-up control: another random country, same holiday.
    Another,
    /// Follow-up control: open the country-selection wizard.
    Custom,
    /// Wizard: let the bot pick the country.
    RandomCountry,
    /// Wizard: the user will type the country.
    TypeCountry,
    /// Wizard: final holiday choice.
    PickHoliday(HolidayKind),
}

impl ButtonAction {
    /// Callback payload carried by the button.
    pub fn payload(&self) -> &'static str {
        match self {
            ButtonAction::Another => "another",
            ButtonAction::Custom => "custom",
            ButtonAction::RandomCountry => "random_country",
            ButtonAction::TypeCountry => "type_country",
            ButtonAction::PickHoliday(HolidayKind::Christmas) => "custom_christmas",
            ButtonAction::PickHoliday(HolidayKind::NewYear) => "custom_newyear",
        }
    }

    pub fn from_payload(payload: &str) -> Option<Self> {
        match payload {
            "another" => Some(ButtonAction::Another),
            "custom" => Some(ButtonAction::Custom),
            "random_country" => Some(ButtonAction::RandomCountry),
            "type_country" => Some(ButtonAction::TypeCountry),
            "custom_christmas" => Some(ButtonAction::PickHoliday(HolidayKind::Christmas)),
            "custom_newyear" => Some(ButtonAction::PickHoliday(HolidayKind::NewYear)),
            _ => None,
        }
    }
}

/// A labeled choice attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn new(label: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// A set of choices, one button per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// One button per row, in the given order.
    pub fn column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Command(Command),
    Button {
        action: ButtonAction,
        /// Transport acknowledgement handle (Telegram callback query id).
        callback_id: Option<String>,
        /// The message the button was attached to.
        origin: Option<MessageRef>,
    },
    Text(String),
}

/// An event delivered by a transport for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub session: SessionId,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn command(session: SessionId, command: Command) -> Self {
        Self {
            session,
            kind: EventKind::Command(command),
        }
    }

    pub fn button(session: SessionId, action: ButtonAction) -> Self {
        Self {
            session,
            kind: EventKind::Button {
                action,
                callback_id: None,
                origin: None,
            },
        }
    }

    pub fn text(session: SessionId, text: impl Into<String>) -> Self {
        Self {
            session,
            kind: EventKind::Text(text.into()),
        }
    }
}
