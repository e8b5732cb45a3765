//! Telegram Bot API wire types.
//!
//! Only the fields the bot reads or writes are modelled; unknown fields are
//! ignored by serde.

use serde::{Deserialize, Serialize};

use holicard_types::chat::Keyboard;

/// Envelope around every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|button| InlineKeyboardButton {
                            text: button.label.clone(),
                            callback_data: button.action.payload().to_string(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InputMediaPhoto<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media: &'a str,
}

impl<'a> InputMediaPhoto<'a> {
    pub fn new(url: &'a str) -> Self {
        Self {
            kind: "photo",
            media: url,
        }
    }
}
