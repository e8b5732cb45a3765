//! Long polling and update translation.
//!
//! [`UpdatePoller`] tracks the `getUpdates` offset so each update is
//! delivered once. [`parse_update`] turns a raw update into the
//! transport-neutral [`InboundEvent`].

use holicard_types::chat::{ButtonAction, Command, EventKind, InboundEvent, MessageRef, SessionId};
use holicard_types::error::TransportError;

use super::types::Update;
use super::{LONG_POLL_SECS, TelegramClient};

/// Translate one update. Returns `None` for updates the bot ignores
/// (edits, stickers, unknown commands, unknown button payloads).
pub fn parse_update(update: Update) -> Option<InboundEvent> {
    if let Some(query) = update.callback_query {
        let Some(action) = query.data.as_deref().and_then(ButtonAction::from_payload) else {
            tracing::debug!(data = ?query.data, "ignoring unknown button payload");
            return None;
        };

        let origin = query.message.as_ref().map(|m| MessageRef {
            session: SessionId(m.chat.id),
            message_id: m.message_id,
        });
        let session = origin
            .map(|o| o.session)
            .unwrap_or(SessionId(query.from.id));

        return Some(InboundEvent {
            session,
            kind: EventKind::Button {
                action,
                callback_id: Some(query.id),
                origin,
            },
        });
    }

    let message = update.message?;
    let text = message.text?;
    let session = SessionId(message.chat.id);

    if text.trim_start().starts_with('/') {
        return match Command::parse(&text) {
            Some(command) => Some(InboundEvent::command(session, command)),
            None => {
                tracing::debug!(session = %session, "ignoring unknown command");
                None
            }
        };
    }

    Some(InboundEvent::text(session, text))
}

/// Offset-tracking `getUpdates` loop state.
#[derive(Debug, Default)]
pub struct UpdatePoller {
    offset: i64,
}

impl UpdatePoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Fetch the next batch of updates and translate them.
    ///
    /// The offset advances past every received update, including ignored
    /// ones, so none is fetched twice.
    pub async fn next_batch(
        &mut self,
        client: &TelegramClient,
    ) -> Result<Vec<InboundEvent>, TransportError> {
        let updates = client.get_updates(self.offset, LONG_POLL_SECS).await?;
        Ok(self.accept(updates))
    }

    fn accept(&mut self, updates: Vec<Update>) -> Vec<InboundEvent> {
        if let Some(max_id) = updates.iter().map(|u| u.update_id).max() {
            self.offset = self.offset.max(max_id + 1);
        }
        updates.into_iter().filter_map(parse_update).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holicard_types::holiday::HolidayKind;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_command_message() {
        let event = parse_update(update(
            r#"{"update_id":1,"message":{"message_id":10,"chat":{"id":555},"text":"/christmas@holicard_bot"}}"#,
        ))
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::command(SessionId(555), Command::Fixed(HolidayKind::Christmas))
        );
    }

    #[test]
    fn test_parse_plain_text() {
        let event = parse_update(update(
            r#"{"update_id":2,"message":{"message_id":11,"chat":{"id":555},"text":"Brazil"}}"#,
        ))
        .unwrap();
        assert_eq!(event, InboundEvent::text(SessionId(555), "Brazil"));
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let parsed = parse_update(update(
            r#"{"update_id":3,"message":{"message_id":12,"chat":{"id":555},"text":"/settings"}}"#,
        ));
        assert!(parsed.is_none());
    }

    #[test]
    fn test_message_without_text_is_ignored() {
        let parsed = parse_update(update(
            r#"{"update_id":4,"message":{"message_id":13,"chat":{"id":555},"sticker":{"file_id":"x"}}}"#,
        ));
        assert!(parsed.is_none());
    }

    #[test]
    fn test_parse_callback_query() {
        let event = parse_update(update(
            r#"{"update_id":5,"callback_query":{"id":"cb-1","from":{"id":99},
                "message":{"message_id":20,"chat":{"id":555},"text":"Which holiday?"},
                "data":"custom_newyear"}}"#,
        ))
        .unwrap();

        assert_eq!(event.session, SessionId(555));
        assert_eq!(
            event.kind,
            EventKind::Button {
                action: ButtonAction::PickHoliday(HolidayKind::NewYear),
                callback_id: Some("cb-1".to_string()),
                origin: Some(MessageRef {
                    session: SessionId(555),
                    message_id: 20
                }),
            }
        );
    }

    #[test]
    fn test_callback_without_message_uses_sender() {
        let event = parse_update(update(
            r#"{"update_id":6,"callback_query":{"id":"cb-2","from":{"id":99},"data":"another"}}"#,
        ))
        .unwrap();
        assert_eq!(event.session, SessionId(99));
    }

    #[test]
    fn test_unknown_payload_is_ignored() {
        let parsed = parse_update(update(
            r#"{"update_id":7,"callback_query":{"id":"cb-3","from":{"id":99},"data":"bogus"}}"#,
        ));
        assert!(parsed.is_none());
    }

    #[test]
    fn test_poller_advances_past_ignored_updates() {
        let mut poller = UpdatePoller::new();
        let events = poller.accept(vec![
            update(r#"{"update_id":40,"message":{"message_id":1,"chat":{"id":1},"text":"/start"}}"#),
            update(r#"{"update_id":41,"message":{"message_id":2,"chat":{"id":1}}}"#),
        ]);
        assert_eq!(events.len(), 1);
        assert_eq!(poller.offset(), 42);

        assert!(poller.accept(vec![]).is_empty());
        assert_eq!(poller.offset(), 42);
    }
}
