//! Flow controller: runs the state machine for each inbound event and
//! carries out the resulting effect against the ports.

use std::sync::Mutex;

use dashmap::DashMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info, warn};

use holicard_types::chat::{EventKind, InboundEvent, Keyboard, MessageRef, SessionId};
use holicard_types::holiday::CardKey;

use super::FlowError;
use super::dispatcher::EventHandler;
use super::replies;
use super::state::{Effect, SessionContext};
use super::transport::ChatTransport;
use crate::card::service::CardService;
use crate::image::ImageSearch;
use crate::image::finder::ImageFinder;
use crate::storage::card_cache::CardCache;

/// Images requested per rendered card unless configured otherwise.
pub const DEFAULT_IMAGES_PER_CARD: usize = 3;

/// Drives conversations for every session of one transport.
///
/// Session contexts live in memory only and are created on first contact.
/// The controller expects events of one session to arrive one at a time
/// (see [`super::dispatcher::SessionDispatcher`]); different sessions may
/// be handled concurrently.
pub struct FlowController<T: ChatTransport, C: CardCache, I: ImageSearch> {
    transport: T,
    cards: CardService<C>,
    images: ImageFinder<I>,
    sessions: DashMap<SessionId, SessionContext>,
    rng: Mutex<StdRng>,
    images_per_card: usize,
}

impl<T: ChatTransport, C: CardCache, I: ImageSearch> FlowController<T, C, I> {
    pub fn new(transport: T, cards: CardService<C>, images: ImageFinder<I>) -> Self {
        Self {
            transport,
            cards,
            images,
            sessions: DashMap::new(),
            rng: Mutex::new(StdRng::from_os_rng()),
            images_per_card: DEFAULT_IMAGES_PER_CARD,
        }
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn with_images_per_card(mut self, count: usize) -> Self {
        self.images_per_card = count;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cards(&self) -> &CardService<C> {
        &self.cards
    }

    /// Snapshot of a session's context, if the session has been seen.
    pub fn session(&self, session: SessionId) -> Option<SessionContext> {
        self.sessions.get(&session).map(|ctx| ctx.value().clone())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Handle one inbound event end to end.
    ///
    /// Never fails: any error is logged and answered with a generic
    /// "please try again" message.
    #[tracing::instrument(name = "handle_event", skip(self, event), fields(session = %event.session))]
    pub async fn handle_event(&self, event: InboundEvent) {
        let session = event.session;

        if let EventKind::Button {
            callback_id: Some(callback_id),
            ..
        } = &event.kind
        {
            if let Err(e) = self.transport.acknowledge(callback_id).await {
                warn!(error = %e, "failed to acknowledge button press");
            }
        }

        let effect = self.transition(&event);

        if let Err(e) = self.execute(session, effect).await {
            error!(%session, error = %e, "failed to handle event");
            if let Err(e) = self
                .transport
                .send_text(session, replies::GENERIC_ERROR, None)
                .await
            {
                warn!(%session, error = %e, "failed to send error reply");
            }
        }
    }

    /// Apply the event to the session context. Locks are released before
    /// any effect runs.
    fn transition(&self, event: &InboundEvent) -> Effect {
        let mut ctx = self.sessions.entry(event.session).or_default();
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        ctx.apply(&event.kind, &mut *rng)
    }

    async fn execute(&self, session: SessionId, effect: Effect) -> Result<(), FlowError> {
        match effect {
            Effect::Welcome => {
                self.transport
                    .send_text(session, replies::WELCOME, None)
                    .await?;
            }
            Effect::Render { key, origin } => {
                self.render(session, &key, origin).await?;
            }
            Effect::OfferCountryMethod => {
                self.transport
                    .send_text(
                        session,
                        replies::CHOOSE_METHOD,
                        Some(&replies::country_method_keyboard()),
                    )
                    .await?;
            }
            Effect::PromptTypedCountry { origin } => {
                self.reply_or_edit(session, origin, replies::TYPE_COUNTRY, None)
                    .await?;
            }
            Effect::OfferHoliday {
                country,
                typed,
                origin,
            } => {
                self.reply_or_edit(
                    session,
                    origin,
                    &replies::holiday_offer(&country, typed),
                    Some(&replies::holiday_keyboard()),
                )
                .await?;
            }
            Effect::Stats => {
                let stats = self.cards.stats().await?;
                self.transport
                    .send_text(session, &replies::stats(&stats), None)
                    .await?;
            }
            Effect::Unexpected { hint } => {
                info!(%session, ?hint, "event has no transition in current state");
                self.transport
                    .send_text(session, replies::hint(hint), None)
                    .await?;
            }
            Effect::Ignore => {}
        }
        Ok(())
    }

    /// Show the working indicator, fetch the card and images, then send
    /// photos (if any) followed by the card text with follow-up controls.
    async fn render(
        &self,
        session: SessionId,
        key: &CardKey,
        origin: Option<MessageRef>,
    ) -> Result<(), FlowError> {
        let working = replies::working(key);
        let indicator = match origin {
            Some(message) => {
                self.transport.edit_text(message, &working, None).await?;
                message
            }
            None => self.transport.send_text(session, &working, None).await?,
        };

        let card = match self.cards.get_or_generate(&key.country, key.holiday).await {
            Ok(card) => card,
            Err(e) => {
                self.discard_indicator(indicator).await;
                return Err(e.into());
            }
        };

        let images = self
            .images
            .find_images(&key.country, key.holiday, self.images_per_card)
            .await;

        self.discard_indicator(indicator).await;

        if !images.is_empty() {
            if let Err(e) = self.transport.send_photos(session, &images).await {
                warn!(%session, error = %e, "failed to send photos, sending text only");
            }
        }

        self.transport
            .send_text(session, &card.text(), Some(&replies::follow_up_keyboard()))
            .await?;

        info!(%session, card = %key, source = ?card.source, images = images.len(), "card rendered");
        Ok(())
    }

    async fn reply_or_edit(
        &self,
        session: SessionId,
        origin: Option<MessageRef>,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), FlowError> {
        match origin {
            Some(message) => self.transport.edit_text(message, text, keyboard).await?,
            None => {
                self.transport.send_text(session, text, keyboard).await?;
            }
        }
        Ok(())
    }

    async fn discard_indicator(&self, indicator: MessageRef) {
        if let Err(e) = self.transport.delete_message(indicator).await {
            warn!(session = %indicator.session, error = %e, "failed to delete working indicator");
        }
    }
}

impl<T, C, I> EventHandler for FlowController<T, C, I>
where
    T: ChatTransport + 'static,
    C: CardCache + 'static,
    I: ImageSearch + 'static,
{
    async fn handle(&self, event: InboundEvent) {
        self.handle_event(event).await;
    }

    fn session_ended(&self, session: SessionId) {
        if self.sessions.remove(&session).is_some() {
            info!(%session, "session context dropped");
        }
    }
}
