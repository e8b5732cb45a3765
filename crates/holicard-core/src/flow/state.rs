//! Per-session conversation state and its transition function.
//!
//! `SessionContext::apply` is pure over (state, event, rng): it updates the
//! context and returns the [`Effect`] the controller must carry out. No I/O
//! happens here, so the whole table is unit-testable.

use rand::Rng;
use tracing::debug;

use holicard_types::chat::{ButtonAction, Command, EventKind, MessageRef};
use holicard_types::holiday::{CardKey, HolidayKind};

use crate::reference::{random_country, random_holiday};

/// Where a session is in the "choose country" wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Idle,
    /// Waiting for "random country" or "type country".
    AwaitingCountryMethod,
    /// Waiting for a free-text country name.
    AwaitingTypedCountry,
    /// Country chosen, waiting for the holiday.
    AwaitingHolidayChoice { country: String },
}

/// Memory-only state of one chat session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub state: FlowState,
    /// Last (country, holiday) selected in this session.
    pub last: Option<CardKey>,
}

/// Which short hint to answer an out-of-place event with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// Stale wizard button outside the wizard.
    StartOver,
    ChooseMethod,
    TypeCountry,
    ChooseHoliday,
}

/// What the controller has to do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Welcome,
    /// Generate (or fetch) and render a card. `origin` is the message to
    /// turn into the working indicator, when there is one.
    Render {
        key: CardKey,
        origin: Option<MessageRef>,
    },
    OfferCountryMethod,
    PromptTypedCountry {
        origin: Option<MessageRef>,
    },
    /// `typed` is set when the country came from free text.
    OfferHoliday {
        country: String,
        typed: bool,
        origin: Option<MessageRef>,
    },
    Stats,
    /// The event has no transition from the current state.
    Unexpected {
        hint: Hint,
    },
    Ignore,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Country chosen in the wizard but not yet rendered.
    pub fn pending_country(&self) -> Option<&str> {
        match &self.state {
            FlowState::AwaitingHolidayChoice { country } => Some(country),
            _ => None,
        }
    }

    /// Apply one event. Commands reset the wizard before acting; the
    /// "another" and "custom" buttons work from any state.
    pub fn apply<R: Rng + ?Sized>(&mut self, event: &EventKind, rng: &mut R) -> Effect {
        match event {
            EventKind::Command(command) => {
                self.state = FlowState::Idle;
                self.on_command(*command, rng)
            }
            EventKind::Button { action, origin, .. } => self.on_button(*action, *origin, rng),
            EventKind::Text(text) => self.on_text(text),
        }
    }

    fn on_command<R: Rng + ?Sized>(&mut self, command: Command, rng: &mut R) -> Effect {
        match command {
            Command::Start | Command::Help => Effect::Welcome,
            Command::Holiday => {
                let holiday = random_holiday(rng);
                self.select(random_country(rng), holiday, None)
            }
            Command::Fixed(holiday) => self.select(random_country(rng), holiday, None),
            Command::Another => self.repeat(rng),
            Command::Custom => {
                self.state = FlowState::AwaitingCountryMethod;
                Effect::OfferCountryMethod
            }
            Command::Stats => Effect::Stats,
        }
    }

    fn on_button<R: Rng + ?Sized>(
        &mut self,
        action: ButtonAction,
        origin: Option<MessageRef>,
        rng: &mut R,
    ) -> Effect {
        match (action, &self.state) {
            (ButtonAction::Another, _) => {
                self.state = FlowState::Idle;
                self.repeat(rng)
            }
            (ButtonAction::Custom, _) => {
                self.state = FlowState::AwaitingCountryMethod;
                Effect::OfferCountryMethod
            }
            (ButtonAction::RandomCountry, FlowState::AwaitingCountryMethod) => {
                let country = random_country(rng).to_string();
                self.state = FlowState::AwaitingHolidayChoice {
                    country: country.clone(),
                };
                Effect::OfferHoliday {
                    country,
                    typed: false,
                    origin,
                }
            }
            (ButtonAction::TypeCountry, FlowState::AwaitingCountryMethod) => {
                self.state = FlowState::AwaitingTypedCountry;
                Effect::PromptTypedCountry { origin }
            }
            (ButtonAction::PickHoliday(holiday), FlowState::AwaitingHolidayChoice { country }) => {
                let country = country.clone();
                self.state = FlowState::Idle;
                self.select(&country, holiday, origin)
            }
            _ => {
                debug!(?action, state = ?self.state, "button has no transition");
                Effect::Unexpected {
                    hint: self.hint(),
                }
            }
        }
    }

    fn on_text(&mut self, text: &str) -> Effect {
        match self.state {
            FlowState::AwaitingTypedCountry => {
                let country = text.trim();
                if country.is_empty() {
                    return Effect::Unexpected {
                        hint: Hint::TypeCountry,
                    };
                }
                self.state = FlowState::AwaitingHolidayChoice {
                    country: country.to_string(),
                };
                Effect::OfferHoliday {
                    country: country.to_string(),
                    typed: true,
                    origin: None,
                }
            }
            FlowState::Idle => {
                debug!("ignoring free text outside the wizard");
                Effect::Ignore
            }
            _ => Effect::Unexpected { hint: self.hint() },
        }
    }

    /// Last holiday (or a random one) in a new random country.
    fn repeat<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Effect {
        let holiday = match &self.last {
            Some(last) => last.holiday,
            None => random_holiday(rng),
        };
        self.select(random_country(rng), holiday, None)
    }

    fn select(&mut self, country: &str, holiday: HolidayKind, origin: Option<MessageRef>) -> Effect {
        let key = CardKey::new(country, holiday);
        self.last = Some(key.clone());
        Effect::Render { key, origin }
    }

    fn hint(&self) -> Hint {
        match self.state {
            FlowState::Idle => Hint::StartOver,
            FlowState::AwaitingCountryMethod => Hint::ChooseMethod,
            FlowState::AwaitingTypedCountry => Hint::TypeCountry,
            FlowState::AwaitingHolidayChoice { .. } => Hint::ChooseHoliday,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::COUNTRIES;
    use holicard_types::chat::SessionId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    fn button(action: ButtonAction) -> EventKind {
        EventKind::Button {
            action,
            callback_id: None,
            origin: None,
        }
    }

    fn rendered(effect: Effect) -> CardKey {
        match effect {
            Effect::Render { key, .. } => key,
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn test_start_welcomes_and_resets() {
        let mut ctx = SessionContext {
            state: FlowState::AwaitingTypedCountry,
            last: None,
        };
        let effect = ctx.apply(&EventKind::Command(Command::Start), &mut rng());
        assert_eq!(effect, Effect::Welcome);
        assert_eq!(ctx.state, FlowState::Idle);
    }

    #[test]
    fn test_fixed_holiday_picks_reference_country() {
        let mut ctx = SessionContext::new();
        let key = rendered(ctx.apply(
            &EventKind::Command(Command::Fixed(HolidayKind::NewYear)),
            &mut rng(),
        ));
        assert_eq!(key.holiday, HolidayKind::NewYear);
        assert!(COUNTRIES.contains(&key.country.as_str()));
        assert_eq!(ctx.last, Some(key));
    }

    #[test]
    fn test_repeat_without_history_records_selection() {
        let mut ctx = SessionContext::new();
        let key = rendered(ctx.apply(&EventKind::Command(Command::Another), &mut rng()));
        assert!(COUNTRIES.contains(&key.country.as_str()));
        assert_eq!(ctx.last, Some(key));
        assert_eq!(ctx.state, FlowState::Idle);
    }

    #[test]
    fn test_repeat_keeps_last_holiday() {
        let mut ctx = SessionContext {
            state: FlowState::Idle,
            last: Some(CardKey::new("Japan", HolidayKind::Christmas)),
        };
        let mut rng = rng();
        for _ in 0..10 {
            let key = rendered(ctx.apply(&button(ButtonAction::Another), &mut rng));
            assert_eq!(key.holiday, HolidayKind::Christmas);
        }
    }

    #[test]
    fn test_typed_country_wizard() {
        let mut ctx = SessionContext::new();
        let mut rng = rng();

        assert_eq!(
            ctx.apply(&EventKind::Command(Command::Custom), &mut rng),
            Effect::OfferCountryMethod
        );
        assert_eq!(ctx.state, FlowState::AwaitingCountryMethod);

        let effect = ctx.apply(&button(ButtonAction::TypeCountry), &mut rng);
        assert_eq!(effect, Effect::PromptTypedCountry { origin: None });

        let effect = ctx.apply(&EventKind::Text("  Brazil \n".to_string()), &mut rng);
        assert_eq!(
            effect,
            Effect::OfferHoliday {
                country: "Brazil".to_string(),
                typed: true,
                origin: None
            }
        );
        assert_eq!(ctx.pending_country(), Some("Brazil"));

        let origin = MessageRef {
            session: SessionId(5),
            message_id: 40,
        };
        let effect = ctx.apply(
            &EventKind::Button {
                action: ButtonAction::PickHoliday(HolidayKind::NewYear),
                callback_id: Some("cb".to_string()),
                origin: Some(origin),
            },
            &mut rng,
        );
        assert_eq!(
            effect,
            Effect::Render {
                key: CardKey::new("Brazil", HolidayKind::NewYear),
                origin: Some(origin)
            }
        );
        assert_eq!(ctx.state, FlowState::Idle);
        assert_eq!(ctx.last, Some(CardKey::new("Brazil", HolidayKind::NewYear)));
    }

    #[test]
    fn test_random_country_wizard() {
        let mut ctx = SessionContext::new();
        let mut rng = rng();
        ctx.apply(&button(ButtonAction::Custom), &mut rng);

        match ctx.apply(&button(ButtonAction::RandomCountry), &mut rng) {
            Effect::OfferHoliday { country, typed, .. } => {
                assert!(!typed);
                assert!(COUNTRIES.contains(&country.as_str()));
                assert_eq!(ctx.pending_country(), Some(country.as_str()));
            }
            other => panic!("expected holiday offer, got {other:?}"),
        }
    }

    #[test]
    fn test_command_interrupts_wizard() {
        let mut ctx = SessionContext {
            state: FlowState::AwaitingHolidayChoice {
                country: "Peru".to_string(),
            },
            last: None,
        };
        assert_eq!(
            ctx.apply(&EventKind::Command(Command::Stats), &mut rng()),
            Effect::Stats
        );
        assert_eq!(ctx.state, FlowState::Idle);
    }

    #[test]
    fn test_stale_holiday_button_is_unexpected() {
        let mut ctx = SessionContext::new();
        let effect = ctx.apply(
            &button(ButtonAction::PickHoliday(HolidayKind::Christmas)),
            &mut rng(),
        );
        assert_eq!(
            effect,
            Effect::Unexpected {
                hint: Hint::StartOver
            }
        );
        assert_eq!(ctx.state, FlowState::Idle);
        assert!(ctx.last.is_none());
    }

    #[test]
    fn test_text_while_choosing_method_is_unexpected() {
        let mut ctx = SessionContext {
            state: FlowState::AwaitingCountryMethod,
            last: None,
        };
        let effect = ctx.apply(&EventKind::Text("France".to_string()), &mut rng());
        assert_eq!(
            effect,
            Effect::Unexpected {
                hint: Hint::ChooseMethod
            }
        );
        assert_eq!(ctx.state, FlowState::AwaitingCountryMethod);
    }

    #[test]
    fn test_blank_typed_country_keeps_waiting() {
        let mut ctx = SessionContext {
            state: FlowState::AwaitingTypedCountry,
            last: None,
        };
        let effect = ctx.apply(&EventKind::Text("   ".to_string()), &mut rng());
        assert_eq!(
            effect,
            Effect::Unexpected {
                hint: Hint::TypeCountry
            }
        );
        assert_eq!(ctx.state, FlowState::AwaitingTypedCountry);
    }

    #[test]
    fn test_idle_text_is_ignored() {
        let mut ctx = SessionContext::new();
        assert_eq!(
            ctx.apply(&EventKind::Text("hello".to_string()), &mut rng()),
            Effect::Ignore
        );
    }
}
