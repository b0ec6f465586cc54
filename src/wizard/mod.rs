//! Screen controllers for the two wizard flows.
//!
//! Each flow keeps its state in an explicit session value and exposes a pure
//! `handle(&mut session, event)` function. Side effects (warnings, writes,
//! resets) are returned as [`Effect`]s for the front-end to execute; the
//! outcome of a write is fed back as another event.

pub mod intake;
pub mod triage;

pub use intake::{IntakeEvent, IntakeScreen, IntakeSession};
pub use triage::{TriageAnswer, TriageEvent, TriageScreen, TriageSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<P> {
    /// Single inline warning; the screen does not change.
    Warn(String),
    /// Itemized validation failures, in form order.
    ShowErrors(Vec<String>),
    /// Data ready to be written to the flow's store.
    Persist(P),
    /// The session was cleared back to its defaults.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<S, P> {
    pub next: S,
    pub effects: Vec<Effect<P>>,
}

impl<S, P> Transition<S, P> {
    pub fn to(next: S) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    pub fn with(mut self, effect: Effect<P>) -> Self {
        self.effects.push(effect);
        self
    }

    /// The data handed to a [`Effect::Persist`], if any.
    pub fn persisted(&self) -> Option<&P> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Persist(payload) => Some(payload),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<&str> {
        self.effects
            .iter()
            .flat_map(|effect| match effect {
                Effect::Warn(message) => vec![message.as_str()],
                Effect::ShowErrors(messages) => messages.iter().map(String::as_str).collect(),
                _ => Vec::new(),
            })
            .collect()
    }
}
