//! Triage flow: emergency question, short pre-registration, review and save.

use std::fmt;

use tracing::{debug, info, warn};

use super::{Effect, Transition};
use crate::intake::{FieldValues, PreRegistration};

pub const SELECTION_REQUIRED: &str = "Por favor seleccione una opción.";

/// Phone numbers shown when the user reports an emergency.
pub const EMERGENCY_CONTACTS: [(&str, &str); 3] = [
    ("SAMU", "106"),
    ("Línea de Salud Mental", "113 (opción 5)"),
    ("Policía", "105"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriageAnswer {
    #[default]
    Unset,
    Yes,
    No,
    Unsure,
}

impl TriageAnswer {
    pub const ALL: [TriageAnswer; 4] = [
        TriageAnswer::Unset,
        TriageAnswer::Yes,
        TriageAnswer::No,
        TriageAnswer::Unsure,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TriageAnswer::Unset => "Seleccionar...",
            TriageAnswer::Yes => "Sí",
            TriageAnswer::No => "No",
            TriageAnswer::Unsure => "No estoy seguro",
        }
    }
}

impl fmt::Display for TriageAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriageScreen {
    #[default]
    Triage,
    Emergency,
    Form,
    Review,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageEvent {
    Continue(TriageAnswer),
    BackToStart,
    Submit(FieldValues),
    Correct,
    Confirm,
    Saved,
    SaveFailed(String),
    Home,
}

/// Result of the write attempted on the final screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed(String),
}

impl SaveOutcome {
    pub fn message(&self) -> String {
        match self {
            SaveOutcome::Saved => "Pre-registro completado exitosamente.".to_string(),
            SaveOutcome::Failed(reason) => format!("Error al guardar los datos: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageSession {
    pub screen: TriageScreen,
    pub answer: TriageAnswer,
    /// Last submitted form values, used to pre-fill the form on correction.
    pub fields: FieldValues,
    pub registration: Option<PreRegistration>,
    pub outcome: Option<SaveOutcome>,
}

pub type TriageTransition = Transition<TriageScreen, PreRegistration>;

pub fn handle(session: &mut TriageSession, event: TriageEvent) -> TriageTransition {
    let from = session.screen;
    let transition = match (from, event) {
        (TriageScreen::Triage, TriageEvent::Continue(answer)) => {
            session.answer = answer;
            match answer {
                TriageAnswer::Unset => {
                    Transition::to(from).with(Effect::Warn(SELECTION_REQUIRED.to_string()))
                }
                TriageAnswer::Yes | TriageAnswer::Unsure => Transition::to(TriageScreen::Emergency),
                TriageAnswer::No => Transition::to(TriageScreen::Form),
            }
        }
        (TriageScreen::Emergency, TriageEvent::BackToStart) => {
            session.answer = TriageAnswer::Unset;
            Transition::to(TriageScreen::Triage)
        }
        (TriageScreen::Form, TriageEvent::Submit(values)) => {
            session.fields = values;
            match PreRegistration::from_fields(&session.fields) {
                Ok(registration) => {
                    session.registration = Some(registration);
                    Transition::to(TriageScreen::Review)
                }
                Err(errors) => {
                    warn!(failures = errors.messages().len(), "pre-registration rejected");
                    session.registration = None;
                    Transition::to(from).with(Effect::ShowErrors(errors.into_messages()))
                }
            }
        }
        (TriageScreen::Review, TriageEvent::Correct) => Transition::to(TriageScreen::Form),
        (TriageScreen::Review, TriageEvent::Confirm) => match session.registration.clone() {
            Some(registration) => {
                session.outcome = None;
                Transition::to(TriageScreen::Final).with(Effect::Persist(registration))
            }
            None => {
                debug!("confirm without a validated registration ignored");
                Transition::to(from)
            }
        },
        (TriageScreen::Final, TriageEvent::Saved) => {
            session.outcome = Some(SaveOutcome::Saved);
            Transition::to(from)
        }
        (TriageScreen::Final, TriageEvent::SaveFailed(reason)) => {
            warn!(%reason, "pre-registration could not be saved");
            session.outcome = Some(SaveOutcome::Failed(reason));
            Transition::to(from)
        }
        (TriageScreen::Final, TriageEvent::Home) => {
            *session = TriageSession::default();
            Transition::to(TriageScreen::Triage).with(Effect::Reset)
        }
        (screen, event) => {
            debug!(?screen, ?event, "event ignored");
            Transition::to(screen)
        }
    };

    if transition.next != from {
        info!(from = ?from, to = ?transition.next, "triage screen changed");
    }
    session.screen = transition.next;
    transition
}
