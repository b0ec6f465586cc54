//! Full intake flow: urgency flag, general data, clinical data, review and
//! submission with a correlative case id.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::{Effect, Transition};
use crate::intake::{
    clinical::PRIOR_THERAPY, flag_value, general::AGE, number_value, CaseId, ClinicalData,
    FieldValues, GeneralData, IntakeDraft,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntakeScreen {
    #[default]
    Intro,
    GeneralData,
    Clinical,
    Review,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeEvent {
    Start { urgent: bool },
    SubmitGeneral(FieldValues),
    SubmitClinical { values: FieldValues, today: NaiveDate },
    Back,
    Correct,
    Submit,
    Persisted(CaseId),
    PersistFailed(String),
    Home,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeSession {
    pub screen: IntakeScreen,
    /// Informational only; never changes the route through the flow.
    pub urgent: bool,
    pub general_fields: FieldValues,
    pub clinical_fields: FieldValues,
    pub general: Option<GeneralData>,
    pub clinical: Option<ClinicalData>,
    pub case_id: Option<CaseId>,
    pub last_error: Option<String>,
}

impl IntakeSession {
    /// Every value collected so far, general block first.
    pub fn fields(&self) -> FieldValues {
        let mut fields = self.general_fields.clone();
        fields.extend(
            self.clinical_fields
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        fields
    }

    pub fn draft(&self) -> Option<IntakeDraft> {
        Some(IntakeDraft {
            urgent: self.urgent,
            general: self.general.clone()?,
            clinical: self.clinical.clone()?,
        })
    }
}

pub type IntakeTransition = Transition<IntakeScreen, IntakeDraft>;

pub fn handle(session: &mut IntakeSession, event: IntakeEvent) -> IntakeTransition {
    let from = session.screen;
    let transition = match (from, event) {
        (IntakeScreen::Intro, IntakeEvent::Start { urgent }) => {
            session.urgent = urgent;
            Transition::to(IntakeScreen::GeneralData)
        }
        (IntakeScreen::GeneralData, IntakeEvent::SubmitGeneral(values)) => {
            let age = number_value(&values, AGE).unwrap_or(0);
            session.general_fields = retain_keys(values, &GeneralData::visible_keys(age));
            match GeneralData::from_fields(&session.general_fields) {
                Ok(general) => {
                    info!(group = %general.group(), "general data accepted");
                    session.general = Some(general);
                    Transition::to(IntakeScreen::Clinical)
                }
                Err(errors) => {
                    warn!(failures = errors.messages().len(), "general data rejected");
                    session.general = None;
                    Transition::to(from).with(Effect::ShowErrors(errors.into_messages()))
                }
            }
        }
        (IntakeScreen::Clinical, IntakeEvent::SubmitClinical { values, today }) => {
            match session.general.as_ref().map(GeneralData::group) {
                Some(group) => {
                    let prior_therapy = flag_value(&values, PRIOR_THERAPY);
                    session.clinical_fields =
                        retain_keys(values, &ClinicalData::visible_keys(group, prior_therapy));
                    match ClinicalData::from_fields(&session.clinical_fields, group, today) {
                        Ok(clinical) => {
                            session.clinical = Some(clinical);
                            Transition::to(IntakeScreen::Review)
                        }
                        Err(errors) => {
                            warn!(failures = errors.messages().len(), "clinical data rejected");
                            session.clinical = None;
                            Transition::to(from).with(Effect::ShowErrors(errors.into_messages()))
                        }
                    }
                }
                None => {
                    debug!("clinical data submitted before general data");
                    Transition::to(from)
                }
            }
        }
        (IntakeScreen::Clinical, IntakeEvent::Back) => {
            session.clinical_fields.clear();
            session.clinical = None;
            Transition::to(IntakeScreen::GeneralData)
        }
        (IntakeScreen::Review, IntakeEvent::Correct) => {
            session.last_error = None;
            Transition::to(IntakeScreen::Clinical)
        }
        (IntakeScreen::Review, IntakeEvent::Submit) => match session.draft() {
            Some(draft) => Transition::to(from).with(Effect::Persist(draft)),
            None => {
                debug!("submit without complete data ignored");
                Transition::to(from)
            }
        },
        (IntakeScreen::Review, IntakeEvent::Persisted(case_id)) => {
            session.case_id = Some(case_id);
            session.last_error = None;
            Transition::to(IntakeScreen::Final)
        }
        (IntakeScreen::Review, IntakeEvent::PersistFailed(reason)) => {
            warn!(%reason, "intake could not be saved");
            let message = format!("Error al guardar los datos: {reason}");
            session.last_error = Some(message.clone());
            Transition::to(from).with(Effect::ShowErrors(vec![message]))
        }
        (IntakeScreen::Final, IntakeEvent::Home) => {
            *session = IntakeSession::default();
            Transition::to(IntakeScreen::Intro).with(Effect::Reset)
        }
        (screen, event) => {
            debug!(?screen, ?event, "event ignored");
            Transition::to(screen)
        }
    };

    if transition.next != from {
        info!(from = ?from, to = ?transition.next, "intake screen changed");
    }
    session.screen = transition.next;
    transition
}

fn retain_keys(mut values: FieldValues, keys: &[&str]) -> FieldValues {
    values.retain(|key, _| keys.contains(&key.as_str()));
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::age::{CHILD_BEHAVIOR, DEVELOPMENTAL_HISTORY, SCHOOL_HISTORY};
    use crate::intake::clinical::{PREFERRED_DATE, PREFERRED_SLOT, PRIOR_MEDICATION, REASON};
    use crate::intake::general::{
        ADDRESS, CITY, CONTACT_PHONE, EMPLOYMENT, PATIENT_NAME, REFERRAL_CHANNEL, RESPONSIBLE_NAME,
    };
    use crate::intake::screening::{GAD2_NERVES, PHQ2_INTEREST, PHQ2_MOOD};
    use crate::intake::AgeGroup;

    fn fields(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn general_fields(age: &str) -> FieldValues {
        fields(&[
            (PATIENT_NAME, "Lucía Torres"),
            (AGE, age),
            (ADDRESS, "Calle Real 12"),
            (CITY, "Cusco"),
            (RESPONSIBLE_NAME, "Pedro Torres"),
            (CONTACT_PHONE, "984111222"),
            (EMPLOYMENT, "Dependiente"),
            (DEVELOPMENTAL_HISTORY, "Sin observaciones"),
            (CHILD_BEHAVIOR, "Tranquila"),
            (SCHOOL_HISTORY, "Segundo de secundaria"),
            (REFERRAL_CHANNEL, "Otro"),
        ])
    }

    fn clinical_fields() -> FieldValues {
        fields(&[
            (REASON, "Ansiedad ante exámenes"),
            (PRIOR_THERAPY, "No"),
            (PRIOR_MEDICATION, "Sí"),
            (PHQ2_INTEREST, "1 - Varios días"),
            (PHQ2_MOOD, "1 - Varios días"),
            (GAD2_NERVES, "3 - Casi todos los días"),
            (PREFERRED_DATE, "2025-06-09"),
            (PREFERRED_SLOT, "11:00 - 13:00"),
        ])
    }

    fn session_in_review(age: &str) -> IntakeSession {
        let mut session = IntakeSession::default();
        handle(&mut session, IntakeEvent::Start { urgent: false });
        handle(&mut session, IntakeEvent::SubmitGeneral(general_fields(age)));
        handle(
            &mut session,
            IntakeEvent::SubmitClinical {
                values: clinical_fields(),
                today: today(),
            },
        );
        session
    }

    #[test]
    fn start_records_urgency_and_moves_on() {
        let mut session = IntakeSession::default();
        let transition = handle(&mut session, IntakeEvent::Start { urgent: true });
        assert_eq!(transition.next, IntakeScreen::GeneralData);
        assert!(session.urgent);
    }

    #[test]
    fn hidden_general_fields_are_dropped() {
        let mut session = IntakeSession::default();
        handle(&mut session, IntakeEvent::Start { urgent: false });
        handle(&mut session, IntakeEvent::SubmitGeneral(general_fields("15")));
        assert_eq!(session.screen, IntakeScreen::Clinical);
        assert!(session.general_fields.contains_key(SCHOOL_HISTORY));
        assert!(!session.general_fields.contains_key(CHILD_BEHAVIOR));
        assert!(!session.general_fields.contains_key(DEVELOPMENTAL_HISTORY));
        assert_eq!(
            session.general.as_ref().map(GeneralData::group),
            Some(AgeGroup::Adolescence)
        );
    }

    #[test]
    fn invalid_general_data_stays_with_errors() {
        let mut session = IntakeSession {
            screen: IntakeScreen::GeneralData,
            ..IntakeSession::default()
        };
        let mut values = general_fields("30");
        values.insert(CONTACT_PHONE.into(), "12".into());
        let transition = handle(&mut session, IntakeEvent::SubmitGeneral(values));
        assert_eq!(transition.next, IntakeScreen::GeneralData);
        assert_eq!(
            transition.errors(),
            vec!["El teléfono de contacto debe tener al menos 6 caracteres."]
        );
    }

    #[test]
    fn clinical_drops_medication_without_prior_therapy() {
        let session = session_in_review("15");
        assert_eq!(session.screen, IntakeScreen::Review);
        assert!(!session.clinical_fields.contains_key(PRIOR_MEDICATION));
        let clinical = session.clinical.as_ref().unwrap();
        assert_eq!(clinical.prior_medication, None);
        assert_eq!(clinical.mood_score(), 2);
        assert_eq!(clinical.anxiety_score(), 3);
    }

    #[test]
    fn children_have_no_screening_scores() {
        let session = session_in_review("9");
        assert!(!session.clinical_fields.contains_key(PHQ2_INTEREST));
        let clinical = session.clinical.as_ref().unwrap();
        assert!(clinical.screening.is_none());
        assert_eq!(clinical.mood_score(), 0);
    }

    #[test]
    fn back_discards_clinical_input() {
        let mut session = session_in_review("30");
        handle(&mut session, IntakeEvent::Correct);
        assert_eq!(session.screen, IntakeScreen::Clinical);
        handle(&mut session, IntakeEvent::Back);
        assert_eq!(session.screen, IntakeScreen::GeneralData);
        assert!(session.clinical_fields.is_empty());
        assert!(session.clinical.is_none());
        assert!(!session.general_fields.is_empty());
    }

    #[test]
    fn submit_requests_persist_and_waits_for_outcome() {
        let mut session = session_in_review("30");
        let transition = handle(&mut session, IntakeEvent::Submit);
        assert_eq!(transition.next, IntakeScreen::Review);
        let draft = transition.persisted().expect("persist effect");
        assert_eq!(draft.general.contact.responsible_name, "Lucía Torres");

        let transition = handle(&mut session, IntakeEvent::PersistFailed("sin permiso".into()));
        assert_eq!(transition.next, IntakeScreen::Review);
        assert_eq!(
            session.last_error.as_deref(),
            Some("Error al guardar los datos: sin permiso")
        );

        handle(&mut session, IntakeEvent::Persisted(CaseId::new(2025, 42)));
        assert_eq!(session.screen, IntakeScreen::Final);
        assert_eq!(session.case_id.map(|id| id.to_string()).as_deref(), Some("PS-2025-0042"));
        assert!(session.last_error.is_none());
    }

    #[test]
    fn home_resets_to_intro() {
        let mut session = session_in_review("30");
        handle(&mut session, IntakeEvent::Persisted(CaseId::new(2025, 1)));
        let transition = handle(&mut session, IntakeEvent::Home);
        assert_eq!(transition.next, IntakeScreen::Intro);
        assert_eq!(session, IntakeSession::default());
    }

    #[test]
    fn fields_merge_both_blocks() {
        let session = session_in_review("30");
        let merged = session.fields();
        assert!(merged.contains_key(PATIENT_NAME));
        assert!(merged.contains_key(PREFERRED_SLOT));
        assert!(!merged.contains_key(RESPONSIBLE_NAME));
    }
}
