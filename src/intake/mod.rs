//! Intake domain: the typed data collected by both wizard flows, its
//! validation rules and the flat records persisted at the end of a session.
//!
//! Forms hand over raw values as a [`FieldValues`] mapping keyed by field
//! name; the `from_fields` constructors turn them into validated types or an
//! itemized [`ValidationErrors`] list.

pub mod age;
pub mod clinical;
pub mod general;
pub mod pre_registration;
pub mod record;
pub mod screening;

use std::collections::BTreeMap;

use thiserror::Error;

pub use age::{AgeGroup, AgeNarrative, MAX_AGE};
pub use clinical::{ClinicalData, TIME_SLOTS};
pub use general::{ContactInfo, GeneralData, Referral, EMPLOYMENT_OPTIONS, REFERRAL_CHANNELS};
pub use pre_registration::{PreRegistration, PreRegistrationRecord, REFERRAL_OPTIONS};
pub use record::{CaseId, FlatRecord, IntakeDraft, IntakeRecord, NOT_APPLICABLE};
pub use screening::{LikertItem, Screening, ScreeningPair, LIKERT_LABELS};

/// Raw form values keyed by field name.
pub type FieldValues = BTreeMap<String, String>;

pub const YES: &str = "Sí";
pub const NO: &str = "No";
pub const YES_NO_OPTIONS: [&str; 2] = [NO, YES];

/// Itemized validation failures, one message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .0.join(" "))]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    /// Returns `value` when no failure was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

pub(crate) fn text_value(values: &FieldValues, key: &str) -> String {
    values
        .get(key)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Unset or unparsable numbers read as zero.
pub(crate) fn number_value(values: &FieldValues, key: &str) -> Option<u8> {
    match values.get(key).map(|value| value.trim()) {
        None | Some("") => Some(0),
        Some(raw) => raw.parse::<u8>().ok(),
    }
}

pub(crate) fn flag_value(values: &FieldValues, key: &str) -> bool {
    parse_flag(&text_value(values, key)).unwrap_or(false)
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "sí" | "si" | "s" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

pub fn flag_label(flag: bool) -> &'static str {
    if flag {
        YES
    } else {
        NO
    }
}

pub(crate) fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}
