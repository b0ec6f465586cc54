use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::age::AgeGroup;
use super::screening::{Screening, SCREENING_ITEMS};
use super::{flag_value, text_value, FieldValues, ValidationErrors};

pub const REASON: &str = "motivo_consulta";
pub const PRIOR_THERAPY: &str = "historia_previa";
pub const PRIOR_MEDICATION: &str = "medicacion_previa";
pub const PREFERRED_DATE: &str = "fecha_cita_pref";
pub const PREFERRED_SLOT: &str = "hora_cita_pref";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const TIME_SLOTS: [&str; 4] = [
    "09:00 - 11:00",
    "11:00 - 13:00",
    "15:00 - 17:00",
    "17:00 - 19:00",
];

/// Clinical block of the full intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalData {
    pub reason: String,
    pub prior_therapy: bool,
    /// Only asked when there was prior therapy.
    pub prior_medication: Option<bool>,
    /// Only asked from adolescence on.
    pub screening: Option<Screening>,
    pub preferred_date: NaiveDate,
    pub preferred_slot: String,
}

impl ClinicalData {
    pub fn visible_keys(group: AgeGroup, prior_therapy: bool) -> Vec<&'static str> {
        let mut keys = vec![REASON, PRIOR_THERAPY];
        if prior_therapy {
            keys.push(PRIOR_MEDICATION);
        }
        if group.takes_screening() {
            keys.extend(SCREENING_ITEMS.iter().map(|(key, _)| *key));
        }
        keys.extend([PREFERRED_DATE, PREFERRED_SLOT]);
        keys
    }

    /// Only widget-level constraints are enforced here: the date may not
    /// precede `today` and the slot must come from [`TIME_SLOTS`].
    pub fn from_fields(
        values: &FieldValues,
        group: AgeGroup,
        today: NaiveDate,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let prior_therapy = flag_value(values, PRIOR_THERAPY);
        let prior_medication = prior_therapy.then(|| flag_value(values, PRIOR_MEDICATION));

        let screening = if group.takes_screening() {
            match Screening::from_fields(values) {
                Ok(screening) => Some(screening),
                Err(failures) => {
                    for message in failures.into_messages() {
                        errors.push(message);
                    }
                    None
                }
            }
        } else {
            None
        };

        let preferred_date =
            match NaiveDate::parse_from_str(&text_value(values, PREFERRED_DATE), DATE_FORMAT) {
                Ok(date) if date < today => {
                    errors.push("La fecha de la cita no puede ser anterior a hoy.");
                    date
                }
                Ok(date) => date,
                Err(_) => {
                    errors.push("Indique una fecha de cita válida (AAAA-MM-DD).");
                    today
                }
            };

        let slot = text_value(values, PREFERRED_SLOT);
        if !TIME_SLOTS.contains(&slot.as_str()) {
            errors.push("Seleccione un horario de la lista.");
        }

        errors.into_result(Self {
            reason: text_value(values, REASON),
            prior_therapy,
            prior_medication,
            screening,
            preferred_date,
            preferred_slot: slot,
        })
    }

    pub fn mood_score(&self) -> u8 {
        self.screening.map(|s| s.mood_total()).unwrap_or(0)
    }

    pub fn anxiety_score(&self) -> u8 {
        self.screening.map(|s| s.anxiety_total()).unwrap_or(0)
    }
}
