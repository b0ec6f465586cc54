use serde::{Deserialize, Serialize};

use super::age::{AgeGroup, AgeNarrative};
use super::{char_len, number_value, text_value, FieldValues, ValidationErrors, MAX_AGE};

pub const PATIENT_NAME: &str = "nombre_paciente";
pub const AGE: &str = "edad";
pub const ADDRESS: &str = "direccion";
pub const CITY: &str = "ciudad";
pub const RESPONSIBLE_NAME: &str = "nombre_responsable";
pub const CONTACT_PHONE: &str = "telefono_contacto";
pub const EMPLOYMENT: &str = "situacion_laboral_resp";
pub const REFERRAL_CHANNEL: &str = "marketing";
pub const REFERRAL_DETAIL: &str = "marketing_detalle";

pub const EMPLOYMENT_OPTIONS: [&str; 4] = ["Dependiente", "Independiente", "Desempleado/a", "Otro"];

pub const REFERRAL_CHANNELS: [&str; 5] = [
    "Redes Sociales",
    "Recomendación",
    "Búsqueda en internet",
    "Derivación profesional",
    "Otro",
];

const MIN_NAME_LEN: usize = 2;
const MIN_PHONE_LEN: usize = 6;
const MIN_CITY_LEN: usize = 2;

/// Responsible party for minors; the patient's own data for adults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub responsible_name: String,
    pub phone: String,
    pub employment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub channel: String,
    pub detail: String,
}

/// Demographic block of the full intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralData {
    pub patient_name: String,
    pub age: u8,
    pub address: String,
    pub city: String,
    pub contact: ContactInfo,
    pub narrative: AgeNarrative,
    pub referral: Referral,
}

impl GeneralData {
    /// Keys shown for a patient of `age`, in form order.
    pub fn visible_keys(age: u8) -> Vec<&'static str> {
        let group = AgeGroup::from_age(age);
        let mut keys = vec![PATIENT_NAME, AGE, ADDRESS, CITY];
        if group.is_minor() {
            keys.push(RESPONSIBLE_NAME);
        }
        keys.extend([CONTACT_PHONE, EMPLOYMENT]);
        keys.extend(group.narrative_keys());
        keys.extend([REFERRAL_CHANNEL, REFERRAL_DETAIL]);
        keys
    }

    pub fn from_fields(values: &FieldValues) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let patient_name = text_value(values, PATIENT_NAME);
        if char_len(&patient_name) < MIN_NAME_LEN {
            errors.push("El nombre del paciente debe tener al menos 2 caracteres.");
        }

        let age = match number_value(values, AGE) {
            Some(age) if age <= MAX_AGE => age,
            _ => {
                errors.push(format!("La edad debe estar entre 0 y {MAX_AGE}."));
                0
            }
        };
        let group = AgeGroup::from_age(age);

        let city = text_value(values, CITY);
        if char_len(&city) < MIN_CITY_LEN {
            errors.push("La ciudad debe tener al menos 2 caracteres.");
        }

        let responsible_name = if group.is_minor() {
            let guardian = text_value(values, RESPONSIBLE_NAME);
            if char_len(&guardian) < MIN_NAME_LEN {
                errors.push("El nombre del responsable debe tener al menos 2 caracteres.");
            }
            guardian
        } else {
            patient_name.clone()
        };

        let phone = text_value(values, CONTACT_PHONE);
        if char_len(&phone) < MIN_PHONE_LEN {
            errors.push("El teléfono de contacto debe tener al menos 6 caracteres.");
        }

        let employment = pick_option(&text_value(values, EMPLOYMENT), &EMPLOYMENT_OPTIONS);
        let channel = pick_option(&text_value(values, REFERRAL_CHANNEL), &REFERRAL_CHANNELS);

        errors.into_result(Self {
            patient_name,
            age,
            address: text_value(values, ADDRESS),
            city,
            contact: ContactInfo {
                responsible_name,
                phone,
                employment,
            },
            narrative: AgeNarrative::from_fields(group, values),
            referral: Referral {
                channel,
                detail: text_value(values, REFERRAL_DETAIL),
            },
        })
    }

    pub fn group(&self) -> AgeGroup {
        self.narrative.group()
    }
}

fn pick_option(raw: &str, options: &[&str]) -> String {
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(raw))
        .or_else(|| options.first())
        .map(|option| option.to_string())
        .unwrap_or_default()
}
