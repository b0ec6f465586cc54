use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::record::{FlatRecord, TIMESTAMP_FORMAT};
use super::{text_value, FieldValues, ValidationErrors, MAX_AGE};

pub const NAME: &str = "nombre";
pub const AGE: &str = "edad";
pub const REASON: &str = "motivo";
pub const REFERRAL: &str = "deriva";
pub const REGION: &str = "res_region";
pub const CITY: &str = "res_ciudad";
pub const DISTRICT: &str = "res_distrito";
pub const PHONE: &str = "telefono";

pub const REFERRAL_OPTIONS: [&str; 3] = ["Redes Sociales", "Recomendación", "Otro"];

/// Short pre-registration collected by the triage flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreRegistration {
    pub name: String,
    pub age: u8,
    pub reason: String,
    pub referral: String,
    pub region: String,
    pub city: String,
    pub district: String,
    pub phone: String,
}

impl PreRegistration {
    /// Checks every field and reports all failures at once, in form order.
    pub fn from_fields(values: &FieldValues) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = text_value(values, NAME);
        if name.is_empty() {
            errors.push("El nombre es obligatorio.");
        }

        let raw_age = text_value(values, AGE);
        let age = match raw_age.parse::<i64>() {
            Ok(age) if age > i64::from(MAX_AGE) => {
                errors.push(format!("La edad no puede superar {MAX_AGE} años."));
                0
            }
            Ok(age) => match u8::try_from(age) {
                Ok(age) if age > 0 => age,
                _ => {
                    errors.push("La edad debe ser mayor a 0.");
                    0
                }
            },
            Err(_) if raw_age.is_empty() => {
                errors.push("La edad debe ser mayor a 0.");
                0
            }
            Err(_) => {
                errors.push("La edad debe ser un número entero.");
                0
            }
        };

        let reason = text_value(values, REASON);
        if reason.is_empty() {
            errors.push("El motivo de consulta es obligatorio.");
        }

        let referral = text_value(values, REFERRAL);
        let referral = REFERRAL_OPTIONS
            .iter()
            .find(|option| option.eq_ignore_ascii_case(&referral))
            .unwrap_or(&REFERRAL_OPTIONS[0])
            .to_string();

        let region = text_value(values, REGION);
        if region.is_empty() {
            errors.push("La región es obligatoria.");
        }
        let city = text_value(values, CITY);
        if city.is_empty() {
            errors.push("La ciudad es obligatoria.");
        }
        let district = text_value(values, DISTRICT);
        if district.is_empty() {
            errors.push("El distrito es obligatorio.");
        }
        let phone = text_value(values, PHONE);
        if phone.is_empty() {
            errors.push("El teléfono es obligatorio.");
        }

        errors.into_result(Self {
            name,
            age,
            reason,
            referral,
            region,
            city,
            district,
            phone,
        })
    }

    pub fn location(&self) -> String {
        format!("{} - {} - {}", self.region, self.city, self.district)
    }

    /// Field values suitable for pre-filling the form again.
    pub fn to_fields(&self) -> FieldValues {
        [
            (NAME, self.name.clone()),
            (AGE, self.age.to_string()),
            (REASON, self.reason.clone()),
            (REFERRAL, self.referral.clone()),
            (REGION, self.region.clone()),
            (CITY, self.city.clone()),
            (DISTRICT, self.district.clone()),
            (PHONE, self.phone.clone()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }
}

/// Pre-registration stamped with the moment it was confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRegistrationRecord {
    pub recorded_at: NaiveDateTime,
    pub registration: PreRegistration,
}

impl PreRegistrationRecord {
    pub fn new(registration: PreRegistration, recorded_at: NaiveDateTime) -> Self {
        Self {
            recorded_at,
            registration,
        }
    }
}

impl FlatRecord for PreRegistrationRecord {
    const COLUMNS: &'static [&'static str] = &[
        "fecha", "nombre", "edad", "motivo", "deriva", "region", "ciudad", "distrito", "telefono",
    ];

    fn to_map(&self) -> FieldValues {
        let data = &self.registration;
        [
            ("fecha", self.recorded_at.format(TIMESTAMP_FORMAT).to_string()),
            ("nombre", data.name.clone()),
            ("edad", data.age.to_string()),
            ("motivo", data.reason.clone()),
            ("deriva", data.referral.clone()),
            ("region", data.region.clone()),
            ("ciudad", data.city.clone()),
            ("distrito", data.district.clone()),
            ("telefono", data.phone.clone()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }
}
