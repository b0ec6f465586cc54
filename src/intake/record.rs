//! Flat records written to the tabular store and the correlative case id.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use super::clinical::{ClinicalData, DATE_FORMAT};
use super::general::GeneralData;
use super::{flag_label, FieldValues};
use crate::errors::IntakeError;

/// Written in narrative and medication columns that do not apply to a record.
pub const NOT_APPLICABLE: &str = "No aplica";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A record that flattens into a fixed set of named columns.
///
/// `to_map` is the plain mapping handed to any consumer of finished records;
/// the store only keeps the keys listed in `COLUMNS`, in that order.
pub trait FlatRecord {
    const COLUMNS: &'static [&'static str];

    fn to_map(&self) -> FieldValues;

    fn to_row(&self) -> Vec<String> {
        let map = self.to_map();
        Self::COLUMNS
            .iter()
            .map(|column| map.get(*column).cloned().unwrap_or_default())
            .collect()
    }
}

/// Correlative case identifier rendered as `PS-<year>-<sequence:04>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseId {
    year: i32,
    sequence: u32,
}

impl CaseId {
    pub const PREFIX: &'static str = "PS";

    pub fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:04}", Self::PREFIX, self.year, self.sequence)
    }
}

impl FromStr for CaseId {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IntakeError::InvalidInput(format!("`{s}` is not a case id"));
        let mut parts = s.trim().split('-');
        let (Some(prefix), Some(year), Some(sequence), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let digits = |part: &str, min: usize| {
            part.len() >= min && part.chars().all(|ch| ch.is_ascii_digit())
        };
        if prefix != Self::PREFIX || year.len() != 4 || !digits(year, 4) || !digits(sequence, 4) {
            return Err(invalid());
        }
        Ok(Self {
            year: year.parse().map_err(|_| invalid())?,
            sequence: sequence.parse().map_err(|_| invalid())?,
        })
    }
}

/// Everything collected by the intake flow before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeDraft {
    pub urgent: bool,
    pub general: GeneralData,
    pub clinical: ClinicalData,
}

/// Finished intake as persisted; never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeRecord {
    pub case_id: CaseId,
    pub registered_at: NaiveDateTime,
    pub draft: IntakeDraft,
}

impl IntakeRecord {
    pub fn new(case_id: CaseId, registered_at: NaiveDateTime, draft: IntakeDraft) -> Self {
        Self {
            case_id,
            registered_at,
            draft,
        }
    }
}

impl FlatRecord for IntakeRecord {
    const COLUMNS: &'static [&'static str] = &[
        "id_caso",
        "fecha_registro",
        "es_emergencia",
        "nombre_paciente",
        "edad",
        "grupo_etario",
        "direccion",
        "ciudad",
        "nombre_responsable",
        "telefono_contacto",
        "situacion_laboral_resp",
        "marketing",
        "marketing_detalle",
        "historia_desarrollo",
        "conducta_nino",
        "historia_escolar",
        "historia_previa",
        "medicacion_previa",
        "motivo_consulta",
        "phq2_score",
        "gad2_score",
        "fecha_cita_pref",
        "hora_cita_pref",
    ];

    fn to_map(&self) -> FieldValues {
        let general = &self.draft.general;
        let clinical = &self.draft.clinical;
        let narrative = &general.narrative;
        let or_not_applicable =
            |value: Option<&str>| value.unwrap_or(NOT_APPLICABLE).to_string();

        [
            ("id_caso", self.case_id.to_string()),
            (
                "fecha_registro",
                self.registered_at.format(TIMESTAMP_FORMAT).to_string(),
            ),
            ("es_emergencia", flag_label(self.draft.urgent).to_string()),
            ("nombre_paciente", general.patient_name.clone()),
            ("edad", general.age.to_string()),
            ("grupo_etario", general.group().label().to_string()),
            ("direccion", general.address.clone()),
            ("ciudad", general.city.clone()),
            ("nombre_responsable", general.contact.responsible_name.clone()),
            ("telefono_contacto", general.contact.phone.clone()),
            ("situacion_laboral_resp", general.contact.employment.clone()),
            ("marketing", general.referral.channel.clone()),
            ("marketing_detalle", general.referral.detail.clone()),
            (
                "historia_desarrollo",
                or_not_applicable(narrative.developmental_history()),
            ),
            ("conducta_nino", or_not_applicable(narrative.behavior())),
            ("historia_escolar", or_not_applicable(narrative.school_history())),
            ("historia_previa", flag_label(clinical.prior_therapy).to_string()),
            (
                "medicacion_previa",
                or_not_applicable(clinical.prior_medication.map(flag_label)),
            ),
            ("motivo_consulta", clinical.reason.clone()),
            ("phq2_score", clinical.mood_score().to_string()),
            ("gad2_score", clinical.anxiety_score().to_string()),
            (
                "fecha_cita_pref",
                clinical.preferred_date.format(DATE_FORMAT).to_string(),
            ),
            ("hora_cita_pref", clinical.preferred_slot.clone()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::age::AgeNarrative;
    use crate::intake::general::{ContactInfo, Referral};
    use chrono::NaiveDate;

    fn draft(age: u8, narrative: AgeNarrative) -> IntakeDraft {
        IntakeDraft {
            urgent: false,
            general: GeneralData {
                patient_name: "Ana Lopez".into(),
                age,
                address: "Jr. Los Pinos 45".into(),
                city: "Arequipa".into(),
                contact: ContactInfo {
                    responsible_name: "Rosa Lopez".into(),
                    phone: "954123456".into(),
                    employment: "Dependiente".into(),
                },
                narrative,
                referral: Referral {
                    channel: "Recomendación".into(),
                    detail: String::new(),
                },
            },
            clinical: ClinicalData {
                reason: "Rabietas frecuentes".into(),
                prior_therapy: false,
                prior_medication: None,
                screening: None,
                preferred_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                preferred_slot: "09:00 - 11:00".into(),
            },
        }
    }

    fn registered_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 20)
            .unwrap()
            .and_hms_opt(16, 5, 9)
            .unwrap()
    }

    #[test]
    fn case_ids_pad_sequence_to_four_digits() {
        assert_eq!(CaseId::new(2025, 1).to_string(), "PS-2025-0001");
        assert_eq!(CaseId::new(2025, 42).to_string(), "PS-2025-0042");
        assert_eq!(CaseId::new(2025, 12345).to_string(), "PS-2025-12345");
    }

    #[test]
    fn case_ids_parse_back() {
        let id: CaseId = "PS-2024-0042".parse().unwrap();
        assert_eq!(id.year(), 2024);
        assert_eq!(id.sequence(), 42);
        assert!("PS-24-0042".parse::<CaseId>().is_err());
        assert!("XX-2024-0042".parse::<CaseId>().is_err());
        assert!("PS-2024-42".parse::<CaseId>().is_err());
        assert!("PS-2024-0042-1".parse::<CaseId>().is_err());
    }

    #[test]
    fn child_record_marks_other_bands_not_applicable() {
        let narrative = AgeNarrative::Childhood {
            behavior: "Inquieta".into(),
            school_history: "Cuarto grado".into(),
        };
        let record = IntakeRecord::new(CaseId::new(2025, 3), registered_at(), draft(9, narrative));
        let map = record.to_map();
        assert_eq!(map["id_caso"], "PS-2025-0003");
        assert_eq!(map["fecha_registro"], "2025-06-20 16:05:09");
        assert_eq!(map["nombre_paciente"], "Ana Lopez");
        assert_eq!(map["edad"], "9");
        assert_eq!(map["grupo_etario"], "Niñez");
        assert_eq!(map["historia_desarrollo"], NOT_APPLICABLE);
        assert_eq!(map["conducta_nino"], "Inquieta");
        assert_eq!(map["historia_escolar"], "Cuarto grado");
        assert_eq!(map["medicacion_previa"], NOT_APPLICABLE);
        assert_eq!(map["phq2_score"], "0");
        assert_eq!(map["es_emergencia"], "No");
    }

    #[test]
    fn row_follows_column_order() {
        let record = IntakeRecord::new(
            CaseId::new(2025, 1),
            registered_at(),
            draft(3, AgeNarrative::EarlyChildhood {
                developmental_history: "Habla tardía".into(),
            }),
        );
        let row = record.to_row();
        assert_eq!(row.len(), IntakeRecord::COLUMNS.len());
        assert_eq!(row[0], "PS-2025-0001");
        assert_eq!(row[5], "Primera Infancia");
        assert_eq!(row[13], "Habla tardía");
        assert_eq!(row[22], "09:00 - 11:00");
    }
}
