//! Form descriptors for the two flows.

use chrono::NaiveDate;

use crate::cli::forms::{FieldDescriptor, FieldKind, FormDescriptor, Validator};
use crate::intake::{
    clinical::{self, ClinicalData},
    flag_value,
    general::{self, GeneralData},
    number_value,
    pre_registration as pre,
    screening::SCREENING_ITEMS,
    AgeGroup, FieldValues, EMPLOYMENT_OPTIONS, LIKERT_LABELS, MAX_AGE, REFERRAL_CHANNELS,
    REFERRAL_OPTIONS, TIME_SLOTS, YES_NO_OPTIONS,
};

fn options(labels: &[&str]) -> FieldKind {
    FieldKind::Choice(labels.iter().map(|label| label.to_string()).collect())
}

fn text(key: &'static str, label: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(key, label, FieldKind::Text, Validator::None)
}

fn age_field(key: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(
        key,
        "Edad",
        FieldKind::Integer,
        Validator::IntegerRange {
            min: 0,
            max: i64::from(MAX_AGE),
        },
    )
}

/// Short pre-registration. Fields are optional at the widget level; the
/// whole form is checked on submit so every problem is listed together.
pub fn pre_registration_form() -> FormDescriptor {
    FormDescriptor::new(
        "pre_registro",
        vec![
            text(pre::NAME, "Nombre completo").with_optional(),
            age_field(pre::AGE).with_optional(),
            text(pre::REASON, "Motivo de consulta")
                .with_optional()
                .with_help("Describa brevemente por qué busca atención."),
            FieldDescriptor::new(
                pre::REFERRAL,
                "¿Cómo nos conoció?",
                options(&REFERRAL_OPTIONS),
                Validator::None,
            ),
            text(pre::REGION, "Región").with_optional(),
            text(pre::CITY, "Ciudad").with_optional(),
            text(pre::DISTRICT, "Distrito").with_optional(),
            text(pre::PHONE, "Teléfono").with_optional(),
        ],
    )
}

fn shown_for_age(key: &'static str) -> impl Fn(&FieldValues) -> bool + Send + Sync {
    move |values| {
        number_value(values, general::AGE)
            .is_some_and(|age| GeneralData::visible_keys(age).contains(&key))
    }
}

pub fn general_data_form() -> FormDescriptor {
    use crate::intake::age::{CHILD_BEHAVIOR, DEVELOPMENTAL_HISTORY, SCHOOL_HISTORY};

    FormDescriptor::new(
        "datos_generales",
        vec![
            text(general::PATIENT_NAME, "Nombre del paciente"),
            age_field(general::AGE),
            text(general::ADDRESS, "Dirección").with_optional(),
            text(general::CITY, "Ciudad"),
            text(general::RESPONSIBLE_NAME, "Nombre del responsable")
                .with_help("Padre, madre o tutor legal del menor.")
                .visible_when(shown_for_age(general::RESPONSIBLE_NAME)),
            text(general::CONTACT_PHONE, "Teléfono de contacto")
                .with_help("Si el paciente es menor de edad, indique el del responsable."),
            FieldDescriptor::new(
                general::EMPLOYMENT,
                "Situación laboral",
                options(&EMPLOYMENT_OPTIONS),
                Validator::None,
            ),
            text(DEVELOPMENTAL_HISTORY, "Historia del desarrollo")
                .with_optional()
                .with_help("Embarazo, parto, hitos del desarrollo.")
                .visible_when(shown_for_age(DEVELOPMENTAL_HISTORY)),
            text(CHILD_BEHAVIOR, "Conducta del niño/a")
                .with_optional()
                .visible_when(shown_for_age(CHILD_BEHAVIOR)),
            text(SCHOOL_HISTORY, "Historia escolar")
                .with_optional()
                .visible_when(shown_for_age(SCHOOL_HISTORY)),
            FieldDescriptor::new(
                general::REFERRAL_CHANNEL,
                "¿Cómo nos conoció?",
                options(&REFERRAL_CHANNELS),
                Validator::None,
            ),
            text(general::REFERRAL_DETAIL, "Detalle (opcional)").with_optional(),
        ],
    )
}

fn shown_in_clinical(
    group: AgeGroup,
    key: &'static str,
) -> impl Fn(&FieldValues) -> bool + Send + Sync {
    move |values| {
        ClinicalData::visible_keys(group, flag_value(values, clinical::PRIOR_THERAPY))
            .contains(&key)
    }
}

/// Clinical block; screening items only appear for bands that take it.
pub fn clinical_form(group: AgeGroup, today: NaiveDate) -> FormDescriptor {
    let mut fields = vec![
        text(clinical::REASON, "Motivo de consulta").with_optional(),
        FieldDescriptor::new(
            clinical::PRIOR_THERAPY,
            "¿Ha recibido terapia psicológica antes?",
            options(&YES_NO_OPTIONS),
            Validator::None,
        ),
        FieldDescriptor::new(
            clinical::PRIOR_MEDICATION,
            "¿Recibió medicación psiquiátrica?",
            options(&YES_NO_OPTIONS),
            Validator::None,
        )
        .visible_when(shown_in_clinical(group, clinical::PRIOR_MEDICATION)),
    ];
    fields.extend(SCREENING_ITEMS.iter().map(|&(key, question)| {
        FieldDescriptor::new(key, question, options(&LIKERT_LABELS), Validator::None)
            .with_help("En las últimas dos semanas, ¿con qué frecuencia le ha ocurrido?")
            .visible_when(shown_in_clinical(group, key))
    }));
    fields.push(
        FieldDescriptor::new(
            clinical::PREFERRED_DATE,
            "Fecha preferida para la cita (AAAA-MM-DD)",
            FieldKind::Date,
            Validator::date_not_before(today),
        )
        .with_help("No se aceptan fechas anteriores a hoy."),
    );
    fields.push(FieldDescriptor::new(
        clinical::PREFERRED_SLOT,
        "Horario preferido",
        options(&TIME_SLOTS),
        Validator::None,
    ));

    FormDescriptor::new("datos_clinicos", fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::forms::FormSession;
    use crate::intake::age::{DEVELOPMENTAL_HISTORY, SCHOOL_HISTORY};
    use crate::intake::screening::PHQ2_INTEREST;

    fn visible_keys(form: &FormDescriptor, values: &FieldValues) -> Vec<&'static str> {
        form.fields
            .iter()
            .filter(|field| field.is_visible(values))
            .map(|field| field.key)
            .collect()
    }

    fn with_age(age: &str) -> FieldValues {
        let mut values = FieldValues::new();
        values.insert(general::AGE.into(), age.into());
        values
    }

    #[test]
    fn general_form_matches_domain_visibility() {
        let form = general_data_form();
        for age in [3_u8, 9, 15, 40] {
            let shown = visible_keys(&form, &with_age(&age.to_string()));
            assert_eq!(shown, GeneralData::visible_keys(age), "age {age}");
        }
    }

    #[test]
    fn narrative_fields_switch_with_age() {
        let form = general_data_form();
        let toddler = visible_keys(&form, &with_age("4"));
        assert!(toddler.contains(&DEVELOPMENTAL_HISTORY));
        assert!(!toddler.contains(&SCHOOL_HISTORY));
        let adult = visible_keys(&form, &with_age("30"));
        assert!(!adult.contains(&general::RESPONSIBLE_NAME));
    }

    #[test]
    fn clinical_form_hides_screening_for_children() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let child = clinical_form(AgeGroup::Childhood, today);
        let keys = visible_keys(&child, &FieldValues::new());
        assert_eq!(keys, ClinicalData::visible_keys(AgeGroup::Childhood, false));
        assert!(!keys.contains(&PHQ2_INTEREST));

        let adult = clinical_form(AgeGroup::Adult, today);
        let mut values = FieldValues::new();
        values.insert(clinical::PRIOR_THERAPY.into(), "Sí".into());
        assert_eq!(
            visible_keys(&adult, &values),
            ClinicalData::visible_keys(AgeGroup::Adult, true)
        );
    }

    #[test]
    fn pre_registration_starts_at_name() {
        let form = pre_registration_form();
        let session = FormSession::new(&form, FieldValues::new());
        let step = session.current_field().expect("first field");
        assert_eq!(step.descriptor.key, pre::NAME);
        assert_eq!(step.total, 8);
    }
}
