//! Read-only presentations of collected data: review rows, the two-column
//! table and the copy-paste block handed to the clinic's external sheet.
//!
//! Review values are written exactly as the store writes them, so what the
//! user confirms is what ends up in the row.

pub mod table;

use crate::intake::clinical::DATE_FORMAT;
use crate::intake::{flag_label, CaseId, IntakeDraft, PreRegistration, NOT_APPLICABLE};
use table::{Table, TableColumn};

/// Longer values continue on the next line of the value column.
const VALUE_WIDTH: usize = 60;

pub type SummaryRow = (String, String);

fn row(label: &str, value: impl ToString) -> SummaryRow {
    (label.to_string(), value.to_string())
}

pub fn pre_registration_rows(data: &PreRegistration) -> Vec<SummaryRow> {
    vec![
        row("Nombre", &data.name),
        row("Edad", data.age),
        row("Motivo", &data.reason),
        row("Deriva", &data.referral),
        row("Región", &data.region),
        row("Ciudad", &data.city),
        row("Distrito", &data.district),
        row("Teléfono", &data.phone),
    ]
}

/// Review rows for the full intake. Only the narrative of the patient's age
/// band is listed; the case id row is added once one has been issued.
pub fn intake_rows(draft: &IntakeDraft, case_id: Option<CaseId>) -> Vec<SummaryRow> {
    let general = &draft.general;
    let clinical = &draft.clinical;
    let mut rows = Vec::new();

    if let Some(case_id) = case_id {
        rows.push(row("ID de caso", case_id));
    }
    rows.push(row("Emergencia declarada", flag_label(draft.urgent)));
    rows.push(row("Paciente", &general.patient_name));
    rows.push(row("Edad", general.age));
    rows.push(row("Grupo etario", general.group()));
    rows.push(row("Dirección", &general.address));
    rows.push(row("Ciudad", &general.city));
    if general.group().is_minor() {
        rows.push(row("Responsable", &general.contact.responsible_name));
    }
    rows.push(row("Teléfono de contacto", &general.contact.phone));
    rows.push(row("Situación laboral", &general.contact.employment));

    let narrative = &general.narrative;
    if let Some(history) = narrative.developmental_history() {
        rows.push(row("Historia del desarrollo", history));
    }
    if let Some(behavior) = narrative.behavior() {
        rows.push(row("Conducta", behavior));
    }
    if let Some(school) = narrative.school_history() {
        rows.push(row("Historia escolar", school));
    }

    rows.push(row("Cómo nos conoció", &general.referral.channel));
    if !general.referral.detail.is_empty() {
        rows.push(row("Detalle", &general.referral.detail));
    }

    rows.push(row("Motivo de consulta", &clinical.reason));
    rows.push(row("Terapia previa", flag_label(clinical.prior_therapy)));
    rows.push(row(
        "Medicación previa",
        clinical.prior_medication.map(flag_label).unwrap_or(NOT_APPLICABLE),
    ));
    if clinical.screening.is_some() {
        rows.push(row("PHQ-2 (ánimo, 0-6)", clinical.mood_score()));
        rows.push(row("GAD-2 (ansiedad, 0-6)", clinical.anxiety_score()));
    }
    rows.push(row(
        "Fecha preferida",
        clinical.preferred_date.format(DATE_FORMAT),
    ));
    rows.push(row("Horario preferido", &clinical.preferred_slot));
    rows
}

pub fn render_table(rows: &[SummaryRow], plain: bool) -> String {
    let columns = vec![
        TableColumn::new("Campo"),
        TableColumn::new("Valor").wrapping_at(VALUE_WIDTH),
    ];
    let cells = rows
        .iter()
        .map(|(label, value)| vec![label.clone(), value.clone()])
        .collect();
    Table::new(columns, cells).plain(plain).render()
}

/// Fixed-template block for pasting into the clinic's intake sheet.
pub fn copy_block(data: &PreRegistration) -> String {
    format!(
        "PSICOSYSTEM\n\
         PACIENTE: {} | EDAD: {}\n\
         MOTIVO: {}\n\
         DERIVA: {}\n\
         RESIDENCIA: {}\n\
         TEL: {}\n\
         ORIGEN: PSICOSYSTEM_WEB",
        data.name,
        data.age,
        data.reason,
        data.referral,
        data.location(),
        data.phone
    )
}
