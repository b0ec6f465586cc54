mod common;

use chrono::{Duration, Local};
use common::{WizardHarness, INTAKE_STORE};
use regex::Regex;

fn appointment_date() -> String {
    (Local::now().date_naive() + Duration::days(7))
        .format("%Y-%m-%d")
        .to_string()
}

const ADULT_MENUS: [&str; 11] = [
    "ENTER",      // not urgent
    "ENTER",      // employment
    "ENTER",      // referral channel
    "ENTER",      // no prior therapy
    "DOWN,ENTER", // PHQ-2 interest
    "DOWN,ENTER", // PHQ-2 mood
    "DOWN,ENTER", // GAD-2 nerves
    "DOWN,ENTER", // GAD-2 worry
    "ENTER",      // time slot
    "DOWN,ENTER", // submit
    "DOWN,ENTER", // exit
];

fn adult_inputs(date: &str) -> Vec<String> {
    [
        "Carlos Ruiz",
        "30",
        "Av. Arequipa 123",
        "Lima",
        "987654321",
        "<BLANK>",
        "Dificultad para dormir",
        date,
    ]
    .iter()
    .map(|value| value.to_string())
    .collect()
}

fn run_adult(harness: &WizardHarness) -> String {
    let date = appointment_date();
    let inputs = adult_inputs(&date);
    let inputs: Vec<&str> = inputs.iter().map(String::as_str).collect();
    harness.run("ficha", &ADULT_MENUS, &inputs).stdout
}

#[test]
fn adult_intake_issues_first_case_id() {
    let harness = WizardHarness::new();
    let stdout = run_adult(&harness);

    let id_shape = Regex::new(r"Código de caso: PS-\d{4}-0001").unwrap();
    assert!(id_shape.is_match(&stdout), "missing case id\n{stdout}");
    // Review shows scores and the date the way the row stores them.
    let mood_row = Regex::new(r"(?m)PHQ-2 \(ánimo, 0-6\) +2$").unwrap();
    assert!(mood_row.is_match(&stdout), "{stdout}");
    assert!(stdout.contains(&appointment_date()));
    let final_id = Regex::new(r"ID de caso +PS-\d{4}-0001").unwrap();
    assert!(final_id.is_match(&stdout), "final table lacks the case id\n{stdout}");
    assert!(!stdout.contains("Responsable"));
    assert!(!stdout.contains("SAMU"));

    let contents = harness.store_contents(INTAKE_STORE).expect("store written");
    let mut lines = contents.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("id_caso,fecha_registro,es_emergencia,nombre_paciente"));
    assert!(header.ends_with("phq2_score,gad2_score,fecha_cita_pref,hora_cita_pref"));
    let row = lines.next().unwrap();
    assert!(Regex::new(r"^PS-\d{4}-0001,").unwrap().is_match(row), "{row}");
    assert!(row.contains(",No,Carlos Ruiz,30,Adulto,Av. Arequipa 123,Lima,Carlos Ruiz,"));
    assert!(row.contains(",No aplica,No aplica,No aplica,No,No aplica,Dificultad para dormir,2,2,"));
    assert!(row.ends_with(&format!("{},09:00 - 11:00", appointment_date())));
    assert!(lines.next().is_none());
}

#[test]
fn second_intake_gets_next_number() {
    let harness = WizardHarness::new();
    run_adult(&harness);
    let stdout = run_adult(&harness);

    assert!(
        Regex::new(r"Código de caso: PS-\d{4}-0002")
            .unwrap()
            .is_match(&stdout),
        "{stdout}"
    );
    let contents = harness.store_contents(INTAKE_STORE).unwrap();
    assert_eq!(contents.lines().count(), 3);
}

#[test]
fn urgent_minor_intake_collects_guardian_and_reminds_contacts() {
    let harness = WizardHarness::new();
    let date = appointment_date();
    let output = harness.run(
        "ficha",
        &[
            "DOWN,ENTER", // urgent
            "ENTER",      // employment
            "ENTER",      // referral channel
            "DOWN,ENTER", // prior therapy: yes
            "ENTER",      // prior medication: no
            "ENTER",      // time slot
            "DOWN,ENTER", // submit
            "DOWN,ENTER", // exit
        ],
        &[
            "Lucía Pérez",
            "9",
            "<BLANK>",
            "Arequipa",
            "Rosa Pérez",
            "959111222",
            "Inquieta en clase",
            "Cuarto grado",
            "<BLANK>",
            "Problemas de atención",
            &date,
        ],
    );

    assert!(output.stdout.contains("Responsable"));
    assert!(output.stdout.contains("Niñez"));
    assert!(!output.stdout.contains("PHQ-2"));
    assert!(output.stdout.contains("SAMU: 106"));

    let contents = harness.store_contents(INTAKE_STORE).expect("store written");
    let row = contents.lines().nth(1).unwrap();
    assert!(row.contains(",Sí,Lucía Pérez,9,Niñez,,Arequipa,Rosa Pérez,959111222,"));
    assert!(row.contains(",No aplica,Inquieta en clase,Cuarto grado,Sí,No,Problemas de atención,0,0,"));
}

#[test]
fn escape_on_first_general_field_ends_session() {
    let harness = WizardHarness::new();
    let output = harness.run("ficha", &["ENTER"], &["<ESC>"]);
    assert!(output.stdout.contains("Sesión finalizada."));
    assert!(harness.store_contents(INTAKE_STORE).is_none());
}

#[test]
fn escape_on_first_clinical_field_returns_to_general_data() {
    let harness = WizardHarness::new();
    let output = harness.run(
        "ficha",
        &["ENTER", "ENTER", "ENTER"],
        &[
            "Carlos Ruiz",
            "30",
            "Av. Arequipa 123",
            "Lima",
            "987654321",
            "<BLANK>",
            "<ESC>",
            "<ESC>",
        ],
    );
    assert_eq!(output.stdout.matches("=== Datos generales ===").count(), 2);
    assert_eq!(output.stdout.matches("=== Datos clínicos ===").count(), 1);
    assert!(harness.store_contents(INTAKE_STORE).is_none());
}

#[test]
fn short_phone_is_reported() {
    let harness = WizardHarness::new();
    let output = harness.run(
        "ficha",
        &["ENTER", "ENTER", "ENTER"],
        &[
            "Carlos Ruiz",
            "30",
            "<BLANK>",
            "Lima",
            "123",
            "<BLANK>",
            "<ESC>",
        ],
    );
    assert!(output
        .stdout
        .contains("El teléfono de contacto debe tener al menos 6 caracteres."));
    assert!(!output.stdout.contains("Datos clínicos"));
}
