//! Terminal screens for both flows. Each loop renders the current screen,
//! turns the user's choice into an event, runs it through the flow's
//! controller and executes the returned effects.

use std::collections::VecDeque;
use std::path::Path;
use std::str::FromStr;

use chrono::{Datelike, Local};
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::cli::forms::{FormEngine, FormResult, WizardInteraction};
use crate::cli::output::{self, OutputPreferences};
use crate::cli::ui::action_menu;
use crate::cli::wizards::{clinical_form, general_data_form, pre_registration_form};
use crate::config::{Config, ConfigManager, Flow};
use crate::errors::CliError;
use crate::intake::{AgeGroup, IntakeRecord, PreRegistrationRecord};
use crate::storage::FlatStore;
use crate::summary::{copy_block, intake_rows, pre_registration_rows, render_table};
use crate::utils::build_info;
use crate::wizard::intake::{self, IntakeEvent, IntakeScreen, IntakeSession};
use crate::wizard::triage::{
    self, SaveOutcome, TriageAnswer, TriageEvent, TriageScreen, TriageSession, EMERGENCY_CONTACTS,
};
use crate::wizard::Effect;

const SESSION_ENDED: &str = "Sesión finalizada.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Run(Option<Flow>),
    Version,
    Help,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, CliError> {
    let args: Vec<String> = args.into_iter().collect();
    match args.as_slice() {
        [] => Ok(Command::Run(None)),
        [single] => match single.as_str() {
            "--version" | "-V" => Ok(Command::Version),
            "--help" | "-h" => Ok(Command::Help),
            flow => Flow::from_str(flow)
                .map(|flow| Command::Run(Some(flow)))
                .map_err(CliError::from),
        },
        _ => Err(CliError::Input(
            "se esperaba a lo sumo un argumento (triaje o ficha)".into(),
        )),
    }
}

fn print_usage() {
    println!("Uso: psicosystem [triaje|ficha|--version]");
    println!();
    println!("  triaje     Triaje de emergencia y pre-registro breve");
    println!("  ficha      Ficha de ingreso completa con código de caso");
    println!("  --version  Muestra la información de compilación");
}

/// Entry point used by the binary. `args` excludes the program name.
pub fn run_cli<I: IntoIterator<Item = String>>(args: I) -> Result<(), CliError> {
    match parse_args(args)? {
        Command::Version => {
            for line in build_info::current().report() {
                println!("{line}");
            }
            Ok(())
        }
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Run(flow) => {
            let manager = ConfigManager::new()?;
            let config = manager.load()?;
            output::set_preferences(OutputPreferences::from(&config));
            let flow = flow.unwrap_or(config.flow);
            App::new(config, manager.base_dir()).run(flow)
        }
    }
}

/// Shared state for one process: configuration and the two stores.
pub struct App {
    config: Config,
    triage_store: FlatStore,
    intake_store: FlatStore,
}

impl App {
    pub fn new(config: Config, home: &Path) -> Self {
        let triage_store = FlatStore::new(config.triage_store_path(home));
        let intake_store = FlatStore::new(config.intake_store_path(home));
        Self {
            config,
            triage_store,
            intake_store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self, flow: Flow) -> Result<(), CliError> {
        let session_id = Uuid::new_v4();
        let span = info_span!("wizard", %session_id, %flow);
        let _entered = span.enter();
        info!("session started");

        let result = match flow {
            Flow::Triage => self.run_triage(),
            Flow::Intake => self.run_intake(),
        };
        output::info(SESSION_ENDED);
        info!("session ended");
        result
    }

    fn plain(&self) -> bool {
        let prefs = output::current_preferences();
        prefs.plain_mode || prefs.screen_reader_mode
    }

    fn run_triage(&self) -> Result<(), CliError> {
        let mut session = TriageSession::default();
        let mut interaction = WizardInteraction::new();

        loop {
            let event = match session.screen {
                TriageScreen::Triage => triage_question()?,
                TriageScreen::Emergency => emergency_screen()?,
                TriageScreen::Form => {
                    output::section("Ficha de Pre-registro");
                    output::info("Por favor complete todos los datos solicitados.");
                    let form = pre_registration_form();
                    match FormEngine::new(&form).run(&mut interaction, session.fields.clone()) {
                        FormResult::Completed(values) => Some(TriageEvent::Submit(values)),
                        FormResult::Cancelled => None,
                    }
                }
                TriageScreen::Review => self.triage_review(&session)?,
                TriageScreen::Final => self.triage_final(&session)?,
            };
            let Some(event) = event else {
                return Ok(());
            };

            let mut pending = VecDeque::from([event]);
            while let Some(event) = pending.pop_front() {
                for effect in triage::handle(&mut session, event).effects {
                    match effect {
                        Effect::Persist(registration) => {
                            let record =
                                PreRegistrationRecord::new(registration, Local::now().naive_local());
                            pending.push_back(match self.triage_store.append(&record) {
                                Ok(()) => TriageEvent::Saved,
                                Err(err) => {
                                    error!(error = %err, "pre-registration write failed");
                                    TriageEvent::SaveFailed(err.detail().to_string())
                                }
                            });
                        }
                        other => show_effect(other),
                    }
                }
            }
        }
    }

    fn triage_review(&self, session: &TriageSession) -> Result<Option<TriageEvent>, CliError> {
        let Some(registration) = session.registration.as_ref() else {
            return Ok(Some(TriageEvent::Correct));
        };
        output::section("Revisión de Datos");
        output::info("Por favor verifique que la información sea correcta.");
        output::block(&render_table(
            &pre_registration_rows(registration),
            self.plain(),
        ));
        let choice = action_menu(
            "¿Los datos son correctos?",
            &[],
            &[
                ("correct", "Corregir", "Volver al formulario"),
                ("confirm", "Confirmar y guardar", "Registrar el pre-registro"),
            ],
        )?;
        Ok(choice.map(|key| match key.as_str() {
            "confirm" => TriageEvent::Confirm,
            _ => TriageEvent::Correct,
        }))
    }

    fn triage_final(&self, session: &TriageSession) -> Result<Option<TriageEvent>, CliError> {
        output::section("Pre-registro");
        match &session.outcome {
            Some(outcome @ SaveOutcome::Saved) => output::success(outcome.message()),
            Some(outcome @ SaveOutcome::Failed(_)) => output::error(outcome.message()),
            None => {}
        }
        if let Some(registration) = session.registration.as_ref() {
            output::info("Copie el siguiente bloque en la ficha de la clínica:");
            output::blank_line();
            output::block(&copy_block(registration));
            output::blank_line();
        }
        finish_menu(TriageEvent::Home)
    }

    fn run_intake(&self) -> Result<(), CliError> {
        let mut session = IntakeSession::default();
        let mut interaction = WizardInteraction::new();

        loop {
            let event = match session.screen {
                IntakeScreen::Intro => intake_intro()?,
                IntakeScreen::GeneralData => {
                    output::section("Datos generales");
                    let form = general_data_form();
                    match FormEngine::new(&form)
                        .run(&mut interaction, session.general_fields.clone())
                    {
                        FormResult::Completed(values) => Some(IntakeEvent::SubmitGeneral(values)),
                        FormResult::Cancelled => None,
                    }
                }
                IntakeScreen::Clinical => {
                    output::section("Datos clínicos");
                    let group = session
                        .general
                        .as_ref()
                        .map_or(AgeGroup::Adult, |general| general.group());
                    let today = Local::now().date_naive();
                    let form = clinical_form(group, today);
                    match FormEngine::new(&form)
                        .run(&mut interaction, session.clinical_fields.clone())
                    {
                        FormResult::Completed(values) => {
                            Some(IntakeEvent::SubmitClinical { values, today })
                        }
                        // ESC on the first clinical field steps back to general data.
                        FormResult::Cancelled => Some(IntakeEvent::Back),
                    }
                }
                IntakeScreen::Review => self.intake_review(&session)?,
                IntakeScreen::Final => self.intake_final(&session)?,
            };
            let Some(event) = event else {
                return Ok(());
            };

            let mut pending = VecDeque::from([event]);
            while let Some(event) = pending.pop_front() {
                for effect in intake::handle(&mut session, event).effects {
                    match effect {
                        Effect::Persist(draft) => {
                            let now = Local::now().naive_local();
                            let written = self.intake_store.append_numbered(
                                now.year(),
                                self.config.counter_scope,
                                |case_id| IntakeRecord::new(case_id, now, draft),
                            );
                            pending.push_back(match written {
                                Ok(record) => IntakeEvent::Persisted(record.case_id),
                                Err(err) => {
                                    error!(error = %err, "intake write failed");
                                    IntakeEvent::PersistFailed(err.detail().to_string())
                                }
                            });
                        }
                        other => show_effect(other),
                    }
                }
            }
        }
    }

    fn intake_review(&self, session: &IntakeSession) -> Result<Option<IntakeEvent>, CliError> {
        let Some(draft) = session.draft() else {
            return Ok(Some(IntakeEvent::Correct));
        };
        output::section("Revisión de la ficha");
        output::block(&render_table(&intake_rows(&draft, None), self.plain()));
        let choice = action_menu(
            "¿Desea enviar la ficha?",
            &[],
            &[
                ("correct", "Corregir", "Volver a los datos clínicos"),
                ("submit", "Enviar", "Registrar la ficha y obtener el código de caso"),
            ],
        )?;
        Ok(choice.map(|key| match key.as_str() {
            "submit" => IntakeEvent::Submit,
            _ => IntakeEvent::Correct,
        }))
    }

    fn intake_final(&self, session: &IntakeSession) -> Result<Option<IntakeEvent>, CliError> {
        output::section("Ficha registrada");
        if let Some(case_id) = session.case_id {
            output::success(format!("Código de caso: {case_id}"));
            output::info("Conserve este código para sus próximas comunicaciones.");
        }
        if let Some(draft) = session.draft() {
            output::blank_line();
            output::block(&render_table(
                &intake_rows(&draft, session.case_id),
                self.plain(),
            ));
        }
        if session.urgent {
            output::blank_line();
            output::warning(
                "Indicó que se trata de una situación urgente. PsicoSystem no atiende emergencias; si hay riesgo inmediato contacte a:",
            );
            print_emergency_contacts();
        }
        output::blank_line();
        finish_menu(IntakeEvent::Home)
    }
}

fn show_effect<P>(effect: Effect<P>) {
    match effect {
        Effect::Warn(message) => output::warning(message),
        Effect::ShowErrors(messages) => {
            output::error("Revise los siguientes datos:");
            for message in messages {
                output::error(format!("- {message}"));
            }
        }
        Effect::Reset => output::info("Nueva sesión iniciada."),
        Effect::Persist(_) => {}
    }
}

fn print_emergency_contacts() {
    for (name, number) in EMERGENCY_CONTACTS {
        output::info(format!("{name}: {number}"));
    }
}

fn triage_question() -> Result<Option<TriageEvent>, CliError> {
    output::section("PsicoSystem - Triaje Psicológico");
    let actions: Vec<(&str, &str, &str)> = TriageAnswer::ALL
        .iter()
        .map(|answer| (answer.label(), answer.label(), ""))
        .collect();
    let choice = action_menu(
        "¿Consideras que tu situación es una emergencia?",
        &["Responda antes de continuar con el pre-registro.".to_string()],
        &actions,
    )?;
    Ok(choice.map(|key| {
        let answer = TriageAnswer::ALL
            .into_iter()
            .find(|answer| answer.label() == key)
            .unwrap_or_default();
        TriageEvent::Continue(answer)
    }))
}

fn intake_intro() -> Result<Option<IntakeEvent>, CliError> {
    output::section("Ficha de Ingreso - PsicoSystem");
    output::info("Complete los datos del paciente. Al finalizar recibirá un código de caso.");
    let choice = action_menu(
        "¿Se trata de una situación urgente?",
        &["PsicoSystem no atiende emergencias; la respuesta solo queda registrada.".to_string()],
        &[
            ("no", "No, continuar", "Iniciar la ficha"),
            ("yes", "Sí, es urgente", "Registrar la urgencia e iniciar la ficha"),
        ],
    )?;
    Ok(choice.map(|key| IntakeEvent::Start {
        urgent: key == "yes",
    }))
}

fn emergency_screen() -> Result<Option<TriageEvent>, CliError> {
    output::section("PROTOCOLO DE SEGURIDAD ACTIVADO");
    output::error("PsicoSystem no atiende emergencias. Contacta inmediatamente a:");
    print_emergency_contacts();
    let choice = action_menu(
        "¿Qué desea hacer?",
        &[],
        &[
            ("back", "Volver al inicio", ""),
            ("exit", "Salir", ""),
        ],
    )?;
    Ok(choice
        .filter(|key| key == "back")
        .map(|_| TriageEvent::BackToStart))
}

/// Final-screen menu shared by both flows.
fn finish_menu<E>(home: E) -> Result<Option<E>, CliError> {
    let choice = action_menu(
        "¿Qué desea hacer ahora?",
        &[],
        &[
            ("home", "Inicio", "Comenzar una nueva sesión"),
            ("exit", "Salir", ""),
        ],
    )?;
    Ok(choice.filter(|key| key == "home").map(|_| home))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn arguments_select_the_flow() {
        assert_eq!(parse_args(args(&[])).unwrap(), Command::Run(None));
        assert_eq!(
            parse_args(args(&["ficha"])).unwrap(),
            Command::Run(Some(Flow::Intake))
        );
        assert_eq!(
            parse_args(args(&["TRIAJE"])).unwrap(),
            Command::Run(Some(Flow::Triage))
        );
        assert_eq!(parse_args(args(&["--version"])).unwrap(), Command::Version);
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse_args(args(&["agenda"])).is_err());
        assert!(matches!(
            parse_args(args(&["triaje", "ficha"])),
            Err(CliError::Input(_))
        ));
    }

    #[test]
    fn app_places_stores_under_home() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(Config::default(), dir.path());
        assert_eq!(
            app.triage_store.path(),
            dir.path().join(crate::config::TRIAGE_STORE_FILE).as_path()
        );
        assert_eq!(
            app.intake_store.path(),
            dir.path().join(crate::config::INTAKE_STORE_FILE).as_path()
        );
        assert_eq!(app.config().flow, Flow::Triage);
    }
}
