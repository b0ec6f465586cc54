//! Declarative form engine used by the wizard's data-entry screens.
//!
//! A form is described once as a list of [`FieldDescriptor`]s. Fields may be
//! conditional on earlier answers; hidden fields are skipped while navigating
//! and their values are dropped from the completed result.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::cli::output;
use crate::cli::ui::formatting::Formatter;
use crate::cli::ui::prompts::{choice_menu, text_input, ChoiceAnswer, TextAnswer};
use crate::intake::{clinical::DATE_FORMAT, FieldValues};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormResult<T> {
    Completed(T),
    /// ESC on the first field.
    Cancelled,
}

/// Describes how prompts can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// User supplied a concrete value.
    Value(String),
    /// User chose to keep the current value.
    Keep,
    /// Abort the form immediately.
    Cancel,
    /// Go back to the previous visible field.
    Back,
    /// Request additional information for the current field.
    Help,
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
    Choice(Vec<String>),
}

type ValidatorCallback = dyn Fn(&str) -> Result<String, String> + Send + Sync;
type VisibilityCallback = dyn Fn(&FieldValues) -> bool + Send + Sync;

/// Widget-level checks applied as each answer is entered.
#[derive(Clone)]
pub enum Validator {
    None,
    IntegerRange { min: i64, max: i64 },
    Date,
    OneOf(Vec<String>),
    Custom(Arc<ValidatorCallback>),
}

impl Validator {
    fn validate(&self, input: &str) -> Result<String, ValidationError> {
        let trimmed = input.trim();
        match self {
            Validator::None => Ok(trimmed.to_string()),
            Validator::IntegerRange { min, max } => trimmed
                .parse::<i64>()
                .ok()
                .filter(|value| (*min..=*max).contains(value))
                .map(|value| value.to_string())
                .ok_or_else(|| {
                    ValidationError::new(format!(
                        "Ingrese un número entero entre {min} y {max}."
                    ))
                }),
            Validator::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(|date| date.format(DATE_FORMAT).to_string())
                .map_err(|_| ValidationError::new("Use el formato AAAA-MM-DD.")),
            Validator::OneOf(options) => options
                .iter()
                .find(|candidate| candidate.to_lowercase() == trimmed.to_lowercase())
                .cloned()
                .ok_or_else(|| {
                    ValidationError::new(format!(
                        "Elija una de estas opciones: {}.",
                        options.join(", ")
                    ))
                }),
            Validator::Custom(func) => func(trimmed).map_err(ValidationError::new),
        }
    }

    /// Date on or after `min`.
    pub fn date_not_before(min: NaiveDate) -> Self {
        Validator::Custom(Arc::new(move |input| {
            let date = NaiveDate::parse_from_str(input, DATE_FORMAT)
                .map_err(|_| "Use el formato AAAA-MM-DD.".to_string())?;
            if date < min {
                return Err("La fecha de la cita no puede ser anterior a hoy.".to_string());
            }
            Ok(date.format(DATE_FORMAT).to_string())
        }))
    }
}

/// Declarative description of a single form field.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub help: Option<&'static str>,
    pub validator: Validator,
    visible_when: Option<Arc<VisibilityCallback>>,
}

impl FieldDescriptor {
    pub fn new(
        key: &'static str,
        label: &'static str,
        kind: FieldKind,
        validator: Validator,
    ) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
            help: None,
            validator,
            visible_when: None,
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Shows the field only while `condition` holds for the answers so far.
    pub fn visible_when(
        mut self,
        condition: impl Fn(&FieldValues) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.visible_when = Some(Arc::new(condition));
        self
    }

    pub fn is_visible(&self, values: &FieldValues) -> bool {
        self.visible_when
            .as_ref()
            .map_or(true, |condition| condition(values))
    }
}

/// Metadata describing a full form, including field order.
pub struct FormDescriptor {
    pub name: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

impl FormDescriptor {
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }
}

pub struct PromptContext<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub default: Option<&'a str>,
    pub index: usize,
    pub total: usize,
}

/// Interaction surface used by the form engine; mocked in tests.
pub trait FormInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse;
}

/// Interactive implementation backed by the shared menu renderer and text
/// prompt.
#[derive(Default)]
pub struct WizardInteraction {
    formatter: Formatter,
}

impl WizardInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    fn prompt_text(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        self.render_prompt(context);
        match text_input(context.descriptor.label, context.default) {
            Ok(TextAnswer::Value(value)) => PromptResponse::Value(value),
            Ok(TextAnswer::Keep) => PromptResponse::Keep,
            Ok(TextAnswer::Back) => PromptResponse::Back,
            Ok(TextAnswer::Help) => PromptResponse::Help,
            Ok(TextAnswer::Escape) => escape_response(context),
            Ok(TextAnswer::Cancel) | Err(_) => PromptResponse::Cancel,
        }
    }

    fn prompt_choice(&mut self, context: &PromptContext<'_>, options: &[String]) -> PromptResponse {
        let mut lines = Vec::new();
        if let Some(help) = context.descriptor.help {
            lines.push(help.to_string());
        }
        if context.index > 0 {
            lines.push("Elija ← Volver para revisar el campo anterior.".into());
        }
        let title = step_title(context);
        match choice_menu(&title, &lines, options, context.default, context.index > 0) {
            Ok(ChoiceAnswer::Value(value)) => {
                if context
                    .default
                    .is_some_and(|current| current.eq_ignore_ascii_case(&value))
                {
                    PromptResponse::Keep
                } else {
                    PromptResponse::Value(value)
                }
            }
            Ok(ChoiceAnswer::Back) => PromptResponse::Back,
            Ok(ChoiceAnswer::Escape) => escape_response(context),
            Err(_) => PromptResponse::Cancel,
        }
    }

    fn render_prompt(&self, context: &PromptContext<'_>) {
        self.formatter.print_header(step_title(context));
        if let Some(current) = context.default.filter(|value| !value.is_empty()) {
            self.formatter
                .print_detail(format!("Valor actual: {current} (Enter para conservarlo)"));
        }
        if let Some(help) = context.descriptor.help {
            self.formatter.print_detail(help);
        }
        let escape = if context.index == 0 {
            "ESC sale del formulario."
        } else {
            "ESC vuelve al campo anterior."
        };
        self.formatter.print_detail(format!(
            "Escriba un valor y pulse Enter. {escape} :ayuda muestra información, :borrar vacía el campo."
        ));
    }
}

impl FormInteraction for WizardInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        match &context.descriptor.kind {
            FieldKind::Choice(options) => self.prompt_choice(context, options),
            _ => self.prompt_text(context),
        }
    }
}

fn escape_response(context: &PromptContext<'_>) -> PromptResponse {
    if context.index == 0 {
        PromptResponse::Cancel
    } else {
        PromptResponse::Back
    }
}

fn step_title(context: &PromptContext<'_>) -> String {
    format!(
        "Paso {} de {}: {}",
        context.index + 1,
        context.total,
        context.descriptor.label
    )
}

/// In-progress form. `index` always points at a visible field or past the end.
pub struct FormSession<'a> {
    descriptor: &'a FormDescriptor,
    values: FieldValues,
    index: usize,
    cancelled: bool,
}

impl<'a> FormSession<'a> {
    pub fn new(descriptor: &'a FormDescriptor, defaults: FieldValues) -> Self {
        let mut session = Self {
            descriptor,
            values: defaults,
            index: 0,
            cancelled: false,
        };
        session.index = session.next_visible(0);
        session
    }

    fn next_visible(&self, from: usize) -> usize {
        (from..self.descriptor.fields.len())
            .find(|&idx| self.descriptor.fields[idx].is_visible(&self.values))
            .unwrap_or(self.descriptor.fields.len())
    }

    fn previous_visible(&self) -> Option<usize> {
        (0..self.index)
            .rev()
            .find(|&idx| self.descriptor.fields[idx].is_visible(&self.values))
    }

    fn visible_count(&self, upto: usize) -> usize {
        self.descriptor.fields[..upto]
            .iter()
            .filter(|field| field.is_visible(&self.values))
            .count()
    }

    pub fn current_field(&self) -> Option<FormStep<'_>> {
        self.descriptor.fields.get(self.index).map(|field| FormStep {
            descriptor: field,
            default: self.values.get(field.key).cloned(),
            index: self.visible_count(self.index),
            total: self.visible_count(self.descriptor.fields.len()),
        })
    }

    fn advance(&mut self) {
        self.index = self.next_visible(self.index + 1);
    }

    pub fn apply_response(
        &mut self,
        response: PromptResponse,
    ) -> Result<FormSessionEvent, ValidationError> {
        if self.cancelled {
            return Ok(FormSessionEvent::NoOp);
        }
        let descriptor = self.descriptor;
        let Some(field) = descriptor.fields.get(self.index) else {
            return Ok(FormSessionEvent::NoOp);
        };

        match response {
            PromptResponse::Cancel => {
                self.cancelled = true;
                Ok(FormSessionEvent::Cancelled)
            }
            PromptResponse::Back => match self.previous_visible() {
                Some(previous) => {
                    self.index = previous;
                    Ok(FormSessionEvent::Moved)
                }
                None => {
                    output::warning("Ya está en el primer campo.");
                    Ok(FormSessionEvent::Repeat)
                }
            },
            PromptResponse::Help => {
                output::info(
                    field
                        .help
                        .unwrap_or("No hay información adicional para este campo."),
                );
                Ok(FormSessionEvent::Repeat)
            }
            PromptResponse::Keep => {
                if self.values.contains_key(field.key) || !field.required {
                    self.advance();
                    Ok(FormSessionEvent::Moved)
                } else {
                    output::warning("Este campo es obligatorio.");
                    Ok(FormSessionEvent::Repeat)
                }
            }
            PromptResponse::Value(raw) => {
                let result = match (raw.trim().is_empty(), field.required) {
                    (true, false) => Ok(String::new()),
                    (true, true) => Err(ValidationError::new("Este campo es obligatorio.")),
                    (false, _) => validate_field(field, &raw),
                };
                match result {
                    Ok(value) => {
                        self.values.insert(field.key.to_string(), value);
                        self.advance();
                        Ok(FormSessionEvent::Moved)
                    }
                    Err(err) => {
                        output::warning(&err.message);
                        Err(err)
                    }
                }
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.descriptor.fields.len()
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Answers for the fields visible under the final values.
    pub fn into_values(self) -> FieldValues {
        let Self {
            descriptor,
            mut values,
            ..
        } = self;
        let hidden: Vec<&str> = descriptor
            .fields
            .iter()
            .filter(|field| !field.is_visible(&values))
            .map(|field| field.key)
            .collect();
        values.retain(|key, _| {
            descriptor.field(key).is_some() && !hidden.contains(&key.as_str())
        });
        values
    }
}

fn validate_field(field: &FieldDescriptor, raw: &str) -> Result<String, ValidationError> {
    match (&field.kind, &field.validator) {
        (FieldKind::Choice(options), Validator::None) => {
            Validator::OneOf(options.clone()).validate(raw)
        }
        (FieldKind::Integer, Validator::None) => Validator::IntegerRange {
            min: i64::MIN,
            max: i64::MAX,
        }
        .validate(raw),
        (FieldKind::Date, Validator::None) => Validator::Date.validate(raw),
        (_, validator) => validator.validate(raw),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSessionEvent {
    Moved,
    Repeat,
    Cancelled,
    NoOp,
}

/// Data provided to render the current field.
pub struct FormStep<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub default: Option<String>,
    pub index: usize,
    pub total: usize,
}

impl<'a> FormStep<'a> {
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// Drives a [`FormDescriptor`] through a [`FormInteraction`].
pub struct FormEngine<'a> {
    descriptor: &'a FormDescriptor,
}

impl<'a> FormEngine<'a> {
    pub fn new(descriptor: &'a FormDescriptor) -> Self {
        Self { descriptor }
    }

    /// Runs the form pre-filled with `defaults` until every visible field
    /// has an answer or the user leaves from the first field.
    pub fn run<I: FormInteraction>(
        &self,
        interaction: &mut I,
        defaults: FieldValues,
    ) -> FormResult<FieldValues> {
        let mut session = FormSession::new(self.descriptor, defaults);
        tracing::debug!(form = self.descriptor.name, "form started");

        loop {
            if session.is_complete() {
                return FormResult::Completed(session.into_values());
            }

            let response = {
                let Some(step) = session.current_field() else {
                    return FormResult::Completed(session.into_values());
                };
                let context = PromptContext {
                    descriptor: step.descriptor,
                    default: step.default_value(),
                    index: step.index,
                    total: step.total,
                };
                interaction.prompt_field(&context)
            };

            // Validation failures were already reported; the field repeats.
            if let Ok(FormSessionEvent::Cancelled) = session.apply_response(response) {
                tracing::debug!(form = self.descriptor.name, "form cancelled");
                return FormResult::Cancelled;
            }
        }
    }
}
