//! Scripted input for integration tests.
//!
//! `PSICOSYSTEM_TEST_MENU_EVENTS` holds one key sequence per menu, separated by
//! `|` (for example `DOWN,ENTER|ESC`). `PSICOSYSTEM_TEST_TEXT_INPUTS` holds one
//! answer per text prompt, also `|`-separated, where `<BLANK>`, `<KEEP>`,
//! `<BACK>` and `<ESC>` stand for the matching keys.

use once_cell::sync::Lazy;
use std::{
    collections::VecDeque,
    env,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::cli::ui::terminal::Keystroke;

pub const MENU_EVENTS_ENV: &str = "PSICOSYSTEM_TEST_MENU_EVENTS";
pub const TEXT_INPUTS_ENV: &str = "PSICOSYSTEM_TEST_TEXT_INPUTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextTestInput {
    Value(String),
    Keep,
    Back,
    Help,
    Escape,
}

struct ScriptQueue<T> {
    enabled: bool,
    items: VecDeque<T>,
}

impl<T> ScriptQueue<T> {
    fn from_env(var: &str, parse: fn(&str) -> VecDeque<T>) -> Self {
        match env::var(var) {
            Ok(raw) => Self {
                enabled: true,
                items: parse(&raw),
            },
            Err(_) => Self {
                enabled: false,
                items: VecDeque::new(),
            },
        }
    }
}

static MENU_EVENTS: Lazy<Mutex<ScriptQueue<Vec<Keystroke>>>> =
    Lazy::new(|| Mutex::new(ScriptQueue::from_env(MENU_EVENTS_ENV, parse_menu_sequences)));

static TEXT_INPUTS: Lazy<Mutex<ScriptQueue<TextTestInput>>> =
    Lazy::new(|| Mutex::new(ScriptQueue::from_env(TEXT_INPUTS_ENV, parse_text_sequences)));

fn lock<T>(queue: &Mutex<T>) -> MutexGuard<'_, T> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Next scripted key sequence, or `None` when menus are interactive.
///
/// An exhausted script is a broken test fixture and aborts loudly.
pub fn next_menu_events(label: &str) -> Option<Vec<Keystroke>> {
    let mut guard = lock(&MENU_EVENTS);
    if !guard.enabled {
        return None;
    }
    Some(
        guard
            .items
            .pop_front()
            .unwrap_or_else(|| panic!("Menu events exhausted before `{label}` menu rendered")),
    )
}

pub fn next_text_input(label: &str) -> Option<TextTestInput> {
    let mut guard = lock(&TEXT_INPUTS);
    if !guard.enabled {
        return None;
    }
    Some(
        guard
            .items
            .pop_front()
            .unwrap_or_else(|| panic!("Text inputs exhausted before prompt `{label}`")),
    )
}

fn parse_key(token: &str) -> Option<Keystroke> {
    match token.to_ascii_uppercase().as_str() {
        "UP" => Some(Keystroke::Up),
        "DOWN" => Some(Keystroke::Down),
        "HOME" => Some(Keystroke::Home),
        "END" => Some(Keystroke::End),
        "ENTER" | "RETURN" => Some(Keystroke::Enter),
        "ESC" | "ESCAPE" => Some(Keystroke::Esc),
        _ => None,
    }
}

fn parse_text_input(token: &str) -> TextTestInput {
    match token.to_ascii_uppercase().as_str() {
        "<ESC>" => TextTestInput::Escape,
        "<BACK>" => TextTestInput::Back,
        "<HELP>" => TextTestInput::Help,
        "<KEEP>" => TextTestInput::Keep,
        "<BLANK>" | "<EMPTY>" => TextTestInput::Value(String::new()),
        _ => TextTestInput::Value(token.to_string()),
    }
}

fn parse_menu_sequences(raw: &str) -> VecDeque<Vec<Keystroke>> {
    raw.split('|')
        .map(|segment| {
            segment
                .split(',')
                .filter_map(|token| parse_key(token.trim()))
                .collect::<Vec<_>>()
        })
        .filter(|events| !events.is_empty())
        .collect()
}

fn parse_text_sequences(raw: &str) -> VecDeque<TextTestInput> {
    raw.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_text_input)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_sequences_split_on_pipes() {
        let parsed = parse_menu_sequences("DOWN,DOWN,ENTER| enter |esc||bogus");
        assert_eq!(
            parsed,
            VecDeque::from(vec![
                vec![Keystroke::Down, Keystroke::Down, Keystroke::Enter],
                vec![Keystroke::Enter],
                vec![Keystroke::Esc],
            ])
        );
    }

    #[test]
    fn text_tokens_map_to_special_inputs() {
        let parsed = parse_text_sequences("Ana Lopez|<BLANK>|<keep>|<ESC>| 9 ");
        assert_eq!(
            parsed,
            VecDeque::from(vec![
                TextTestInput::Value("Ana Lopez".into()),
                TextTestInput::Value(String::new()),
                TextTestInput::Keep,
                TextTestInput::Escape,
                TextTestInput::Value("9".into()),
            ])
        );
    }
}
