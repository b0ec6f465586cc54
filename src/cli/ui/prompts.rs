//! The prompts the wizard needs: a free-text line, a single-choice menu for
//! form fields and an action menu for screens.

use std::io;

use crate::cli::ui::menu::{Menu, MenuPick};
use crate::cli::ui::terminal::{Keystroke, RawTerminal};
use crate::cli::ui::test_mode::{self, TextTestInput};

const BACK_OPTION: &str = "__volver";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextAnswer {
    Value(String),
    Keep,
    Back,
    Help,
    /// ESC; the form decides whether that leaves it or steps back.
    Escape,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceAnswer {
    Value(String),
    Back,
    Escape,
}

/// Reads one line. A blank line keeps a non-empty `current` value.
pub fn text_input(label: &str, current: Option<&str>) -> io::Result<TextAnswer> {
    if let Some(scripted) = test_mode::next_text_input(label) {
        return Ok(match scripted {
            TextTestInput::Value(line) => line_answer(&line, current),
            TextTestInput::Keep => TextAnswer::Keep,
            TextTestInput::Back => TextAnswer::Back,
            TextTestInput::Help => TextAnswer::Help,
            TextTestInput::Escape => TextAnswer::Escape,
        });
    }

    let mut terminal = RawTerminal::enter(false)?;
    let mut line = String::new();
    terminal.echo(&line)?;
    let answer = loop {
        match terminal.read()? {
            Keystroke::Enter => break line_answer(&line, current),
            Keystroke::Esc => break TextAnswer::Escape,
            Keystroke::Interrupt => break TextAnswer::Cancel,
            Keystroke::Backspace => {
                line.pop();
            }
            Keystroke::Wipe => line.clear(),
            Keystroke::Char(ch) => line.push(ch),
            Keystroke::Up | Keystroke::Down | Keystroke::Home | Keystroke::End => continue,
        }
        terminal.echo(&line)?;
    };
    drop(terminal);
    println!();
    Ok(answer)
}

/// Menu over a field's options, with a trailing "← Volver" when `back` is set.
pub fn choice_menu(
    title: &str,
    context: &[String],
    options: &[String],
    current: Option<&str>,
    back: bool,
) -> io::Result<ChoiceAnswer> {
    let mut menu = options
        .iter()
        .fold(Menu::new(title).context(context), |menu, option| {
            menu.option(option, option, "")
        });
    if back {
        menu = menu.option(BACK_OPTION, "← Volver", "Regresar al campo anterior");
    }
    if let Some(index) = current.and_then(|value| {
        options
            .iter()
            .position(|option| option.eq_ignore_ascii_case(value))
    }) {
        menu = menu.highlight(index);
    }

    Ok(match menu.run()? {
        MenuPick::Chosen(key) if key == BACK_OPTION => ChoiceAnswer::Back,
        MenuPick::Chosen(key) => ChoiceAnswer::Value(key),
        MenuPick::Dismissed => ChoiceAnswer::Escape,
    })
}

/// Screen menu over `(key, label, hint)` actions. `None` means ESC.
pub fn action_menu(
    title: &str,
    context: &[String],
    actions: &[(&str, &str, &str)],
) -> io::Result<Option<String>> {
    let menu = actions
        .iter()
        .fold(Menu::new(title).context(context), |menu, &(key, label, hint)| {
            menu.option(key, label, hint)
        });
    Ok(match menu.run()? {
        MenuPick::Chosen(key) => Some(key),
        MenuPick::Dismissed => None,
    })
}

fn line_answer(line: &str, current: Option<&str>) -> TextAnswer {
    let entered = line.trim();
    match entered.to_lowercase().as_str() {
        "" if current.is_some_and(|value| !value.is_empty()) => TextAnswer::Keep,
        ":volver" | ":back" => TextAnswer::Back,
        ":ayuda" | ":help" => TextAnswer::Help,
        "" | ":borrar" | ":clear" => TextAnswer::Value(String::new()),
        _ => TextAnswer::Value(entered.to_string()),
    }
}
