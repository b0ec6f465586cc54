//! Arrow-key menus. Live keyboard input and scripted key sequences both go
//! through `Menu::press`, so the two paths cannot drift apart.

use std::io;

use crate::cli::ui::formatting::Formatter;
use crate::cli::ui::terminal::{Keystroke, RawTerminal};
use crate::cli::ui::test_mode;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuOption {
    pub key: String,
    pub label: String,
    pub hint: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuPick {
    Chosen(String),
    Dismissed,
}

#[derive(Clone, Debug)]
pub struct Menu {
    title: String,
    context: Vec<String>,
    options: Vec<MenuOption>,
    cursor: usize,
}

impl Menu {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            context: Vec::new(),
            options: Vec::new(),
            cursor: 0,
        }
    }

    pub fn option(
        mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        self.options.push(MenuOption {
            key: key.into(),
            label: label.into(),
            hint: hint.into(),
        });
        self
    }

    /// Lines printed above the title. All-blank input leaves the menu bare.
    pub fn context(mut self, lines: &[String]) -> Self {
        let lines: Vec<String> = lines
            .iter()
            .map(|line| line.trim_end().to_string())
            .collect();
        if lines.iter().any(|line| !line.is_empty()) {
            self.context = lines;
        }
        self
    }

    pub fn highlight(mut self, index: usize) -> Self {
        self.cursor = index;
        self
    }

    /// Moves the cursor (wrapping at both ends) or settles the menu.
    fn press(&mut self, key: Keystroke) -> Option<MenuPick> {
        let last = self.options.len().saturating_sub(1);
        match key {
            Keystroke::Up => self.cursor = self.cursor.checked_sub(1).unwrap_or(last),
            Keystroke::Down => self.cursor = if self.cursor >= last { 0 } else { self.cursor + 1 },
            Keystroke::Home => self.cursor = 0,
            Keystroke::End => self.cursor = last,
            Keystroke::Enter => {
                return self
                    .options
                    .get(self.cursor)
                    .map(|option| MenuPick::Chosen(option.key.clone()))
            }
            Keystroke::Esc => return Some(MenuPick::Dismissed),
            _ => {}
        }
        None
    }

    /// Screen lines plus the index of the line under the cursor.
    fn frame(&self, formatter: &Formatter) -> (Vec<String>, usize) {
        let label_width = self
            .options
            .iter()
            .map(|option| option.label.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = Vec::new();
        if !self.context.is_empty() {
            lines.extend(self.context.iter().map(|line| formatter.detail_text(line)));
            lines.push(String::new());
        }
        lines.push(formatter.header_text(&self.title));
        lines.push(String::new());
        let cursor_line = lines.len() + self.cursor;
        for (index, option) in self.options.iter().enumerate() {
            let marker = if index == self.cursor {
                formatter.pointer()
            } else {
                " "
            };
            let row = formatter.format_two_column_row(&option.label, &option.hint, label_width);
            lines.push(format!(" {marker} {row}"));
        }
        lines.push(String::new());
        lines.push(formatter.detail_text(formatter.navigation_hint()));
        (lines, cursor_line)
    }

    /// Leaves the settled menu on screen; in scripted runs this is the only
    /// output a menu produces.
    fn print(&self, formatter: &Formatter) {
        let (lines, _) = self.frame(formatter);
        for line in lines {
            println!("{line}");
        }
    }

    /// Shows the menu until ENTER or ESC. Scripted runs consume one queued
    /// key sequence instead of the keyboard.
    pub fn run(mut self) -> io::Result<MenuPick> {
        if self.options.is_empty() {
            return Ok(MenuPick::Dismissed);
        }
        self.cursor = self.cursor.min(self.options.len() - 1);
        let formatter = Formatter::new();

        if let Some(script) = test_mode::next_menu_events(&self.title) {
            let pick = script.into_iter().find_map(|key| self.press(key));
            self.print(&formatter);
            return match pick {
                Some(pick) => Ok(pick),
                None => panic!("Scripted keys for `{}` never press ENTER or ESC", self.title),
            };
        }

        let mut terminal = RawTerminal::enter(true)?;
        let pick = loop {
            let (lines, cursor_line) = self.frame(&formatter);
            terminal.paint(&lines, cursor_line)?;
            match terminal.read()? {
                Keystroke::Interrupt => {
                    break Err(io::Error::new(io::ErrorKind::Interrupted, "menu interrupted"))
                }
                key => {
                    if let Some(pick) = self.press(key) {
                        break Ok(pick);
                    }
                }
            }
        };
        terminal.wipe()?;
        drop(terminal);

        if let Ok(MenuPick::Chosen(_)) = &pick {
            self.print(&formatter);
        }
        pick
    }
}
