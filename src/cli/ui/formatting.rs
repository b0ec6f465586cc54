use std::fmt;

use colored::Colorize;

use crate::cli::output::{current_preferences, OutputPreferences};

pub struct Formatter {
    prefs: OutputPreferences,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self::with_preferences(current_preferences())
    }

    pub fn with_preferences(prefs: OutputPreferences) -> Self {
        Self { prefs }
    }

    fn is_plain(&self) -> bool {
        self.prefs.plain_mode || self.prefs.screen_reader_mode
    }

    pub fn print_header(&self, title: impl fmt::Display) {
        println!("\n{}", self.header_text(title));
    }

    pub fn header_text(&self, title: impl fmt::Display) -> String {
        let text = format!("=== {title} ===");
        if self.is_plain() {
            text
        } else {
            text.bold().to_string()
        }
    }

    pub fn print_detail(&self, message: impl fmt::Display) {
        println!("{}", self.detail_text(message));
    }

    pub fn detail_text(&self, message: impl fmt::Display) -> String {
        let text = message.to_string();
        if self.is_plain() || self.prefs.high_contrast_mode {
            text
        } else {
            text.dimmed().to_string()
        }
    }

    pub fn pointer(&self) -> &'static str {
        if self.is_plain() {
            ">"
        } else {
            "▸"
        }
    }

    pub fn navigation_hint(&self) -> String {
        "(Use las flechas para moverse, Enter para elegir, ESC para salir)".to_string()
    }

    pub fn format_two_column_row(&self, label: &str, description: &str, width: usize) -> String {
        let pad = width.saturating_sub(label.chars().count());
        format!("  {label}{}  {description}", " ".repeat(pad + 2))
            .trim_end()
            .to_string()
    }
}
