//! Raw-mode keyboard access shared by menus and the text prompt.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{Attribute, SetAttribute},
    terminal::{self, ClearType},
    ExecutableCommand, QueueableCommand,
};

/// Keys the wizard reacts to; everything else is dropped on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Up,
    Down,
    Home,
    End,
    Enter,
    Esc,
    Backspace,
    /// Ctrl-U or Delete: empties the input line.
    Wipe,
    Char(char),
    /// Ctrl-C or Ctrl-D.
    Interrupt,
}

impl Keystroke {
    fn from_event(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c' | 'C' | 'd' | 'D') => Some(Self::Interrupt),
                KeyCode::Char('u' | 'U') => Some(Self::Wipe),
                _ => None,
            };
        }
        let stroke = match key.code {
            KeyCode::Up => Self::Up,
            KeyCode::Down => Self::Down,
            KeyCode::Home => Self::Home,
            KeyCode::End => Self::End,
            KeyCode::Enter => Self::Enter,
            KeyCode::Esc => Self::Esc,
            KeyCode::Backspace => Self::Backspace,
            KeyCode::Delete => Self::Wipe,
            KeyCode::Char(ch) => Self::Char(ch),
            _ => return None,
        };
        Some(stroke)
    }
}

/// Raw mode for as long as the value lives. Dropping it restores the cursor
/// and cooked mode even when a read or write failed halfway.
pub struct RawTerminal {
    out: Stdout,
    cursor_hidden: bool,
}

impl RawTerminal {
    pub fn enter(hide_cursor: bool) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut raw = Self {
            out: io::stdout(),
            cursor_hidden: false,
        };
        if hide_cursor {
            raw.out.execute(cursor::Hide)?;
            raw.cursor_hidden = true;
        }
        Ok(raw)
    }

    pub fn read(&mut self) -> io::Result<Keystroke> {
        loop {
            if let Event::Key(key) = event::read()? {
                if let Some(stroke) = Keystroke::from_event(key) {
                    return Ok(stroke);
                }
            }
        }
    }

    /// Redraws the whole screen; line `highlight` is shown in reverse video.
    pub fn paint(&mut self, lines: &[String], highlight: usize) -> io::Result<()> {
        self.wipe()?;
        for (index, line) in lines.iter().enumerate() {
            if index == highlight {
                self.out.queue(SetAttribute(Attribute::Reverse))?;
                write!(self.out, "{line}")?;
                self.out.queue(SetAttribute(Attribute::Reset))?;
            } else {
                write!(self.out, "{line}")?;
            }
            // No implicit carriage return in raw mode.
            write!(self.out, "\r\n")?;
        }
        self.out.flush()
    }

    pub fn wipe(&mut self) -> io::Result<()> {
        self.out
            .queue(terminal::Clear(ClearType::All))?
            .queue(cursor::MoveTo(0, 0))?;
        self.out.flush()
    }

    /// Rewrites the current line with the text typed so far.
    pub fn echo(&mut self, typed: &str) -> io::Result<()> {
        self.out
            .queue(cursor::MoveToColumn(0))?
            .queue(terminal::Clear(ClearType::CurrentLine))?;
        write!(self.out, "> {typed}")?;
        self.out.flush()
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if self.cursor_hidden {
            let _ = self.out.execute(cursor::Show);
        }
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn control_chords_map_to_line_actions() {
        assert_eq!(
            Keystroke::from_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Keystroke::Interrupt)
        );
        assert_eq!(
            Keystroke::from_event(press(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            Some(Keystroke::Wipe)
        );
        assert_eq!(
            Keystroke::from_event(press(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn printable_keys_keep_their_character() {
        assert_eq!(
            Keystroke::from_event(press(KeyCode::Char('ñ'), KeyModifiers::NONE)),
            Some(Keystroke::Char('ñ'))
        );
        assert_eq!(
            Keystroke::from_event(press(KeyCode::Delete, KeyModifiers::NONE)),
            Some(Keystroke::Wipe)
        );
        assert_eq!(Keystroke::from_event(press(KeyCode::F(1), KeyModifiers::NONE)), None);
    }
}
