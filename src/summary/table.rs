/// One column of a rendered table. Cells wider than `wrap_at` continue on
/// the following lines instead of being cut.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub header: String,
    pub wrap_at: Option<usize>,
}

impl TableColumn {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            wrap_at: None,
        }
    }

    pub fn wrapping_at(mut self, width: usize) -> Self {
        self.wrap_at = Some(width.max(1));
        self
    }

    fn lines_of(&self, cell: &str) -> Vec<String> {
        match self.wrap_at {
            Some(width) => wrap_text(cell, width),
            None => vec![cell.to_string()],
        }
    }
}

pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
    pub padding: usize,
    /// ASCII rule instead of box-drawing characters.
    pub plain: bool,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>, rows: Vec<Vec<String>>) -> Self {
        Self {
            columns,
            rows,
            padding: 1,
            plain: false,
        }
    }

    pub fn plain(mut self, plain: bool) -> Self {
        self.plain = plain;
        self
    }

    /// Content width per column: the widest header or cell line, capped at
    /// the column's wrap width.
    pub fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let widest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .flat_map(|cell| column.lines_of(cell))
                    .map(|line| char_width(&line))
                    .fold(char_width(&column.header), usize::max);
                column.wrap_at.map_or(widest, |cap| widest.min(cap))
            })
            .collect()
    }

    /// Physical lines for one logical row; short cells are padded with blanks.
    fn row_lines(&self, row: &[String], widths: &[usize]) -> Vec<String> {
        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                column.lines_of(row.get(idx).map(String::as_str).unwrap_or(""))
            })
            .collect();
        let height = cells.iter().map(Vec::len).max().unwrap_or(1);
        let pad = " ".repeat(self.padding);

        (0..height)
            .map(|line| {
                widths
                    .iter()
                    .zip(&cells)
                    .map(|(width, cell)| {
                        let text = cell.get(line).map(String::as_str).unwrap_or("");
                        let fill = width.saturating_sub(char_width(text));
                        format!("{pad}{text}{}{pad}", " ".repeat(fill))
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    /// Header, rule, then the rows; no trailing newline.
    pub fn render(&self) -> String {
        let widths = self.compute_widths();
        let header: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();

        let mut lines = self.row_lines(&header, &widths);
        lines.push(self.rule(&widths));
        for row in &self.rows {
            lines.extend(self.row_lines(row, &widths));
        }
        lines.join("\n")
    }

    fn rule(&self, widths: &[usize]) -> String {
        let span: usize = widths.iter().map(|width| width + 2 * self.padding).sum::<usize>()
            + widths.len().saturating_sub(1);
        let stroke = if self.plain { "-" } else { "─" };
        stroke.repeat(span)
    }
}

fn char_width(text: &str) -> usize {
    text.chars().count()
}

/// Breaks `text` at spaces into lines of at most `width` characters. A word
/// longer than `width` is split across lines on its own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if char_width(text) <= width {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split(' ') {
        let needed = if current.is_empty() {
            char_width(word)
        } else {
            char_width(&current) + 1 + char_width(word)
        };
        if needed <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            lines.push(chars.drain(..width).collect());
        }
        current = chars.into_iter().collect();
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(&str, &str)]) -> Vec<Vec<String>> {
        pairs
            .iter()
            .map(|(a, b)| vec![a.to_string(), b.to_string()])
            .collect()
    }

    #[test]
    fn widths_grow_with_accented_content() {
        let table = Table::new(
            vec![TableColumn::new("Campo"), TableColumn::new("Valor")],
            rows(&[("Teléfono", "987654321")]),
        );
        assert_eq!(table.compute_widths(), vec![8, 9]);
    }

    #[test]
    fn long_values_continue_on_the_next_line() {
        let table = Table::new(
            vec![TableColumn::new("Campo"), TableColumn::new("Valor").wrapping_at(10)],
            rows(&[("Motivo", "Ansiedad escolar y sueño"), ("Edad", "9")]),
        )
        .plain(true);
        let rendered = table.render();
        let rule = "-".repeat(20);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                " Campo    Valor",
                rule.as_str(),
                " Motivo   Ansiedad",
                "          escolar y",
                "          sueño",
                " Edad     9",
            ]
        );
        assert!(!rendered.contains('…'));
    }

    #[test]
    fn wrapped_lines_rejoin_into_the_original_text() {
        let text = "Dificultad para dormir desde hace varios meses, con despertares nocturnos";
        let lines = wrap_text(text, 20);
        assert!(lines.iter().all(|line| line.chars().count() <= 20));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn oversized_words_are_split() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("", 3), vec![""]);
    }

    #[test]
    fn plain_tables_use_ascii_rule() {
        let table = Table::new(
            vec![TableColumn::new("Campo"), TableColumn::new("Valor")],
            rows(&[("Edad", "9")]),
        )
        .plain(true);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], " Campo   Valor");
        assert_eq!(lines[1], "-".repeat(15));
        assert_eq!(lines[2], " Edad    9");
    }
}
