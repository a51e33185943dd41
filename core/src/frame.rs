use serde::Serialize;

/// An ordered column table holding every value as text, the way it arrives
/// in an uploaded CSV. Held in memory for the duration of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FrameError {
    #[error("uploaded file is empty")]
    Empty,
    #[error("uploaded file is not valid UTF-8")]
    NotUtf8,
    #[error("row {row} has {got} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("unterminated quoted field")]
    UnterminatedQuote,
    #[error("column {column:?} has {got} values for {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        got: usize,
    },
}

impl Frame {
    /// Build a frame from already-shaped parts. Callers are responsible for
    /// row width; CSV input goes through `from_csv` instead.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Frame { columns, rows }
    }

    /// Parse delimited UTF-8 text. The first record is the header; every
    /// data row must match its width. Quoted fields may contain commas,
    /// doubled quotes, and line breaks. Blank lines are skipped.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(bytes).map_err(|_| FrameError::NotUtf8)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut records = parse_records(text)?.into_iter();
        let columns = records.next().ok_or(FrameError::Empty)?;
        if columns.iter().all(|name| name.trim().is_empty()) {
            return Err(FrameError::Empty);
        }

        let mut rows = Vec::new();
        for (index, record) in records.enumerate() {
            if record.len() != columns.len() {
                return Err(FrameError::RaggedRow {
                    row: index + 2,
                    expected: columns.len(),
                    got: record.len(),
                });
            }
            rows.push(record);
        }

        Ok(Frame { columns, rows })
    }

    /// Encode as UTF-8 CSV: header then rows, no index column. Values are
    /// quoted only when they contain a delimiter, quote, or line break.
    pub fn to_csv(&self) -> Vec<u8> {
        let mut out = String::new();
        write_record(&mut out, &self.columns);
        for row in &self.rows {
            write_record(&mut out, row);
        }
        out.into_bytes()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        self.rows.iter().take(n).cloned().collect()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Append a derived column. Original columns are never touched; a value
    /// count that disagrees with the row count is rejected.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<(), FrameError> {
        if values.len() != self.rows.len() {
            return Err(FrameError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                got: values.len(),
            });
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }
}

fn parse_records(text: &str) -> Result<Vec<Vec<String>>, FrameError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                finish_record(&mut records, &mut record, &mut field);
            }
            '\n' => finish_record(&mut records, &mut record, &mut field),
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(FrameError::UnterminatedQuote);
    }
    if !field.is_empty() || !record.is_empty() {
        finish_record(&mut records, &mut record, &mut field);
    }

    Ok(records)
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    record.push(std::mem::take(field));
    let finished = std::mem::take(record);
    // A lone empty field is a blank line, not a one-column row.
    if finished.len() == 1 && finished[0].is_empty() {
        return;
    }
    records.push(finished);
}

fn write_record(out: &mut String, fields: &[String]) {
    for (index, value) in fields.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        if needs_quoting(value) {
            out.push('"');
            for ch in value.chars() {
                if ch == '"' {
                    out.push('"');
                }
                out.push(ch);
            }
            out.push('"');
        } else {
            out.push_str(value);
        }
    }
    out.push('\n');
}

fn needs_quoting(value: &str) -> bool {
    value
        .chars()
        .any(|ch| matches!(ch, ',' | '"' | '\n' | '\r'))
}
