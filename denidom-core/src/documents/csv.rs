//! Semicolon-separated CSV as spreadsheet programs in ru-RU locales expect it
//!
//! Output starts with a UTF-8 byte-order mark and uses CRLF line endings.
//! Fields containing the separator, a quote, CR or LF are quoted with inner
//! quotes doubled.

use crate::calculator::round_to_cents;
use std::borrow::Cow;

pub const BOM: char = '\u{feff}';
pub const SEPARATOR: char = ';';
pub const LINE_END: &str = "\r\n";

#[derive(Debug, Clone)]
pub struct CsvWriter {
    buf: String,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        let mut buf = String::with_capacity(4096);
        buf.push(BOM);
        Self { buf }
    }

    pub fn row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                self.buf.push(SEPARATOR);
            }
            self.buf.push_str(&escape_field(field.as_ref()));
        }
        self.buf.push_str(LINE_END);
    }

    pub fn blank(&mut self) {
        self.buf.push_str(LINE_END);
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([SEPARATOR, '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Two decimals, `.` as the decimal point
pub fn money(value: f64) -> String {
    // + 0.0 folds -0.0 into 0.0
    format!("{:.2}", round_to_cents(value) + 0.0)
}

/// Up to three decimals without trailing zeros
pub fn number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0 + 0.0;
    let text = format!("{:.3}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
