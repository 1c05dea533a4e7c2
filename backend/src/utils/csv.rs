use std::borrow::Cow;
use std::io;

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

fn needs_formula_guard(value: &str) -> bool {
    matches!(value.chars().next(), Some('=' | '+' | '-' | '@'))
}

/// Prefixes spreadsheet formula triggers with `'` so exported cells are
/// always read as text.
pub fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if needs_formula_guard(value) {
        Cow::Owned(format!("'{}", value))
    } else {
        Cow::Borrowed(value)
    }
}

/// In-memory CSV document with every cell quoted and formula-guarded.
pub struct CsvBuilder {
    writer: Writer<Vec<u8>>,
    rows: usize,
}

impl CsvBuilder {
    pub fn new() -> Self {
        let writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        Self { writer, rows: 0 }
    }

    pub fn with_headers(headers: &[&str]) -> Result<Self, csv::Error> {
        let mut builder = Self::new();
        builder.writer.write_record(headers)?;
        Ok(builder)
    }

    pub fn push_row<I, S>(&mut self, fields: I) -> Result<(), csv::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let record: Vec<String> = fields
            .into_iter()
            .map(|field| sanitize_cell(field.as_ref()).into_owned())
            .collect();
        self.writer.write_record(&record)?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far, headers excluded.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn finish(self) -> Result<String, csv::Error> {
        let bytes = self
            .writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|err| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, err)))
    }
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}
