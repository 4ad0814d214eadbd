use csv::{ReaderBuilder, StringRecord, Terminator, Trim};
use log::debug;
use std::cell::Cell;

use crate::{
    core::{
        item::{ItemReader, ItemReaderResult},
        record::Record,
    },
    error::ConversionError,
};

/// A CSV reader producing one [`Record`] per logical line of a text.
///
/// The text is split into physical lines on `\n`, trailing `\r` characters
/// are stripped and empty lines are skipped. A quoted field that is still
/// open at the end of a physical line continues on the next one, so a single
/// record may span several lines.
///
/// Fields are never trimmed and rows may have any number of fields: checking
/// the arity against a header is left to the caller.
///
/// # Errors
///
/// A quote still open at the end of the text makes the read fail with
/// [`ConversionError::Parse`]. The reader then resumes right after the
/// physical line where the broken record started, so one bad row does not
/// consume the rest of the text.
///
/// # Examples
///
/// ```
/// use csv_to_xml::item::csv::csv_reader::CsvRecordReaderBuilder;
/// use csv_to_xml::core::item::ItemReader;
///
/// let reader = CsvRecordReaderBuilder::new().from_text("a,\"b,c\",d\r\n\r\ne,f,g");
///
/// let first = reader.read().unwrap().unwrap();
/// assert_eq!(first.line(), 1);
/// assert_eq!(first.fields(), &["a", "b,c", "d"]);
///
/// let second = reader.read().unwrap().unwrap();
/// assert_eq!(second.line(), 3);
///
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct CsvRecordReader<'a> {
    lines: Vec<&'a str>,
    /// Index of the next physical line to read
    cursor: Cell<usize>,
    delimiter: u8,
    quote: u8,
}

impl ItemReader<Record> for CsvRecordReader<'_> {
    fn read(&self) -> ItemReaderResult<Record> {
        loop {
            let start = self.cursor.get();
            let Some(first) = self.lines.get(start) else {
                return Ok(None);
            };
            self.cursor.set(start + 1);

            if first.is_empty() {
                continue;
            }

            let mut scanner = QuoteScanner::new(self.delimiter, self.quote);
            scanner.feed(first);

            let mut end = start;
            while scanner.in_quotes() {
                end += 1;
                match self.lines.get(end) {
                    Some(line) => scanner.feed(line),
                    None => {
                        debug!("Unterminated quote starting at line {}", start + 1);
                        return Err(ConversionError::Parse {
                            line: start + 1,
                            content: first.to_string(),
                        });
                    }
                }
            }
            self.cursor.set(end + 1);

            let raw = self.lines[start..=end].join("\n");
            let fields = self.split_fields(&raw, start + 1)?;

            return Ok(Some(Record::new(start + 1, fields)));
        }
    }
}

impl CsvRecordReader<'_> {
    fn split_fields(&self, raw: &str, line: usize) -> Result<Vec<String>, ConversionError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::None)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .terminator(Terminator::Any(b'\n'))
            .from_reader(raw.as_bytes());

        let mut record = StringRecord::new();
        match rdr.read_record(&mut record) {
            Ok(true) => Ok(record.iter().map(str::to_string).collect()),
            Ok(false) => Ok(Vec::new()),
            Err(error) => Err(ConversionError::Parse {
                line,
                content: format!("{} ({})", raw, error),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum QuoteState {
    StartField,
    InField,
    InQuotedField,
    QuoteInQuotedField,
}

/// Tracks whether a quoted field is open, following the quoting rules of the
/// `csv` crate: a quote only opens a field when it is the field's first byte,
/// and `""` inside a quoted field is an escaped quote.
struct QuoteScanner {
    state: QuoteState,
    delimiter: u8,
    quote: u8,
}

impl QuoteScanner {
    fn new(delimiter: u8, quote: u8) -> Self {
        Self {
            state: QuoteState::StartField,
            delimiter,
            quote,
        }
    }

    /// Feeds one physical line. Called again for a continuation line, the
    /// line break between both is part of the open field.
    fn feed(&mut self, line: &str) {
        for &byte in line.as_bytes() {
            self.state = match self.state {
                QuoteState::StartField if byte == self.quote => QuoteState::InQuotedField,
                QuoteState::StartField | QuoteState::InField if byte == self.delimiter => {
                    QuoteState::StartField
                }
                QuoteState::StartField | QuoteState::InField => QuoteState::InField,
                QuoteState::InQuotedField if byte == self.quote => {
                    QuoteState::QuoteInQuotedField
                }
                QuoteState::InQuotedField => QuoteState::InQuotedField,
                QuoteState::QuoteInQuotedField if byte == self.quote => {
                    QuoteState::InQuotedField
                }
                QuoteState::QuoteInQuotedField if byte == self.delimiter => {
                    QuoteState::StartField
                }
                QuoteState::QuoteInQuotedField => QuoteState::InField,
            };
        }
    }

    fn in_quotes(&self) -> bool {
        self.state == QuoteState::InQuotedField
    }
}

/// A builder for configuring CSV record reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Quote: double quote (")
#[derive(Debug, Clone, Copy)]
pub struct CsvRecordReaderBuilder {
    delimiter: u8,
    quote: u8,
}

impl Default for CsvRecordReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvRecordReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }

    /// Sets the field delimiter. Must be an ASCII byte.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the quote character. Must be an ASCII byte.
    pub fn quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Creates a `CsvRecordReader` over a fully loaded text.
    pub fn from_text(self, text: &str) -> CsvRecordReader<'_> {
        let lines = text
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .collect();

        CsvRecordReader {
            lines,
            cursor: Cell::new(0),
            delimiter: self.delimiter,
            quote: self.quote,
        }
    }
}
