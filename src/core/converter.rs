use std::{
    io::Write,
    slice,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use log::debug;

use crate::{
    core::{
        diagnostics::{DiagnosticEvent, Diagnostics, LogDiagnostics, SkipReason},
        item::{ItemReader, ItemWriter},
        record::{Header, Record},
    },
    error::ConversionError,
    item::{csv::csv_reader::CsvRecordReaderBuilder, xml::XmlRecordWriterBuilder},
};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes raw file content as UTF-8, dropping a leading byte order mark.
pub fn decode(content: &[u8]) -> Result<&str, ConversionError> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    std::str::from_utf8(content).map_err(|e| ConversionError::Encoding(e.to_string()))
}

/// The outcome of one successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    document: Vec<u8>,
    read_count: usize,
    write_count: usize,
    parse_error_count: usize,
    arity_mismatch_count: usize,
    invalid_value_count: usize,
}

impl ConversionResult {
    /// The complete UTF-8 XML document.
    pub fn document(&self) -> &[u8] {
        &self.document
    }

    pub fn into_document(self) -> Vec<u8> {
        self.document
    }

    /// Data rows met after the header, broken ones included.
    pub fn read_count(&self) -> usize {
        self.read_count
    }

    /// Records written to the document.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn parse_error_count(&self) -> usize {
        self.parse_error_count
    }

    pub fn arity_mismatch_count(&self) -> usize {
        self.arity_mismatch_count
    }

    pub fn invalid_value_count(&self) -> usize {
        self.invalid_value_count
    }

    /// Records left out of the document, whatever the reason.
    pub fn skipped(&self) -> usize {
        self.parse_error_count + self.arity_mismatch_count + self.invalid_value_count
    }
}

/// Converts CSV text into an element-per-field XML document.
///
/// The first non-empty line is the header; each following line becomes one
/// `<record>` element whose children are named after the header fields.
/// Broken rows (bad quoting, wrong field count, characters XML cannot carry)
/// are reported to the [`Diagnostics`] sink, counted and skipped. A converter
/// holds no state between calls and can be shared by concurrent conversions
/// of different files.
///
/// # Examples
///
/// ```
/// use csv_to_xml::core::converter::ConverterBuilder;
///
/// let converter = ConverterBuilder::new().build();
/// let result = converter.convert("X,Y,Z\na,\"b,c\",d\n1,2\n").unwrap();
///
/// let xml = String::from_utf8(result.document().to_vec()).unwrap();
/// assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
/// assert!(xml.contains("<X>a</X>"));
/// assert!(xml.contains("<Y>b,c</Y>"));
/// assert!(xml.contains("<Z>d</Z>"));
///
/// assert_eq!(result.write_count(), 1);
/// assert_eq!(result.skipped(), 1);
/// ```
pub struct Converter<'a> {
    delimiter: u8,
    quote: u8,
    root_tag: String,
    item_tag: String,
    indent: Option<usize>,
    skip_limit: Option<usize>,
    diagnostics: &'a dyn Diagnostics,
    cancellation: Option<Arc<AtomicBool>>,
}

#[derive(Default)]
struct Counts {
    read: usize,
    written: usize,
    parse_errors: usize,
    arity_mismatches: usize,
    invalid_values: usize,
}

impl Counts {
    fn skipped(&self) -> usize {
        self.parse_errors + self.arity_mismatches + self.invalid_values
    }
}

impl Converter<'_> {
    /// Converts a CSV text.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::EmptyInput`] if there is no data row after the header
    /// - [`ConversionError::InvalidElementName`] if a header field cannot be an
    ///   element name
    /// - [`ConversionError::Parse`] if the header line itself is malformed
    /// - [`ConversionError::SkipLimitExceeded`] if too many rows are skipped
    /// - [`ConversionError::Cancelled`] if the cancellation flag is raised
    /// - [`ConversionError::Emission`] if the document cannot be written
    ///
    /// On error no document is returned.
    pub fn convert(&self, text: &str) -> Result<ConversionResult, ConversionError> {
        let reader = CsvRecordReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .from_text(text);

        let header = match reader.read()? {
            Some(record) => Header::try_from(record)?,
            None => return Err(ConversionError::EmptyInput),
        };
        let expected = header.len();
        debug!("Header with {} fields: {:?}", expected, header.names());

        let writer = XmlRecordWriterBuilder::new()
            .root_tag(&self.root_tag)
            .item_tag(&self.item_tag)
            .indent(self.indent)
            .from_writer(header, Vec::new())?;

        writer.open()?;

        let mut counts = Counts::default();

        loop {
            self.check_cancelled()?;

            let record = match reader.read() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(ConversionError::Parse { line, content }) => {
                    counts.read += 1;
                    counts.parse_errors += 1;
                    self.diagnostics
                        .report(DiagnosticEvent::ParseFailure { line, content });
                    self.check_skip_limit(&counts)?;
                    continue;
                }
                Err(error) => return Err(error),
            };
            counts.read += 1;

            if let Err(reason) = check_arity(expected, &record) {
                counts.arity_mismatches += 1;
                self.skip(record.line(), reason, &counts)?;
                continue;
            }

            match writer.write(slice::from_ref(&record)) {
                Ok(()) => counts.written += 1,
                Err(ConversionError::InvalidValue { line, column }) => {
                    counts.invalid_values += 1;
                    self.skip(line, SkipReason::InvalidValue { column }, &counts)?;
                }
                Err(error) => return Err(error),
            }
        }

        if counts.read == 0 {
            return Err(ConversionError::EmptyInput);
        }

        writer.close()?;
        let document = writer.into_inner()?;

        self.diagnostics.report(DiagnosticEvent::ConversionComplete {
            emitted: counts.written,
            skipped: counts.skipped(),
        });

        Ok(ConversionResult {
            document,
            read_count: counts.read,
            write_count: counts.written,
            parse_error_count: counts.parse_errors,
            arity_mismatch_count: counts.arity_mismatches,
            invalid_value_count: counts.invalid_values,
        })
    }

    /// Decodes `content` as UTF-8 and converts it.
    pub fn convert_bytes(&self, content: &[u8]) -> Result<ConversionResult, ConversionError> {
        self.convert(decode(content)?)
    }

    /// Converts a CSV text and streams the finished document into `out`.
    ///
    /// The document is built completely before the first byte is written, so
    /// a conversion failure never reaches `out`. A failing `out` is reported as
    /// [`ConversionError::Emission`]; discarding what it already received is up
    /// to the caller.
    pub fn convert_to_writer<W: Write>(
        &self,
        text: &str,
        mut out: W,
    ) -> Result<ConversionResult, ConversionError> {
        let result = self.convert(text)?;
        out.write_all(result.document())
            .and_then(|()| out.flush())
            .map_err(|e| ConversionError::Emission(format!("Failed to write document: {}", e)))?;
        Ok(result)
    }

    fn skip(&self, line: usize, reason: SkipReason, counts: &Counts) -> Result<(), ConversionError> {
        self.diagnostics
            .report(DiagnosticEvent::RecordSkipped { line, reason });
        self.check_skip_limit(counts)
    }

    fn check_skip_limit(&self, counts: &Counts) -> Result<(), ConversionError> {
        match self.skip_limit {
            Some(limit) if counts.skipped() > limit => Err(ConversionError::SkipLimitExceeded(limit)),
            _ => Ok(()),
        }
    }

    fn check_cancelled(&self) -> Result<(), ConversionError> {
        match &self.cancellation {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ConversionError::Cancelled),
            _ => Ok(()),
        }
    }
}

fn check_arity(expected: usize, record: &Record) -> Result<(), SkipReason> {
    if record.len() == expected {
        Ok(())
    } else {
        Err(SkipReason::ArityMismatch {
            expected,
            found: record.len(),
        })
    }
}

/// Builder for [`Converter`].
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Quote: double quote (")
/// - Root tag: `Root`, record tag: `record`
/// - Indentation: two spaces
/// - Skip limit: none
/// - Diagnostics: [`LogDiagnostics`]
pub struct ConverterBuilder<'a> {
    delimiter: u8,
    quote: u8,
    root_tag: String,
    item_tag: String,
    indent: Option<usize>,
    skip_limit: Option<usize>,
    diagnostics: &'a dyn Diagnostics,
    cancellation: Option<Arc<AtomicBool>>,
}

impl Default for ConverterBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ConverterBuilder<'a> {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            root_tag: "Root".to_string(),
            item_tag: "record".to_string(),
            indent: Some(2),
            skip_limit: None,
            diagnostics: &LogDiagnostics,
            cancellation: None,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    pub fn root_tag(mut self, root_tag: &str) -> Self {
        self.root_tag = root_tag.to_string();
        self
    }

    pub fn item_tag(mut self, item_tag: &str) -> Self {
        self.item_tag = item_tag.to_string();
        self
    }

    pub fn indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    /// Maximum number of skipped records before the conversion is aborted.
    pub fn skip_limit(mut self, skip_limit: usize) -> Self {
        self.skip_limit = Some(skip_limit);
        self
    }

    pub fn diagnostics(mut self, diagnostics: &'a dyn Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Flag checked between records; raising it abandons the conversion.
    pub fn cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn build(self) -> Converter<'a> {
        Converter {
            delimiter: self.delimiter,
            quote: self.quote,
            root_tag: self.root_tag,
            item_tag: self.item_tag,
            indent: self.indent,
            skip_limit: self.skip_limit,
            diagnostics: self.diagnostics,
            cancellation: self.cancellation,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use quick_xml::{Reader, events::Event};

    use super::*;
    use crate::core::diagnostics::NoopDiagnostics;

    #[derive(Default)]
    struct CollectingDiagnostics {
        events: Mutex<Vec<DiagnosticEvent>>,
    }

    impl Diagnostics for CollectingDiagnostics {
        fn report(&self, event: DiagnosticEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn to_string(result: &ConversionResult) -> String {
        String::from_utf8(result.document().to_vec()).unwrap()
    }

    /// Start tags of the document, in order.
    fn element_names(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut names = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(start) => {
                    names.push(String::from_utf8(start.name().as_ref().to_vec()).unwrap())
                }
                Event::Eof => break,
                _ => {}
            }
        }
        names
    }

    #[test]
    fn one_record_per_row_with_children_in_header_order() {
        let converter = ConverterBuilder::new().diagnostics(&NoopDiagnostics).build();
        let result = converter
            .convert("id,name,city\n1,Alice,Paris\n2,Bob,Lyon\n3,Carol,Nice\n")
            .unwrap();

        let names = element_names(&to_string(&result));
        let expected: Vec<&str> = vec![
            "Root", "record", "id", "name", "city", "record", "id", "name", "city", "record",
            "id", "name", "city",
        ];
        assert_eq!(names, expected);
        assert_eq!(result.read_count(), 3);
        assert_eq!(result.write_count(), 3);
        assert_eq!(result.skipped(), 0);
    }

    #[test]
    fn conversion_is_idempotent() {
        let converter = ConverterBuilder::new().diagnostics(&NoopDiagnostics).build();
        let csv = "a,b\n\"x, y\",z\r\n1,\"q\"\"uote\"\n";

        let first = converter.convert(csv).unwrap();
        let second = converter.convert(csv).unwrap();

        assert_eq!(first.document(), second.document());
    }

    #[test]
    fn arity_mismatch_is_skipped_and_reported() {
        let diagnostics = CollectingDiagnostics::default();
        let converter = ConverterBuilder::new().diagnostics(&diagnostics).build();

        let result = converter
            .convert("X,Y,Z\n1,2,3\n4,5\n6,7,8,9\n10,11,12\n")
            .unwrap();

        assert_eq!(result.read_count(), 4);
        assert_eq!(result.write_count(), 2);
        assert_eq!(result.arity_mismatch_count(), 2);
        assert_eq!(result.skipped(), 2);

        let xml = to_string(&result);
        assert!(xml.contains("<X>1</X>"));
        assert!(xml.contains("<X>10</X>"));
        assert!(!xml.contains(">4<"));
        assert!(!xml.contains(">6<"));

        assert_eq!(
            diagnostics.events.lock().unwrap().as_slice(),
            &[
                DiagnosticEvent::RecordSkipped {
                    line: 3,
                    reason: SkipReason::ArityMismatch {
                        expected: 3,
                        found: 2
                    }
                },
                DiagnosticEvent::RecordSkipped {
                    line: 4,
                    reason: SkipReason::ArityMismatch {
                        expected: 3,
                        found: 4
                    }
                },
                DiagnosticEvent::ConversionComplete {
                    emitted: 2,
                    skipped: 2
                },
            ]
        );
    }

    #[test]
    fn parse_failure_is_skipped_and_reported() {
        let diagnostics = CollectingDiagnostics::default();
        let converter = ConverterBuilder::new().diagnostics(&diagnostics).build();

        let result = converter.convert("a,b\n1,\"open\n2,x\n").unwrap();

        assert_eq!(result.parse_error_count(), 1);
        assert_eq!(result.write_count(), 1);
        assert!(to_string(&result).contains("<a>2</a>"));

        let events = diagnostics.events.lock().unwrap();
        assert_eq!(
            events[0],
            DiagnosticEvent::ParseFailure {
                line: 2,
                content: "1,\"open".to_string()
            }
        );
    }

    #[test]
    fn invalid_value_is_skipped() {
        let converter = ConverterBuilder::new().diagnostics(&NoopDiagnostics).build();

        let result = converter.convert("a,b\n1,nul\u{0}\n2,ok\n").unwrap();

        assert_eq!(result.invalid_value_count(), 1);
        assert_eq!(result.write_count(), 1);
        assert!(!to_string(&result).contains("nul"));
    }

    #[test]
    fn header_only_is_empty_input() {
        let converter = ConverterBuilder::new().diagnostics(&NoopDiagnostics).build();

        for csv in ["", "\n\n", "a,b,c", "a,b,c\r\n", "a,b,c\n\n\r\n"] {
            assert!(
                matches!(converter.convert(csv), Err(ConversionError::EmptyInput)),
                "{:?} should be empty input",
                csv
            );
        }
    }

    #[test]
    fn all_rows_skipped_still_yields_a_document() {
        let converter = ConverterBuilder::new().diagnostics(&NoopDiagnostics).indent(None).build();

        let result = converter.convert("a,b\n1\n2\n").unwrap();

        assert_eq!(result.write_count(), 0);
        assert_eq!(result.skipped(), 2);
        assert!(to_string(&result).ends_with("<Root></Root>"));
    }

    #[test]
    fn invalid_header_fails_fast() {
        let diagnostics = CollectingDiagnostics::default();
        let converter = ConverterBuilder::new().diagnostics(&diagnostics).build();

        let result = converter.convert("id,first name\n1,Ann\n");

        assert!(matches!(
            result,
            Err(ConversionError::InvalidElementName { name }) if name == "first name"
        ));
        assert!(diagnostics.events.lock().unwrap().is_empty());
    }

    #[test]
    fn skip_limit_aborts_conversion() {
        let converter = ConverterBuilder::new()
            .diagnostics(&NoopDiagnostics)
            .skip_limit(1)
            .build();

        assert!(converter.convert("a,b\n1\n2,3\n").is_ok());
        assert!(matches!(
            converter.convert("a,b\n1\n2\n3,4\n"),
            Err(ConversionError::SkipLimitExceeded(1))
        ));
    }

    #[test]
    fn raised_flag_cancels_conversion() {
        let flag = Arc::new(AtomicBool::new(false));
        let converter = ConverterBuilder::new()
            .diagnostics(&NoopDiagnostics)
            .cancellation(flag.clone())
            .build();

        assert!(converter.convert("a\n1\n").is_ok());

        flag.store(true, Ordering::Relaxed);
        assert!(matches!(
            converter.convert("a\n1\n"),
            Err(ConversionError::Cancelled)
        ));
    }

    #[test]
    fn decode_drops_bom_and_rejects_invalid_utf8() {
        assert_eq!(decode(b"\xEF\xBB\xBFa,b").unwrap(), "a,b");
        assert!(matches!(
            decode(b"a,\xFF"),
            Err(ConversionError::Encoding(_))
        ));
    }

    #[test]
    fn semicolon_delimited_input() {
        let converter = ConverterBuilder::new()
            .diagnostics(&NoopDiagnostics)
            .delimiter(b';')
            .build();

        let result = converter.convert("X;Y\n\"1;5\";2,5\n").unwrap();

        let xml = to_string(&result);
        assert!(xml.contains("<X>1;5</X>"));
        assert!(xml.contains("<Y>2,5</Y>"));
    }
}
