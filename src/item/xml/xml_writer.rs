use crate::core::item::{ItemWriter, ItemWriterResult};
use crate::core::record::{Header, Record};
use crate::error::ConversionError;
use crate::item::xml::name::{escape_text, is_valid_element_name, is_xml_char};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::cell::RefCell;
use std::io::{BufWriter, Write};

/// A writer mapping records to XML elements, one child element per header
/// field.
///
/// `open` writes the XML declaration and the root start tag, `close` writes
/// the root end tag and flushes. Each record becomes:
///
/// ```text
/// <record>
///   <HeaderName1>value1</HeaderName1>
///   <HeaderName2>value2</HeaderName2>
/// </record>
/// ```
///
/// A record is checked completely before any byte of it is written: a record
/// whose arity differs from the header's, or holding a character XML cannot
/// represent, is rejected with a record-level error and nothing of it reaches
/// the output.
///
/// # Examples
///
/// ```
/// use csv_to_xml::core::item::ItemWriter;
/// use csv_to_xml::core::record::{Header, Record};
/// use csv_to_xml::item::xml::xml_writer::XmlRecordWriterBuilder;
///
/// let header = Header::new(vec!["X".to_string(), "Y".to_string()]).unwrap();
/// let writer = XmlRecordWriterBuilder::new()
///     .indent(None)
///     .from_writer(header, Vec::new())
///     .unwrap();
///
/// writer.open().unwrap();
/// writer
///     .write(&[Record::new(2, vec!["a".to_string(), "b & c".to_string()])])
///     .unwrap();
/// writer.close().unwrap();
///
/// let xml = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(
///     xml,
///     "<?xml version=\"1.0\" encoding=\"utf-8\"?><Root><record><X>a</X><Y>b &amp; c</Y></record></Root>"
/// );
/// ```
pub struct XmlRecordWriter<W: Write> {
    writer: RefCell<Writer<BufWriter<W>>>,
    header: Header,
    root_tag: String,
    item_tag: String,
}

impl<W: Write> XmlRecordWriter<W> {
    fn check(&self, record: &Record) -> Result<(), ConversionError> {
        if record.len() != self.header.len() {
            return Err(ConversionError::ArityMismatch {
                line: record.line(),
                expected: self.header.len(),
                found: record.len(),
            });
        }

        if let Some(column) = record
            .fields()
            .iter()
            .position(|value| !value.chars().all(is_xml_char))
        {
            return Err(ConversionError::InvalidValue {
                line: record.line(),
                column: column + 1,
            });
        }

        Ok(())
    }

    fn write_record(&self, record: &Record) -> ItemWriterResult {
        let mut writer = self.writer.borrow_mut();

        writer
            .write_event(Event::Start(BytesStart::new(self.item_tag.as_str())))
            .map_err(|e| ConversionError::Emission(format!("Failed to write record: {}", e)))?;

        for (name, value) in self.header.iter().zip(record.fields()) {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(|e| ConversionError::Emission(format!("Failed to write field: {}", e)))?;
            writer
                .write_event(Event::Text(BytesText::from_escaped(escape_text(value))))
                .map_err(|e| ConversionError::Emission(format!("Failed to write value: {}", e)))?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(|e| ConversionError::Emission(format!("Failed to write field: {}", e)))?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(self.item_tag.as_str())))
            .map_err(|e| ConversionError::Emission(format!("Failed to write record: {}", e)))?;

        Ok(())
    }

    /// Unwraps the underlying destination, flushing what is still buffered.
    pub fn into_inner(self) -> Result<W, ConversionError> {
        self.writer
            .into_inner()
            .into_inner()
            .into_inner()
            .map_err(|e| ConversionError::Emission(format!("Failed to flush XML: {}", e.error())))
    }
}

impl<W: Write> ItemWriter<Record> for XmlRecordWriter<W> {
    /// Writes the records in order, stopping at the first rejected one.
    fn write(&self, items: &[Record]) -> ItemWriterResult {
        for record in items {
            self.check(record)?;
            self.write_record(record)?;
        }
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        self.writer
            .borrow_mut()
            .get_mut()
            .flush()
            .map_err(|e| ConversionError::Emission(format!("Failed to flush XML: {}", e)))
    }

    fn open(&self) -> ItemWriterResult {
        let mut writer = self.writer.borrow_mut();
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| ConversionError::Emission(format!("Failed to write XML declaration: {}", e)))?;
        writer
            .write_event(Event::Start(BytesStart::new(self.root_tag.as_str())))
            .map_err(|e| ConversionError::Emission(format!("Failed to write XML root: {}", e)))?;
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        self.writer
            .borrow_mut()
            .write_event(Event::End(BytesEnd::new(self.root_tag.as_str())))
            .map_err(|e| ConversionError::Emission(format!("Failed to write XML end: {}", e)))?;
        self.flush()
    }
}

/// Builder for [`XmlRecordWriter`].
///
/// Defaults: root tag `Root`, record tag `record`, two-space indentation.
#[derive(Debug, Clone)]
pub struct XmlRecordWriterBuilder {
    root_tag: String,
    item_tag: String,
    indent: Option<usize>,
}

impl Default for XmlRecordWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlRecordWriterBuilder {
    pub fn new() -> Self {
        Self {
            root_tag: "Root".to_string(),
            item_tag: "record".to_string(),
            indent: Some(2),
        }
    }

    /// Sets the tag wrapping all records.
    pub fn root_tag(mut self, root_tag: &str) -> Self {
        self.root_tag = root_tag.to_string();
        self
    }

    /// Sets the tag wrapping each record.
    pub fn item_tag(mut self, item_tag: &str) -> Self {
        self.item_tag = item_tag.to_string();
        self
    }

    /// Sets the number of spaces per nesting level, `None` for a single-line
    /// document.
    pub fn indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    /// Creates an `XmlRecordWriter` writing into `wtr`.
    ///
    /// Fails with [`ConversionError::InvalidElementName`] if the root or record
    /// tag is not a legal XML element name.
    pub fn from_writer<W: Write>(
        self,
        header: Header,
        wtr: W,
    ) -> Result<XmlRecordWriter<W>, ConversionError> {
        for tag in [&self.root_tag, &self.item_tag] {
            if !is_valid_element_name(tag) {
                return Err(ConversionError::InvalidElementName { name: tag.clone() });
            }
        }

        let writer = match self.indent {
            Some(size) => Writer::new_with_indent(BufWriter::new(wtr), b' ', size),
            None => Writer::new(BufWriter::new(wtr)),
        };

        Ok(XmlRecordWriter {
            writer: RefCell::new(writer),
            header,
            root_tag: self.root_tag,
            item_tag: self.item_tag,
        })
    }
}
