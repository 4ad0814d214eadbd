/// XML support for writing converted records.
///
/// The writer uses `quick-xml` to produce an element-per-field document:
/// every record becomes an item element whose children are named after the
/// header fields, in header order.
///
/// # Examples
///
/// ```
/// use csv_to_xml::core::item::ItemWriter;
/// use csv_to_xml::core::record::{Header, Record};
/// use csv_to_xml::item::xml::XmlRecordWriterBuilder;
///
/// let header = Header::new(vec!["name".to_string(), "price".to_string()]).unwrap();
/// let writer = XmlRecordWriterBuilder::new()
///     .root_tag("catalog")
///     .item_tag("product")
///     .from_writer(header, Vec::new())
///     .unwrap();
///
/// writer.open().unwrap();
/// writer
///     .write(&[Record::new(2, vec!["USB-C Cable".to_string(), "12.99".to_string()])])
///     .unwrap();
/// writer.close().unwrap();
///
/// let xml = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert!(xml.contains("<name>USB-C Cable</name>"));
/// assert!(xml.contains("<price>12.99</price>"));
///
/// // The resulting XML:
/// // <?xml version="1.0" encoding="utf-8"?>
/// // <catalog>
/// //   <product>
/// //     <name>USB-C Cable</name>
/// //     <price>12.99</price>
/// //   </product>
/// // </catalog>
/// ```
pub mod xml_writer;

pub mod name;

pub use xml_writer::XmlRecordWriter;
pub use xml_writer::XmlRecordWriterBuilder;
