/// CSV support for reading tabular text.
///
/// The reader splits a fully loaded text into [`Record`](crate::core::record::Record)s,
/// one per logical line, honoring quoted fields that contain delimiters, doubled
/// quotes or line breaks. Field splitting itself is delegated to the `csv` crate.
///
/// # Examples
///
/// ```
/// use csv_to_xml::item::csv::csv_reader::CsvRecordReaderBuilder;
/// use csv_to_xml::core::item::ItemReader;
///
/// let csv_data = "\
/// city,country,pop
/// Boston,\"United States, MA\",4628910
/// Concord,United States,42695
/// ";
///
/// let reader = CsvRecordReaderBuilder::new()
///     .delimiter(b',')
///     .from_text(csv_data);
///
/// let mut records = Vec::new();
/// while let Some(record) = reader.read().unwrap() {
///     records.push(record);
/// }
///
/// assert_eq!(records.len(), 3);
/// assert_eq!(records[0].fields(), &["city", "country", "pop"]);
/// assert_eq!(records[1].fields(), &["Boston", "United States, MA", "4628910"]);
/// assert_eq!(records[2].line(), 3);
/// ```
pub mod csv_reader;
