use crate::{error::ConversionError, item::xml::name::is_valid_element_name};

/// Ordered field names of one conversion.
///
/// A header is never empty and every name is usable verbatim as an XML
/// element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Builds a header, rejecting empty headers and names that are not legal
    /// XML element names.
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_to_xml::core::record::Header;
    ///
    /// let header = Header::new(vec!["Name".to_string(), "Age".to_string()]).unwrap();
    /// assert_eq!(header.len(), 2);
    ///
    /// assert!(Header::new(vec!["First Name".to_string()]).is_err());
    /// ```
    pub fn new(names: Vec<String>) -> Result<Self, ConversionError> {
        if names.is_empty() {
            return Err(ConversionError::InvalidElementName {
                name: String::new(),
            });
        }

        if let Some(name) = names.iter().find(|name| !is_valid_element_name(name)) {
            return Err(ConversionError::InvalidElementName { name: name.clone() });
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl TryFrom<Record> for Header {
    type Error = ConversionError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        Header::new(record.into_fields())
    }
}

/// One parsed CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line where the record starts
    line: usize,
    fields: Vec<String>,
}

impl Record {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn header_keeps_field_order() {
        let header = Header::new(names(&["X", "Y", "Z"])).unwrap();
        assert_eq!(header.iter().collect::<Vec<_>>(), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn empty_header_is_rejected() {
        assert!(matches!(
            Header::new(Vec::new()),
            Err(ConversionError::InvalidElementName { .. })
        ));
    }

    #[test]
    fn header_with_illegal_name_is_rejected() {
        let result = Header::new(names(&["id", "1st", "name"]));
        match result {
            Err(ConversionError::InvalidElementName { name }) => assert_eq!(name, "1st"),
            other => panic!("Expected InvalidElementName, got {:?}", other),
        }
    }

    #[test]
    fn header_from_record() {
        let record = Record::new(1, names(&["city", "country"]));
        let header = Header::try_from(record).unwrap();
        assert_eq!(header.names(), &["city".to_string(), "country".to_string()]);
    }
}
