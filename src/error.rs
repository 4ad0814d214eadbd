use thiserror::Error;

#[derive(Error, Debug)]
/// Conversion error
pub enum ConversionError {
    #[error("Malformed CSV at line {line}: {content}")]
    Parse { line: usize, content: String },

    #[error("Arity mismatch at line {line}: expected {expected} fields, found {found}")]
    ArityMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Value at line {line}, column {column} contains a character XML cannot represent")]
    InvalidValue { line: usize, column: usize },

    #[error("CSV must have at least one record")]
    EmptyInput,

    #[error("Invalid XML element name: {name:?}")]
    InvalidElementName { name: String },

    #[error("Emission: {0}")]
    Emission(String),

    #[error("Sink conflict: {0}")]
    SinkConflict(String),

    #[error("Skip limit of {0} records exceeded")]
    SkipLimitExceeded(usize),

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("Encoding: {0}")]
    Encoding(String),

    #[error("Blob not found: {0}")]
    BlobNotFound(String),

    #[error("Storage: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    Request(String),
}

impl ConversionError {
    /// Returns `true` for errors that only concern a single record.
    ///
    /// Record-level errors are counted and skipped by the converter; every
    /// other variant aborts the conversion of the whole file.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            ConversionError::Parse { .. }
                | ConversionError::ArityMismatch { .. }
                | ConversionError::InvalidValue { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ConversionError;

    #[test]
    fn record_level_errors_are_recoverable() {
        let parse = ConversionError::Parse {
            line: 3,
            content: "a,\"b".to_string(),
        };
        let arity = ConversionError::ArityMismatch {
            line: 4,
            expected: 3,
            found: 2,
        };

        assert!(parse.is_record_level());
        assert!(arity.is_record_level());
        assert!(!ConversionError::EmptyInput.is_record_level());
        assert!(!ConversionError::Emission("disk full".to_string()).is_record_level());
    }

    #[test]
    fn messages_name_the_offending_line() {
        let error = ConversionError::ArityMismatch {
            line: 7,
            expected: 3,
            found: 4,
        };
        assert_eq!(
            error.to_string(),
            "Arity mismatch at line 7: expected 3 fields, found 4"
        );
    }
}
