/// This module provides the CSV record reader.
pub mod csv;

/// This module provides the XML record writer and XML naming rules.
pub mod xml;
