/// Conversion routine driving the CSV reader into the XML writer
pub mod converter;

/// Structured events about skipped records and finished conversions
pub mod diagnostics;

pub mod item;

/// Header and record types shared by readers and writers
pub mod record;

pub mod step;
