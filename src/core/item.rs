use crate::error::ConversionError;

/// Result of a single read: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<I> = Result<Option<I>, ConversionError>;

pub type ItemWriterResult = Result<(), ConversionError>;

/// Retrieval of input, one item at a time.
///
/// A reader keeps going after a failed read: an `Err` describes one bad item
/// and the next call moves on to the following one.
pub trait ItemReader<I> {
    fn read(&self) -> ItemReaderResult<I>;
}

/// Output of items, usually into a buffered destination.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;
    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }
    fn open(&self) -> ItemWriterResult {
        Ok(())
    }
    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}
