//! Mock versions of std::fs::File and of a blob store
use mockall::mock;

use std::io::{self, Write};

use csv_to_xml::{
    error::ConversionError,
    storage::{BlobStore, OverwritePolicy},
};

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

mock! {
    pub Store {}
    impl BlobStore for Store {
        fn get(&self, name: &str) -> Result<Vec<u8>, ConversionError>;
        fn exists(&self, name: &str) -> Result<bool, ConversionError>;
        fn put(&self, name: &str, content: &[u8], policy: OverwritePolicy) -> Result<(), ConversionError>;
    }
}
