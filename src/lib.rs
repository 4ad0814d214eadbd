#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # CSV to XML

 Converts delimited text files into XML documents with one element per record
 and one child element per column, named after the header line.

 ```text
 make,model              <?xml version="1.0" encoding="utf-8"?>
 Porsche,356       =>    <Root>
                           <record>
                             <make>Porsche</make>
                             <model>356</model>
                           </record>
                         </Root>
 ```

 ## Core Concepts

- **ItemReader:** [`item::csv::csv_reader::CsvRecordReader`] yields one
  [`core::record::Record`] per logical CSV row. Quoted fields may hold the
  delimiter or span several lines.
- **ItemWriter:** [`item::xml::XmlRecordWriter`] writes each record as an
  element, escaping values.
- **Converter:** [`core::converter::Converter`] drives the reader into the
  writer. Rows with the wrong number of fields, broken quoting or characters
  XML cannot carry are skipped and reported through [`core::diagnostics`].
- **Step:** [`tasklet::convert::ConvertTasklet`] converts one stored file and
  saves the document through a [`storage::BlobStore`], run by a
  [`core::step::TaskletStep`].
- **Triggers:** [`trigger::blob::BlobTrigger`] and
  [`trigger::http::HttpTrigger`] start conversions on blob arrival or on
  request.

 ## Features

| **Feature** | **Description**                                   |
|-------------|---------------------------------------------------|
| s3          | Enables a `BlobStore` backed by an S3 bucket      |
| full        | Enables all available features                    |

 ## Getting Started

```rust
use csv_to_xml::{core::converter::ConverterBuilder, error::ConversionError};

fn main() -> Result<(), ConversionError> {
    let csv = "year,make,model
1948,Porsche,356
1995,Peugeot,205,City car
2021,Mazda,\"CX-30, SUV\"";

    let converter = ConverterBuilder::new()
        .delimiter(b',')
        .skip_limit(2)
        .build();

    let result = converter.convert(csv)?;
    let xml = String::from_utf8_lossy(result.document());

    assert!(xml.contains("<model>CX-30, SUV</model>"));
    assert_eq!(result.write_count(), 2);
    assert_eq!(result.arity_mismatch_count(), 1);

    Ok(())
}
```
 */

/// Core module for conversions
pub mod core;

/// Error types for conversions
pub mod error;

#[doc(inline)]
pub use error::*;

/// CSV reader and XML writer
pub mod item;

/// Blob stores holding input and output files
pub mod storage;

/// Tasklets running a conversion as a step
pub mod tasklet;

/// Entry points starting conversions
pub mod trigger;
