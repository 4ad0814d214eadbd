mod common;

use std::io::{self, ErrorKind};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use common::{MockFile, MockStore};

use csv_to_xml::{
    core::{converter::ConverterBuilder, diagnostics::NoopDiagnostics},
    error::ConversionError,
    storage::{OverwritePolicy, StorageConfigBuilder},
    trigger::http::HttpTrigger,
};

#[test]
fn failing_output_is_an_emission_error() {
    let mut file = MockFile::default();
    file.expect_write()
        .returning(|_| Err(io::Error::new(ErrorKind::Other, "disk full")));
    file.expect_flush().returning(|| Ok(()));

    let converter = ConverterBuilder::new().build();
    let result = converter.convert_to_writer("X,Y\n1,2\n", file);

    assert!(matches!(result, Err(ConversionError::Emission(message)) if message.contains("disk full")));
}

#[test]
fn failed_conversion_never_reaches_output() {
    let mut file = MockFile::default();
    file.expect_write().never();
    file.expect_flush().never();

    let converter = ConverterBuilder::new().build();
    let result = converter.convert_to_writer("X,Y\n", file);

    assert!(matches!(result, Err(ConversionError::EmptyInput)));
}

#[test]
fn inputs_without_data_rows_are_empty() {
    let converter = ConverterBuilder::new().build();

    for csv in ["", "\n\n\r\n", "year,make,model", "year,make,model\n\n"] {
        assert!(
            matches!(converter.convert(csv), Err(ConversionError::EmptyInput)),
            "{:?} should be empty input",
            csv
        );
    }
}

#[test]
fn invalid_utf8_is_an_encoding_error() {
    let converter = ConverterBuilder::new().build();

    let result = converter.convert_bytes(b"name\n\xff\xfe\n");

    assert!(matches!(result, Err(ConversionError::Encoding(_))));
}

#[test]
fn header_with_illegal_name_is_rejected() {
    let converter = ConverterBuilder::new().build();

    for csv in ["1st,b\nx,y\n", "a,\nx,y\n", "a,ns:b\nx,y\n", "a,b c\nx,y\n"] {
        assert!(
            matches!(
                converter.convert(csv),
                Err(ConversionError::InvalidElementName { .. })
            ),
            "{:?} should be rejected",
            csv
        );
    }
}

#[test]
fn too_many_skips_abort_the_conversion() {
    let converter = ConverterBuilder::new()
        .diagnostics(&NoopDiagnostics)
        .skip_limit(1)
        .build();

    let result = converter.convert("a,b\n1\n2,3\n4\n5,6\n");

    assert!(matches!(result, Err(ConversionError::SkipLimitExceeded(1))));
}

#[test]
fn raised_flag_aborts_the_conversion() {
    let flag = Arc::new(AtomicBool::new(false));
    let converter = ConverterBuilder::new().cancellation(flag.clone()).build();

    assert!(converter.convert("a\n1\n").is_ok());

    flag.store(true, Ordering::Relaxed);
    assert!(matches!(
        converter.convert("a\n1\n"),
        Err(ConversionError::Cancelled)
    ));
}

#[test]
fn existing_target_is_a_sink_conflict() {
    let config = StorageConfigBuilder::new()
        .connection("/unused")
        .overwrite(OverwritePolicy::SkipIfExists)
        .build()
        .unwrap();

    let mut store = MockStore::default();
    store
        .expect_get()
        .withf(|name| name == "csv/sales.csv")
        .returning(|_| Ok(b"id\n1\n".to_vec()));
    store
        .expect_put()
        .withf(|name, _, policy| name == "xml/sales.xml" && *policy == OverwritePolicy::SkipIfExists)
        .times(1)
        .returning(|name, _, _| {
            Err(ConversionError::SinkConflict(format!("{} already exists", name)))
        });

    let converter = ConverterBuilder::new().build();
    let trigger = HttpTrigger::new(&store, &config, &converter);

    let response = trigger.handle(br#"{"FileName":"sales.csv"}"#);

    assert_eq!(response.status, 409);
    assert!(response.body.contains("already exists"));
}

#[test]
fn missing_input_is_not_found_and_writes_nothing() {
    let config = StorageConfigBuilder::new()
        .connection("/unused")
        .build()
        .unwrap();

    let mut store = MockStore::default();
    store
        .expect_get()
        .returning(|name| Err(ConversionError::BlobNotFound(name.to_string())));
    store.expect_put().never();

    let converter = ConverterBuilder::new().build();
    let trigger = HttpTrigger::new(&store, &config, &converter);

    let response = trigger.handle(br#"{"FileName":"missing.csv"}"#);

    assert_eq!(response.status, 404);
    assert!(response.body.contains("csv/missing.csv"));
}

#[test]
fn storage_failure_is_a_server_error() {
    let config = StorageConfigBuilder::new()
        .connection("/unused")
        .build()
        .unwrap();

    let mut store = MockStore::default();
    store.expect_get().returning(|_| Ok(b"id\n1\n".to_vec()));
    store
        .expect_put()
        .returning(|_, _, _| Err(ConversionError::Storage("connection reset".to_string())));

    let converter = ConverterBuilder::new().build();
    let trigger = HttpTrigger::new(&store, &config, &converter);

    let response = trigger.handle(br#"{"FileName":"sales.csv"}"#);

    assert_eq!(response.status, 500);
    assert!(response.body.contains("connection reset"));
}
