//! Tests for converter options and the Transcoder context

use charconv::verifier::MAX_BATCH_BYTES;
use charconv::{ConverterOptions, Endianness, Transcoder, Utf16};

#[test]
fn test_default_options() {
    let options = ConverterOptions::default();
    assert_eq!(options.byte_order, Endianness::NATIVE);
    assert!(!options.accept_invalid);
    assert_eq!(options.batch_bytes, MAX_BATCH_BYTES);
}

#[test]
fn test_builder_methods() {
    let options = ConverterOptions::new()
        .with_byte_order(Endianness::Big)
        .with_accept_invalid(true)
        .with_batch_bytes(64);
    assert_eq!(options.byte_order, Endianness::Big);
    assert!(options.accept_invalid);
    assert_eq!(options.batch_bytes, 64);
}

#[test]
fn test_bytes_to_string_order_overrides_options() {
    let options = ConverterOptions::new().with_byte_order(Endianness::Little);
    let transcoder = Transcoder::with_options(options);
    let s = transcoder.bytes_to_string::<Utf16>(&[0x00, 0x41], Endianness::Big).unwrap();
    assert_eq!(s.as_units(), &[0x41]);
    assert_eq!(transcoder.options().byte_order, Endianness::Little);
}

#[cfg(feature = "serde")]
#[test]
fn test_options_from_json() {
    let options: ConverterOptions =
        serde_json::from_str(r#"{"byte-order": "big", "accept-invalid": true}"#).unwrap();
    assert_eq!(options.byte_order, Endianness::Big);
    assert!(options.accept_invalid);
    assert_eq!(options.batch_bytes, MAX_BATCH_BYTES);

    let little = ConverterOptions::new().with_byte_order(Endianness::Little);
    let json = serde_json::to_string(&little).unwrap();
    assert!(json.contains(r#""byte-order":"little""#));
}
