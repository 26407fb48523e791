//! Tests for the direct ASCII ↔ UTF-32 specialization and same-encoding pairs

use charconv::{Ascii, Converter, EncodingError, Raw, Strategy, Utf16, Utf32, Utf8};

fn run<S: charconv::Encoding, T: charconv::Encoding>(
    input: &[S::Unit],
) -> Result<Vec<T::Unit>, EncodingError> {
    let mut converter = Converter::<S, T>::new()?;
    let mut out = Vec::new();
    converter.convert(input, &mut out)?;
    converter.flush(&mut out)?;
    Ok(out)
}

#[test]
fn test_strategy_resolved_per_pair() {
    assert_eq!(Converter::<Ascii, Utf32>::STRATEGY, Strategy::AsciiToUtf32);
    assert_eq!(Converter::<Utf32, Ascii>::STRATEGY, Strategy::Utf32ToAscii);
    assert_eq!(Converter::<Raw, Raw>::STRATEGY, Strategy::Passthrough);
    assert_eq!(Converter::<Utf16, Utf16>::STRATEGY, Strategy::Delegate);
}

#[test]
fn test_encode_7f_succeeds() {
    assert_eq!(run::<Utf32, Ascii>(&[0x7F]), Ok(vec![0x7F]));
}

#[test]
fn test_encode_80_unrepresentable() {
    assert_eq!(run::<Utf32, Ascii>(&[0x80]), Err(EncodingError::UnrepresentableCharacter));
}

#[test]
fn test_decode_abc() {
    assert_eq!(run::<Ascii, Utf32>(&[0x41, 0x42, 0x43]), Ok(vec![0x41, 0x42, 0x43]));
}

#[test]
fn test_decode_high_byte_invalid() {
    assert_eq!(run::<Ascii, Utf32>(&[0x41, 0xFF]), Err(EncodingError::InvalidEncoding));
}

#[test]
fn test_empty_input() {
    assert_eq!(run::<Ascii, Utf32>(&[]), Ok(vec![]));
    assert_eq!(run::<Utf32, Ascii>(&[]), Ok(vec![]));
}

#[test]
fn test_raw_to_raw_copies_bytes() {
    assert_eq!(run::<Raw, Raw>(&[0xFF, 0x00, 0x80]), Ok(vec![0xFF, 0x00, 0x80]));
}

#[test]
fn test_identity_pair_copies_valid_units() {
    let text = "naïve".as_bytes();
    assert_eq!(run::<Utf8, Utf8>(text), Ok(text.to_vec()));
    assert_eq!(run::<Ascii, Ascii>(b"plain"), Ok(b"plain".to_vec()));
}

#[test]
fn test_identity_pair_rejects_malformed_units() {
    assert_eq!(run::<Utf8, Utf8>(&[0x41, 0xFF]), Err(EncodingError::InvalidEncoding));
    assert_eq!(run::<Utf8, Utf8>(&[0xE2, 0x82]), Err(EncodingError::InvalidEncoding));
    assert_eq!(run::<Utf16, Utf16>(&[0x41, 0xD800]), Err(EncodingError::InvalidEncoding));
    assert_eq!(run::<Utf32, Utf32>(&[0x11_0000]), Err(EncodingError::InvalidEncoding));
    assert_eq!(run::<Ascii, Ascii>(&[0x80]), Err(EncodingError::InvalidEncoding));
}
