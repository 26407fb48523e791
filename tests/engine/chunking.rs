//! Tests that splitting input across convert calls never changes output

use charconv::{
    Ascii, Converter, ConverterOptions, Encoding, EncodingError, Endianness, Raw, Utf16, Utf32,
    Utf8, Windows1252,
};
use proptest::prelude::*;

const SAMPLE: &str = "Aé€\u{1F600}z\u{10FFFF}";

fn whole<S: Encoding, T: Encoding>(
    input: &[S::Unit],
    options: ConverterOptions,
) -> Result<Vec<T::Unit>, EncodingError> {
    let mut converter = Converter::<S, T>::with_options(options)?;
    let mut out = Vec::new();
    converter.convert(input, &mut out)?;
    converter.flush(&mut out)?;
    Ok(out)
}

fn pieces<S: Encoding, T: Encoding>(
    chunks: &[&[S::Unit]],
    options: ConverterOptions,
) -> Result<Vec<T::Unit>, EncodingError> {
    let mut converter = Converter::<S, T>::with_options(options)?;
    let mut out = Vec::new();
    for chunk in chunks {
        converter.convert(chunk, &mut out)?;
    }
    converter.flush(&mut out)?;
    Ok(out)
}

/// Compare one-shot output with every two-way split and with unit-at-a-time.
fn assert_chunking_invariant<S: Encoding, T: Encoding>(
    input: &[S::Unit],
    options: ConverterOptions,
) {
    let expected = whole::<S, T>(input, options);

    for split in 0..=input.len() {
        let (head, tail) = input.split_at(split);
        assert_eq!(pieces::<S, T>(&[head, tail], options), expected, "split at {}", split);
    }

    let singles: Vec<&[S::Unit]> = input.chunks(1).collect();
    assert_eq!(pieces::<S, T>(&singles, options), expected, "unit at a time");
}

#[test]
fn test_bytes_to_utf16_every_boundary() {
    for order in [Endianness::Big, Endianness::Little] {
        let options = ConverterOptions::new().with_byte_order(order);
        let mut bytes = Vec::new();
        for unit in SAMPLE.encode_utf16() {
            let b = match order {
                Endianness::Big => unit.to_be_bytes(),
                Endianness::Little => unit.to_le_bytes(),
            };
            bytes.extend_from_slice(&b);
        }
        assert_chunking_invariant::<Raw, Utf16>(&bytes, options);
        assert!(whole::<Raw, Utf16>(&bytes, options).is_ok());
    }
}

#[test]
fn test_bytes_to_utf32_every_boundary() {
    let options = ConverterOptions::new().with_byte_order(Endianness::Big);
    let bytes: Vec<u8> = SAMPLE.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect();
    assert_chunking_invariant::<Raw, Utf32>(&bytes, options);
}

#[test]
fn test_bytes_to_utf8_every_boundary() {
    assert_chunking_invariant::<Raw, Utf8>(SAMPLE.as_bytes(), ConverterOptions::default());
}

#[test]
fn test_invalid_input_fails_regardless_of_split() {
    let options = ConverterOptions::new().with_byte_order(Endianness::Big);
    let bytes = [0x00, 0x41, 0xD8, 0x3D, 0x00, 0x42];
    assert_chunking_invariant::<Raw, Utf16>(&bytes, options);
    assert_eq!(whole::<Raw, Utf16>(&bytes, options), Err(EncodingError::InvalidEncoding));
}

#[test]
fn test_delegated_pairs_every_boundary() {
    let options = ConverterOptions::default();
    let utf8: Vec<u8> = SAMPLE.bytes().collect();
    let utf16: Vec<u16> = SAMPLE.encode_utf16().collect();
    let utf32: Vec<u32> = SAMPLE.chars().map(u32::from).collect();

    assert_chunking_invariant::<Utf8, Utf16>(&utf8, options);
    assert_chunking_invariant::<Utf8, Utf32>(&utf8, options);
    assert_chunking_invariant::<Utf16, Utf8>(&utf16, options);
    assert_chunking_invariant::<Utf16, Utf32>(&utf16, options);
    assert_chunking_invariant::<Utf32, Utf8>(&utf32, options);
    assert_chunking_invariant::<Utf32, Utf16>(&utf32, options);
}

#[test]
fn test_legacy_pair_every_boundary() {
    let cp1252: Vec<u8> = vec![0x41, 0x80, 0xE9, 0x9F];
    assert_chunking_invariant::<Windows1252, Utf8>(&cp1252, ConverterOptions::default());
    let out = whole::<Windows1252, Utf8>(&cp1252, ConverterOptions::default()).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "A€éŸ");
}

#[test]
fn test_bytes_to_single_byte_targets_every_boundary() {
    let options = ConverterOptions::default();
    assert_chunking_invariant::<Raw, Ascii>(b"plain text", options);
    assert_chunking_invariant::<Raw, Ascii>(&[0x41, 0x42, 0x80, 0x43], options);

    let cp1252: Vec<u8> = (0..=255).collect();
    assert_chunking_invariant::<Raw, Windows1252>(&cp1252, options);
    assert_eq!(whole::<Raw, Windows1252>(&cp1252, options), Ok(cp1252.clone()));
}

#[test]
fn test_ascii_utf32_specializations_every_boundary() {
    let options = ConverterOptions::default();
    assert_chunking_invariant::<Ascii, Utf32>(b"ASCII only", options);
    assert_chunking_invariant::<Ascii, Utf32>(&[0x41, 0xC0, 0x42], options);
    assert_chunking_invariant::<Utf32, Ascii>(&[0x41, 0x42, 0x7F], options);
    assert_chunking_invariant::<Utf32, Ascii>(&[0x41, 0xE9, 0x42], options);
}

#[test]
fn test_delegated_single_byte_targets_every_boundary() {
    let options = ConverterOptions::default();
    let ascii = "plain";
    let latin = "A€éŸ";

    let utf8: Vec<u8> = ascii.bytes().collect();
    let utf16: Vec<u16> = ascii.encode_utf16().collect();
    assert_chunking_invariant::<Utf8, Ascii>(&utf8, options);
    assert_chunking_invariant::<Utf16, Ascii>(&utf16, options);
    assert_chunking_invariant::<Utf8, Ascii>(SAMPLE.as_bytes(), options);

    let utf8: Vec<u8> = latin.bytes().collect();
    let utf16: Vec<u16> = latin.encode_utf16().collect();
    let utf32: Vec<u32> = latin.chars().map(u32::from).collect();
    assert_chunking_invariant::<Utf8, Windows1252>(&utf8, options);
    assert_chunking_invariant::<Utf16, Windows1252>(&utf16, options);
    assert_chunking_invariant::<Utf32, Windows1252>(&utf32, options);
    assert_eq!(
        whole::<Utf16, Windows1252>(&utf16, options),
        Ok(vec![0x41, 0x80, 0xE9, 0x9F])
    );
}

#[test]
fn test_same_encoding_pairs_every_boundary() {
    let options = ConverterOptions::default();
    let utf16: Vec<u16> = SAMPLE.encode_utf16().collect();
    assert_chunking_invariant::<Utf8, Utf8>(SAMPLE.as_bytes(), options);
    assert_chunking_invariant::<Utf16, Utf16>(&utf16, options);
    assert_chunking_invariant::<Utf16, Utf16>(&[0x41, 0xD83D], options);
}

#[test]
fn test_encode_to_bytes_every_boundary() {
    let utf32: Vec<u32> = SAMPLE.chars().map(u32::from).collect();
    let options = ConverterOptions::new().with_byte_order(Endianness::Little);
    assert_chunking_invariant::<Utf32, Raw>(&utf32, options);
}

proptest! {
    #[test]
    fn prop_utf16_bytes_split_anywhere(
        text in any::<String>(),
        split in any::<prop::sample::Index>(),
    ) {
        let options = ConverterOptions::new().with_byte_order(Endianness::Big);
        let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        let at = if bytes.is_empty() { 0 } else { split.index(bytes.len() + 1) };
        let (head, tail) = bytes.split_at(at);

        let expected = whole::<Raw, Utf16>(&bytes, options);
        prop_assert_eq!(pieces::<Raw, Utf16>(&[head, tail], options), expected);
    }

    #[test]
    fn prop_utf8_to_utf32_split_anywhere(
        text in any::<String>(),
        split in any::<prop::sample::Index>(),
    ) {
        let units = text.as_bytes();
        let at = if units.is_empty() { 0 } else { split.index(units.len() + 1) };
        let (head, tail) = units.split_at(at);

        let out = pieces::<Utf8, Utf32>(&[head, tail], ConverterOptions::default()).unwrap();
        let expected: Vec<u32> = text.chars().map(u32::from).collect();
        prop_assert_eq!(out, expected);
    }
}
