//! charconv: A sans-I/O streaming character-encoding conversion engine
//!
//! This crate converts between raw bytes and fixed-width text code units, and
//! between text encodings, while guaranteeing that every string it hands out
//! is a well-formed sequence in its declared encoding.
//!
//! # Features
//!
//! - **Streaming**: Input may be split at any byte boundary; partial code
//!   units and multi-unit sequences are buffered across calls
//! - **Strict**: Lone surrogates, out-of-range code points and truncated
//!   tails are rejected, never silently replaced
//! - **Byte order**: Big- or little-endian packing of 16/32-bit units
//! - **Pluggable backend**: Named-encoding conversion is delegated to a
//!   [`ConversionService`]; the default is built on `encoding_rs`
//!
//! # Quick Start
//!
//! ```rust
//! use charconv::{bytes_to_string, transcode, EncodedString, Endianness, Utf32, Utf8};
//!
//! let scalars = EncodedString::<Utf32>::from("Aé😀");
//! let utf8 = transcode::<Utf32, Utf8>(&scalars).unwrap();
//! assert_eq!(utf8.as_units(), &[0x41, 0xC3, 0xA9, 0xF0, 0x9F, 0x98, 0x80]);
//!
//! // A lone high surrogate is rejected.
//! let err = bytes_to_string::<charconv::Utf16>(&[0xD8, 0x00], Endianness::Big);
//! assert!(err.is_err());
//! ```
//!
//! # Streaming
//!
//! ```rust
//! use charconv::{Converter, ConverterOptions, Endianness, Raw, Utf16};
//!
//! let options = ConverterOptions::new().with_byte_order(Endianness::Big);
//! let mut converter = Converter::<Raw, Utf16>::with_options(options).unwrap();
//! let mut units = Vec::new();
//! converter.convert(&[0xD8, 0x3D, 0xDE], &mut units).unwrap();
//! converter.convert(&[0x00], &mut units).unwrap();
//! converter.flush(&mut units).unwrap();
//! assert_eq!(units, [0xD83D, 0xDE00]);
//! ```
//!
//! # Architecture
//!
//! - Encoding descriptors (compile-time marker types)
//! - Byte/scalar codec (bytes ↔ code units)
//! - Verifier (legality via the backend)
//! - Conversion engine (per-pair strategy dispatch)
//! - Encoded strings and whole-input transcode entrypoints
//!
//! It does NOT provide normalization, collation or locale-aware casing, and
//! performs no I/O of its own.

pub mod backend;
pub mod codec;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod string;
pub mod verifier;

pub use backend::{ConversionHandle, ConversionService, UnicodeBackend};
pub use encoding::{
    Ascii, CodeUnit, Encoding, EncodingId, Endianness, Raw, UnicodeEncoding, Utf16, Utf32,
    Utf8, Windows1252, RAW_NAME,
};
pub use engine::{Converter, ConverterOptions, Strategy};
pub use error::EncodingError;
pub use string::{bytes_to_string, string_to_bytes, transcode, EncodedString, Transcoder};
