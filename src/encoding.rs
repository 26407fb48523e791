//! Encoding descriptors and fixed-width code units.
//!
//! An encoding is described at compile time by a zero-sized marker type:
//! its code-unit width and the name the conversion backend knows it by.
//! Descriptors carry no runtime behavior of their own.

use std::fmt;

use crate::error::EncodingError;

/// Byte order used when packing a multi-byte code unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Endianness {
    /// Most-significant byte first.
    Big,
    /// Least-significant byte first.
    Little,
}

impl Endianness {
    /// Byte order of the target platform.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endianness = Endianness::Little;
    /// Byte order of the target platform.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endianness = Endianness::Big;
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::NATIVE
    }
}

/// A fixed-width integer holding one code unit of some encoding.
pub trait CodeUnit: Copy + Eq + Default + fmt::Debug + Send + Sync + 'static {
    /// Width in bytes (1, 2 or 4).
    const WIDTH: usize;

    /// Append exactly `WIDTH` bytes for this unit in the given order.
    fn write_bytes(self, order: Endianness, out: &mut Vec<u8>);

    /// Assemble a unit from exactly `WIDTH` bytes.
    fn from_bytes(bytes: &[u8], order: Endianness) -> Self;

    fn to_u32(self) -> u32;

    /// Narrow a value into this unit type.
    fn try_from_u32(value: u32) -> Result<Self, EncodingError>;
}

macro_rules! impl_code_unit {
    ($($t:ty),*) => {$(
        impl CodeUnit for $t {
            const WIDTH: usize = std::mem::size_of::<$t>();

            #[inline]
            fn write_bytes(self, order: Endianness, out: &mut Vec<u8>) {
                match order {
                    Endianness::Big => out.extend_from_slice(&self.to_be_bytes()),
                    Endianness::Little => out.extend_from_slice(&self.to_le_bytes()),
                }
            }

            #[inline]
            fn from_bytes(bytes: &[u8], order: Endianness) -> Self {
                debug_assert_eq!(bytes.len(), Self::WIDTH);
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                match order {
                    Endianness::Big => <$t>::from_be_bytes(buf),
                    Endianness::Little => <$t>::from_le_bytes(buf),
                }
            }

            #[inline]
            fn to_u32(self) -> u32 {
                u32::from(self)
            }

            #[inline]
            fn try_from_u32(value: u32) -> Result<Self, EncodingError> {
                <$t>::try_from(value).map_err(|_| EncodingError::UnrepresentableCodepoint)
            }
        }
    )*};
}

impl_code_unit!(u8, u16, u32);

/// Closed set of encodings known to the strategy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingId {
    Raw,
    Ascii,
    Utf8,
    Utf16,
    Utf32,
    Windows1252,
}

/// Compile-time description of one encoding.
pub trait Encoding: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Code unit type; its width is fixed for the lifetime of the program.
    type Unit: CodeUnit;

    /// Tag used to select a conversion strategy.
    const ID: EncodingId;

    /// Backend registry name, or `None` for raw bytes.
    const NAME: Option<&'static str>;

    /// Code-unit width in bytes.
    const WIDTH: usize = <Self::Unit as CodeUnit>::WIDTH;

    /// Name handed to the conversion backend; raw bytes map to `"none"`.
    fn backend_name() -> &'static str {
        Self::NAME.unwrap_or(RAW_NAME)
    }
}

/// Registry name of the "no conversion" pseudo-encoding.
pub const RAW_NAME: &str = "none";

const UTF16_NATIVE_NAME: &str = if cfg!(target_endian = "little") {
    "utf-16le"
} else {
    "utf-16be"
};

const UTF32_NATIVE_NAME: &str = if cfg!(target_endian = "little") {
    "utf-32le"
} else {
    "utf-32be"
};

macro_rules! descriptor {
    ($(#[$meta:meta])* $name:ident, $unit:ty, $id:ident, $reg:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl Encoding for $name {
            type Unit = $unit;
            const ID: EncodingId = EncodingId::$id;
            const NAME: Option<&'static str> = $reg;
        }
    };
}

descriptor!(
    /// Raw bytes with no text interpretation.
    Raw, u8, Raw, None
);
descriptor!(
    /// 7-bit US-ASCII.
    Ascii, u8, Ascii, Some("us-ascii")
);
descriptor!(
    /// UTF-8, one byte per code unit.
    Utf8, u8, Utf8, Some("utf-8")
);
descriptor!(
    /// UTF-16 in native-order 16-bit code units.
    Utf16, u16, Utf16, Some(UTF16_NATIVE_NAME)
);
descriptor!(
    /// UTF-32, one Unicode scalar value per code unit.
    Utf32, u32, Utf32, Some(UTF32_NATIVE_NAME)
);
descriptor!(
    /// The WHATWG windows-1252 single-byte legacy encoding.
    Windows1252, u8, Windows1252, Some("windows-1252")
);

/// Encodings that can represent every Unicode scalar value.
///
/// Rust string slices are valid Unicode by construction, so these
/// encodings can be built from `&str` without consulting the backend.
pub trait UnicodeEncoding: Encoding {
    fn push_str(text: &str, out: &mut Vec<Self::Unit>);

    /// Render a well-formed unit sequence as text.
    fn to_text(units: &[Self::Unit]) -> String;
}

impl UnicodeEncoding for Utf8 {
    fn push_str(text: &str, out: &mut Vec<u8>) {
        out.extend_from_slice(text.as_bytes());
    }

    fn to_text(units: &[u8]) -> String {
        String::from_utf8_lossy(units).into_owned()
    }
}

impl UnicodeEncoding for Utf16 {
    fn push_str(text: &str, out: &mut Vec<u16>) {
        out.extend(text.encode_utf16());
    }

    fn to_text(units: &[u16]) -> String {
        char::decode_utf16(units.iter().copied())
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl UnicodeEncoding for Utf32 {
    fn push_str(text: &str, out: &mut Vec<u32>) {
        out.extend(text.chars().map(u32::from));
    }

    fn to_text(units: &[u32]) -> String {
        units
            .iter()
            .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}
