//! Encoded strings and whole-input transcoding.
//!
//! [`EncodedString`] holds a code-unit sequence that is always well-formed
//! for its encoding. The only ways to build one are the validating
//! entrypoints here and the valid-by-construction literal paths.

use std::fmt;
use std::marker::PhantomData;

use crate::backend::{ConversionService, UnicodeBackend};
use crate::codec::ByteCodec;
use crate::encoding::{Ascii, Encoding, Endianness, Raw, UnicodeEncoding};
use crate::engine::{Converter, ConverterOptions, Strategy};
use crate::error::EncodingError;
use crate::verifier::Verifier;

/// A well-formed sequence of `E` code units.
pub struct EncodedString<E: Encoding> {
    units: Vec<E::Unit>,
    _encoding: PhantomData<E>,
}

impl<E: Encoding> EncodedString<E> {
    /// An empty string.
    pub fn new() -> Self {
        Self::from_units_unchecked(Vec::new())
    }

    /// Wrap units the caller already knows to be well-formed.
    ///
    /// Reserved for compile-time-known literals; everything else goes
    /// through [`try_from_units`](Self::try_from_units) or a transcode.
    pub fn from_units_unchecked<I>(units: I) -> Self
    where
        I: IntoIterator<Item = E::Unit>,
    {
        Self {
            units: units.into_iter().collect(),
            _encoding: PhantomData,
        }
    }

    /// Validate `units` on the default backend and wrap them.
    pub fn try_from_units(units: &[E::Unit]) -> Result<Self, EncodingError> {
        Transcoder::default().validate::<E>(units)
    }

    pub fn as_units(&self) -> &[E::Unit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<E::Unit> {
        self.units
    }

    /// Number of code units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Serialize to bytes, `E::WIDTH` per unit in `order`.
    pub fn to_bytes(&self, order: Endianness) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.units.len() * E::WIDTH);
        ByteCodec::<E>::encode(&self.units, order, &mut out);
        out
    }
}

impl EncodedString<Raw> {
    /// Any byte sequence is a valid raw string.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_units_unchecked(bytes.iter().copied())
    }
}

impl EncodedString<Ascii> {
    /// Returns `None` if `text` is not pure 7-bit ASCII.
    pub fn from_ascii(text: &str) -> Option<Self> {
        text.is_ascii()
            .then(|| Self::from_units_unchecked(text.bytes()))
    }
}

impl<E: UnicodeEncoding> From<&str> for EncodedString<E> {
    fn from(text: &str) -> Self {
        let mut units = Vec::with_capacity(text.len());
        E::push_str(text, &mut units);
        Self::from_units_unchecked(units)
    }
}

impl<E: UnicodeEncoding> fmt::Display for EncodedString<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&E::to_text(&self.units))
    }
}

impl<E: Encoding> fmt::Debug for EncodedString<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedString")
            .field("encoding", &E::backend_name())
            .field("units", &self.units)
            .finish()
    }
}

impl<E: Encoding> Clone for EncodedString<E> {
    fn clone(&self) -> Self {
        Self::from_units_unchecked(self.units.clone())
    }
}

impl<E: Encoding> PartialEq for EncodedString<E> {
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units
    }
}

impl<E: Encoding> Eq for EncodedString<E> {}

impl<E: Encoding> Default for EncodedString<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Conversion context: a backend plus converter options.
///
/// Create one per host and pass it around; it holds no per-stream state and
/// can be shared across threads. Each operation runs its own converter.
pub struct Transcoder {
    service: Box<dyn ConversionService>,
    options: ConverterOptions,
}

impl fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("options", &self.options)
            .finish()
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new(UnicodeBackend, ConverterOptions::default())
    }
}

impl Transcoder {
    pub fn new(service: impl ConversionService + 'static, options: ConverterOptions) -> Self {
        Self {
            service: Box::new(service),
            options,
        }
    }

    /// Default backend with the given options.
    pub fn with_options(options: ConverterOptions) -> Self {
        Self::new(UnicodeBackend, options)
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Convert a whole string to `T`. All or nothing.
    pub fn transcode<S: Encoding, T: Encoding>(
        &self,
        source: &EncodedString<S>,
    ) -> Result<EncodedString<T>, EncodingError> {
        self.run::<S, T>(source.as_units(), self.options)
    }

    /// Decode a whole byte range into `T`, packing units in `order`.
    ///
    /// Always strict; `accept_invalid` is ignored here.
    pub fn bytes_to_string<T: Encoding>(
        &self,
        bytes: &[u8],
        order: Endianness,
    ) -> Result<EncodedString<T>, EncodingError> {
        let options = self.options.with_byte_order(order);
        self.run::<Raw, T>(bytes, options)
    }

    /// Serialize a string to bytes in `order`.
    pub fn string_to_bytes<S: Encoding>(
        &self,
        source: &EncodedString<S>,
        order: Endianness,
    ) -> Vec<u8> {
        source.to_bytes(order)
    }

    /// Check that `units` are well-formed for `E` and wrap them.
    ///
    /// Always strict, whatever `accept_invalid` says.
    pub fn validate<E: Encoding>(
        &self,
        units: &[E::Unit],
    ) -> Result<EncodedString<E>, EncodingError> {
        let mut verifier =
            Verifier::<E>::open(self.service.as_ref(), false, self.options.batch_bytes)?;
        verifier.verify(units)?;
        verifier.finish()?;
        Ok(EncodedString::from_units_unchecked(units.iter().copied()))
    }

    fn run<S: Encoding, T: Encoding>(
        &self,
        input: &[S::Unit],
        options: ConverterOptions,
    ) -> Result<EncodedString<T>, EncodingError> {
        // Byte decoding keeps the packed units, never the backend's repairs.
        let options = match Converter::<S, T>::STRATEGY {
            Strategy::ByteDecode => options.with_accept_invalid(false),
            _ => options,
        };
        let mut converter = Converter::<S, T>::with_service(self.service.as_ref(), options)?;
        let mut units = Vec::with_capacity(input.len());
        converter.convert(input, &mut units)?;
        converter.flush(&mut units)?;
        Ok(EncodedString::from_units_unchecked(units))
    }
}

/// Convert a whole string to `T` on the default backend.
///
/// Returns either a fully valid target string or the first error; output
/// produced before the error is discarded.
pub fn transcode<S: Encoding, T: Encoding>(
    source: &EncodedString<S>,
) -> Result<EncodedString<T>, EncodingError> {
    Transcoder::default().transcode(source)
}

/// Decode a whole byte range into `T` on the default backend.
pub fn bytes_to_string<T: Encoding>(
    bytes: &[u8],
    order: Endianness,
) -> Result<EncodedString<T>, EncodingError> {
    Transcoder::default().bytes_to_string(bytes, order)
}

/// Serialize a string to bytes in `order`.
pub fn string_to_bytes<S: Encoding>(source: &EncodedString<S>, order: Endianness) -> Vec<u8> {
    source.to_bytes(order)
}
