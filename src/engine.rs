//! Conversion engine.
//!
//! One `convert`/`flush` contract for every (source, target) pair. The
//! strategy is picked from the pair's encoding tags alone, so it is fixed at
//! compile time for each concrete `Converter<S, T>`:
//!
//! | Source   | Target      | Strategy       |
//! |----------|-------------|----------------|
//! | raw      | raw         | `Passthrough`  |
//! | raw      | any         | `ByteDecode`   |
//! | any      | raw         | `ByteEncode`   |
//! | ASCII    | UTF-32      | `AsciiToUtf32` |
//! | UTF-32   | ASCII       | `Utf32ToAscii` |
//! | named    | named       | `Delegate`     |
//!
//! A named encoding converted to itself still goes through the backend, so
//! `Converter<Utf8, Utf8>` rejects malformed input like any other pair.

use tracing::{debug, trace};

use crate::backend::{ConversionHandle, ConversionService, UnicodeBackend};
use crate::codec::ByteCodec;
use crate::encoding::{CodeUnit, Encoding, EncodingId, Endianness};
use crate::error::EncodingError;
use crate::verifier::{units_per_batch, Verifier, MAX_BATCH_BYTES};

/// Highest code point of 7-bit ASCII.
const ASCII_MAX: u32 = 0x7F;

/// How a converter moves units from source to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Raw bytes are copied unchanged.
    Passthrough,
    /// Raw bytes are packed into target units and verified.
    ByteDecode,
    /// Source units are unpacked into raw bytes.
    ByteEncode,
    /// Both sides are named encodings; the backend converts.
    Delegate,
    AsciiToUtf32,
    Utf32ToAscii,
}

impl Strategy {
    /// Strategy for a (source, target) pair. Never depends on runtime data.
    pub const fn select(source: EncodingId, target: EncodingId) -> Strategy {
        match (source, target) {
            (EncodingId::Raw, EncodingId::Raw) => Strategy::Passthrough,
            (EncodingId::Raw, _) => Strategy::ByteDecode,
            (_, EncodingId::Raw) => Strategy::ByteEncode,
            (EncodingId::Ascii, EncodingId::Utf32) => Strategy::AsciiToUtf32,
            (EncodingId::Utf32, EncodingId::Ascii) => Strategy::Utf32ToAscii,
            _ => Strategy::Delegate,
        }
    }
}

/// Per-instance converter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct ConverterOptions {
    /// Byte order for the raw-byte side of a conversion.
    pub byte_order: Endianness,
    /// Replace invalid input instead of rejecting it. Applies to both the
    /// verification and the delegated paths.
    pub accept_invalid: bool,
    /// Bytes per backend round-trip, clamped to one unit..=1024.
    pub batch_bytes: usize,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            byte_order: Endianness::NATIVE,
            accept_invalid: false,
            batch_bytes: MAX_BATCH_BYTES,
        }
    }
}

impl ConverterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_byte_order(mut self, byte_order: Endianness) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_accept_invalid(mut self, accept_invalid: bool) -> Self {
        self.accept_invalid = accept_invalid;
        self
    }

    pub fn with_batch_bytes(mut self, batch_bytes: usize) -> Self {
        self.batch_bytes = batch_bytes;
        self
    }
}

/// Backend session used by the `Delegate` strategy.
struct Delegation {
    handle: Box<dyn ConversionHandle>,
    units_per_batch: usize,
    scratch: Vec<u8>,
    /// Backend output not yet reassembled into whole target units.
    output: Vec<u8>,
}

enum State<T: Encoding> {
    Passthrough,
    Decode(ByteCodec<T>),
    Encode(Endianness),
    Delegate(Delegation),
    AsciiToUtf32,
    Utf32ToAscii,
    /// A previous call failed; the stream is dead.
    Failed(EncodingError),
}

/// A single-use streaming conversion from `S` to `T`.
///
/// Call [`convert`](Self::convert) zero or more times, then
/// [`flush`](Self::flush) exactly once; `flush` consumes the converter so it
/// cannot be reused for another stream. Any backend handle is released when
/// the converter is dropped, on success and failure alike.
pub struct Converter<S: Encoding, T: Encoding> {
    state: State<T>,
    _source: std::marker::PhantomData<S>,
}

impl<S: Encoding, T: Encoding> std::fmt::Debug for Converter<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("source", &S::backend_name())
            .field("target", &T::backend_name())
            .field("strategy", &Self::STRATEGY)
            .field("failed", &matches!(self.state, State::Failed(_)))
            .finish()
    }
}

impl<S: Encoding, T: Encoding> Converter<S, T> {
    /// Strategy shared by every converter of this pair.
    pub const STRATEGY: Strategy = Strategy::select(S::ID, T::ID);

    /// Converter on the default backend with default options.
    pub fn new() -> Result<Self, EncodingError> {
        Self::with_options(ConverterOptions::default())
    }

    pub fn with_options(options: ConverterOptions) -> Result<Self, EncodingError> {
        Self::with_service(&UnicodeBackend, options)
    }

    /// Converter whose backend sessions are opened on `service`.
    ///
    /// Fails with `BackendFailure` before any conversion if the service
    /// cannot open the pair.
    pub fn with_service(
        service: &dyn ConversionService,
        options: ConverterOptions,
    ) -> Result<Self, EncodingError> {
        let state = match Self::STRATEGY {
            Strategy::Passthrough => State::Passthrough,
            Strategy::ByteDecode => {
                let verifier =
                    Verifier::<T>::open(service, options.accept_invalid, options.batch_bytes)?;
                State::Decode(ByteCodec::new(options.byte_order, verifier))
            }
            Strategy::ByteEncode => State::Encode(options.byte_order),
            Strategy::Delegate => {
                let handle = service.open(
                    S::backend_name(),
                    T::backend_name(),
                    options.accept_invalid,
                )?;
                State::Delegate(Delegation {
                    handle,
                    units_per_batch: units_per_batch(options.batch_bytes, S::WIDTH),
                    scratch: Vec::new(),
                    output: Vec::new(),
                })
            }
            Strategy::AsciiToUtf32 => State::AsciiToUtf32,
            Strategy::Utf32ToAscii => State::Utf32ToAscii,
        };

        debug!(
            source = S::backend_name(),
            target = T::backend_name(),
            strategy = ?Self::STRATEGY,
            "converter created"
        );

        Ok(Self {
            state,
            _source: std::marker::PhantomData,
        })
    }

    /// Convert the next chunk of input, appending output units to `sink`.
    ///
    /// On error nothing from this call remains in `sink` and the converter
    /// refuses all further input.
    pub fn convert(
        &mut self,
        input: &[S::Unit],
        sink: &mut Vec<T::Unit>,
    ) -> Result<(), EncodingError> {
        let mark = sink.len();
        let result = self.convert_chunk(input, sink);
        self.settle(result, sink, mark)
    }

    /// Signal end of input and drain any buffered output into `sink`.
    ///
    /// Truncated trailing sequences are detected here.
    pub fn flush(mut self, sink: &mut Vec<T::Unit>) -> Result<(), EncodingError> {
        let mark = sink.len();
        let result = match std::mem::replace(&mut self.state, State::Passthrough) {
            State::Failed(err) => Err(err),
            State::Decode(codec) => codec.finish(),
            State::Delegate(mut delegation) => delegation.finish::<T>(sink),
            State::Passthrough
            | State::Encode(_)
            | State::AsciiToUtf32
            | State::Utf32ToAscii => Ok(()),
        };
        self.settle(result, sink, mark)
    }

    fn settle(
        &mut self,
        result: Result<(), EncodingError>,
        sink: &mut Vec<T::Unit>,
        mark: usize,
    ) -> Result<(), EncodingError> {
        if let Err(err) = &result {
            debug!(
                source = S::backend_name(),
                target = T::backend_name(),
                error = %err,
                "conversion failed"
            );
            sink.truncate(mark);
            self.state = State::Failed(err.clone());
        }
        result
    }

    fn convert_chunk(
        &mut self,
        input: &[S::Unit],
        sink: &mut Vec<T::Unit>,
    ) -> Result<(), EncodingError> {
        match &mut self.state {
            State::Failed(err) => Err(err.clone()),
            State::Passthrough => {
                sink.reserve(input.len());
                for &unit in input {
                    sink.push(T::Unit::try_from_u32(unit.to_u32())?);
                }
                Ok(())
            }
            State::Decode(codec) => {
                let bytes = input
                    .iter()
                    .map(|&unit| u8::try_from_u32(unit.to_u32()))
                    .collect::<Result<Vec<u8>, _>>()?;
                codec.decode(&bytes, sink)
            }
            State::Encode(order) => {
                let mut bytes = Vec::with_capacity(input.len() * S::WIDTH);
                ByteCodec::<S>::encode(input, *order, &mut bytes);
                sink.reserve(bytes.len());
                for byte in bytes {
                    sink.push(T::Unit::try_from_u32(u32::from(byte))?);
                }
                Ok(())
            }
            State::Delegate(delegation) => delegation.convert::<S, T>(input, sink),
            State::AsciiToUtf32 => {
                sink.reserve(input.len());
                for &unit in input {
                    let value = unit.to_u32();
                    if value > ASCII_MAX {
                        return Err(EncodingError::InvalidEncoding);
                    }
                    sink.push(T::Unit::try_from_u32(value)?);
                }
                Ok(())
            }
            State::Utf32ToAscii => {
                sink.reserve(input.len());
                for &unit in input {
                    let value = unit.to_u32();
                    if value > ASCII_MAX {
                        return Err(EncodingError::UnrepresentableCharacter);
                    }
                    sink.push(T::Unit::try_from_u32(value)?);
                }
                Ok(())
            }
        }
    }
}

impl Delegation {
    fn convert<S: Encoding, T: Encoding>(
        &mut self,
        input: &[S::Unit],
        sink: &mut Vec<T::Unit>,
    ) -> Result<(), EncodingError> {
        for batch in input.chunks(self.units_per_batch) {
            self.scratch.clear();
            ByteCodec::<S>::encode(batch, Endianness::NATIVE, &mut self.scratch);
            self.handle.convert(false, &self.scratch, &mut self.output)?;
            self.reassemble::<T>(sink);
        }
        Ok(())
    }

    fn finish<T: Encoding>(&mut self, sink: &mut Vec<T::Unit>) -> Result<(), EncodingError> {
        self.handle.convert(true, &[], &mut self.output)?;
        self.reassemble::<T>(sink);
        if !self.output.is_empty() {
            trace!(leftover = self.output.len(), "backend left a partial code unit");
            return Err(EncodingError::InvalidEncoding);
        }
        Ok(())
    }

    /// Move every whole native-order unit out of the backend output.
    fn reassemble<T: Encoding>(&mut self, sink: &mut Vec<T::Unit>) {
        let whole = self.output.len() - self.output.len() % T::WIDTH;
        sink.extend(
            self.output[..whole]
                .chunks_exact(T::WIDTH)
                .map(|bytes| T::Unit::from_bytes(bytes, Endianness::NATIVE)),
        );
        self.output.drain(..whole);
    }
}

// ============================================================================
// Tests
// ============================================================================
