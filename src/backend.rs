//! External conversion service.
//!
//! The engine never interprets named encodings itself. It asks a
//! [`ConversionService`] for a handle on a (source, target) pair and streams
//! bytes through it. [`UnicodeBackend`] is the default service: a thin
//! wrapper around `encoding_rs` that fills in what the WHATWG registry lacks
//! (UTF-32, strict 7-bit ASCII and the "none" pseudo-encoding).

use encoding_rs::{
    CoderResult, Decoder, DecoderResult, Encoder, EncoderResult, Encoding as WhatwgEncoding,
    REPLACEMENT, UTF_16BE, UTF_16LE, UTF_8,
};
use tracing::{debug, trace};

use crate::encoding::{CodeUnit, Endianness, RAW_NAME};
use crate::error::EncodingError;

/// A backend that knows named encodings and converts bytes between them.
pub trait ConversionService: Send + Sync {
    /// Open a streaming conversion from `from` to `to`.
    ///
    /// With `accept_invalid` unset, structurally invalid input is rejected
    /// instead of being replaced.
    fn open(
        &self,
        from: &str,
        to: &str,
        accept_invalid: bool,
    ) -> Result<Box<dyn ConversionHandle>, EncodingError>;
}

/// One open conversion, exclusively owned by the session that opened it.
///
/// Resources are released when the handle is dropped.
pub trait ConversionHandle: Send {
    /// Convert `input` and append the result to `output`.
    ///
    /// `flush` marks the final call of the stream. A multi-byte sequence left
    /// unterminated is reported on that call and never earlier.
    fn convert(
        &mut self,
        flush: bool,
        input: &[u8],
        output: &mut Vec<u8>,
    ) -> Result<(), EncodingError>;
}

/// Default conversion service backed by `encoding_rs`.
///
/// Conversion pivots through UTF-8 text: the source decoder fills a pivot
/// string with complete characters, the target encoder drains it.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeBackend;

impl UnicodeBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ConversionService for UnicodeBackend {
    fn open(
        &self,
        from: &str,
        to: &str,
        accept_invalid: bool,
    ) -> Result<Box<dyn ConversionHandle>, EncodingError> {
        if from.eq_ignore_ascii_case(RAW_NAME) || to.eq_ignore_ascii_case(RAW_NAME) {
            debug!(from, to, "opened pass-through conversion");
            return Ok(Box::new(PassThrough));
        }

        match (Source::lookup(from), Target::lookup(to)) {
            (Some(source), Some(target)) => {
                debug!(from, to, accept_invalid, "opened conversion");
                Ok(Box::new(Pipeline {
                    source,
                    target,
                    accept_invalid,
                    pivot: String::new(),
                }))
            }
            _ => {
                debug!(from, to, "backend refused encoding pair");
                Err(EncodingError::backend(from, to))
            }
        }
    }
}

/// Copies bytes unchanged; used whenever either side is "none".
#[derive(Debug)]
struct PassThrough;

impl ConversionHandle for PassThrough {
    fn convert(
        &mut self,
        _flush: bool,
        input: &[u8],
        output: &mut Vec<u8>,
    ) -> Result<(), EncodingError> {
        output.extend_from_slice(input);
        Ok(())
    }
}

enum Source {
    Ascii,
    Utf32 {
        order: Endianness,
        pending: [u8; 4],
        fill: usize,
    },
    Whatwg(Decoder),
}

impl Source {
    fn lookup(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "us-ascii" | "ascii" => Some(Source::Ascii),
            "utf-32le" => Some(Source::utf32(Endianness::Little)),
            "utf-32be" => Some(Source::utf32(Endianness::Big)),
            label => WhatwgEncoding::for_label(label.as_bytes())
                .filter(|encoding| *encoding != REPLACEMENT)
                .map(|encoding| Source::Whatwg(encoding.new_decoder_without_bom_handling())),
        }
    }

    fn utf32(order: Endianness) -> Self {
        Source::Utf32 {
            order,
            pending: [0; 4],
            fill: 0,
        }
    }
}

enum Target {
    Ascii,
    Utf8,
    Utf16(Endianness),
    Utf32(Endianness),
    Whatwg(Encoder),
}

impl Target {
    fn lookup(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "us-ascii" | "ascii" => Some(Target::Ascii),
            "utf-32le" => Some(Target::Utf32(Endianness::Little)),
            "utf-32be" => Some(Target::Utf32(Endianness::Big)),
            label => {
                let encoding = WhatwgEncoding::for_label(label.as_bytes())?;
                if encoding == UTF_8 {
                    Some(Target::Utf8)
                } else if encoding == UTF_16LE {
                    Some(Target::Utf16(Endianness::Little))
                } else if encoding == UTF_16BE {
                    Some(Target::Utf16(Endianness::Big))
                } else if encoding == REPLACEMENT || encoding.output_encoding() != encoding {
                    // Decode-only encodings cannot be produced.
                    None
                } else {
                    Some(Target::Whatwg(encoding.new_encoder()))
                }
            }
        }
    }
}

struct Pipeline {
    source: Source,
    target: Target,
    accept_invalid: bool,
    pivot: String,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("accept_invalid", &self.accept_invalid)
            .field("pivot_len", &self.pivot.len())
            .finish()
    }
}

impl ConversionHandle for Pipeline {
    fn convert(
        &mut self,
        flush: bool,
        input: &[u8],
        output: &mut Vec<u8>,
    ) -> Result<(), EncodingError> {
        let before = output.len();
        self.decode(input, flush)?;
        self.encode(flush, output)?;
        trace!(
            input = input.len(),
            output = output.len() - before,
            flush,
            "backend round-trip"
        );
        Ok(())
    }
}

impl Pipeline {
    /// Decode `input` into the pivot, keeping any incomplete tail buffered.
    fn decode(&mut self, input: &[u8], last: bool) -> Result<(), EncodingError> {
        let accept_invalid = self.accept_invalid;
        let pivot = &mut self.pivot;

        match &mut self.source {
            Source::Ascii => {
                for &byte in input {
                    if byte.is_ascii() {
                        pivot.push(char::from(byte));
                    } else if accept_invalid {
                        pivot.push(char::REPLACEMENT_CHARACTER);
                    } else {
                        return Err(EncodingError::InvalidEncoding);
                    }
                }
                Ok(())
            }
            Source::Utf32 { order, pending, fill } => {
                for &byte in input {
                    pending[*fill] = byte;
                    *fill += 1;
                    if *fill == pending.len() {
                        *fill = 0;
                        match char::from_u32(u32::from_bytes(&pending[..], *order)) {
                            Some(c) => pivot.push(c),
                            None if accept_invalid => pivot.push(char::REPLACEMENT_CHARACTER),
                            None => return Err(EncodingError::InvalidEncoding),
                        }
                    }
                }
                if last && *fill != 0 {
                    *fill = 0;
                    if !accept_invalid {
                        return Err(EncodingError::InvalidEncoding);
                    }
                    pivot.push(char::REPLACEMENT_CHARACTER);
                }
                Ok(())
            }
            Source::Whatwg(decoder) => decode_whatwg(decoder, input, last, accept_invalid, pivot),
        }
    }

    /// Encode the whole pivot into `output` and clear it.
    fn encode(&mut self, last: bool, output: &mut Vec<u8>) -> Result<(), EncodingError> {
        let text = self.pivot.as_str();
        match &mut self.target {
            Target::Ascii => {
                if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
                    trace!(codepoint = u32::from(c), "no ASCII image");
                    return Err(EncodingError::UnrepresentableCharacter);
                }
                output.extend_from_slice(text.as_bytes());
            }
            Target::Utf8 => output.extend_from_slice(text.as_bytes()),
            Target::Utf16(order) => {
                output.reserve(text.len() * 2);
                for unit in text.encode_utf16() {
                    unit.write_bytes(*order, output);
                }
            }
            Target::Utf32(order) => {
                output.reserve(text.len() * 4);
                for c in text.chars() {
                    u32::from(c).write_bytes(*order, output);
                }
            }
            Target::Whatwg(encoder) => encode_whatwg(encoder, text, last, output)?,
        }
        self.pivot.clear();
        Ok(())
    }
}

fn decode_whatwg(
    decoder: &mut Decoder,
    input: &[u8],
    last: bool,
    accept_invalid: bool,
    pivot: &mut String,
) -> Result<(), EncodingError> {
    let mut src = input;
    loop {
        if accept_invalid {
            let needed = decoder.max_utf8_buffer_length(src.len());
            pivot.reserve(needed.unwrap_or(src.len()));
            let (result, read, _replaced) = decoder.decode_to_string(src, pivot, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => return Ok(()),
                CoderResult::OutputFull => pivot.reserve(pivot.capacity().max(16)),
            }
        } else {
            let needed = decoder.max_utf8_buffer_length_without_replacement(src.len());
            pivot.reserve(needed.unwrap_or(src.len()));
            let (result, read) = decoder.decode_to_string_without_replacement(src, pivot, last);
            src = &src[read..];
            match result {
                DecoderResult::InputEmpty => return Ok(()),
                DecoderResult::OutputFull => pivot.reserve(pivot.capacity().max(16)),
                DecoderResult::Malformed(_, _) => return Err(EncodingError::InvalidEncoding),
            }
        }
    }
}

fn encode_whatwg(
    encoder: &mut Encoder,
    text: &str,
    last: bool,
    output: &mut Vec<u8>,
) -> Result<(), EncodingError> {
    let mut src = text;
    loop {
        let needed = encoder.max_buffer_length_from_utf8_without_replacement(src.len());
        output.reserve(needed.unwrap_or(src.len()));
        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(src, output, last);
        src = &src[read..];
        match result {
            EncoderResult::InputEmpty => return Ok(()),
            EncoderResult::OutputFull => output.reserve(output.capacity().max(16)),
            EncoderResult::Unmappable(c) => {
                trace!(codepoint = u32::from(c), "unmappable character");
                return Err(EncodingError::UnrepresentableCharacter);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
