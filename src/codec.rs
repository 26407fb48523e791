//! Byte/scalar codec.
//!
//! Packs raw bytes into fixed-width code units and back for a given byte
//! order. Decoding is stateful: a partial unit is held in the accumulator
//! until the next chunk completes it, so input may be split anywhere.

use tracing::trace;

use crate::encoding::{CodeUnit, Encoding, Endianness};
use crate::error::EncodingError;
use crate::verifier::Verifier;

/// Widest code unit any descriptor uses.
const MAX_WIDTH: usize = 4;

/// Decoder from a byte stream into verified `E` code units.
#[derive(Debug)]
pub struct ByteCodec<E: Encoding> {
    order: Endianness,
    /// Bytes of the unit currently being assembled.
    accumulator: [u8; MAX_WIDTH],
    /// Always `< E::WIDTH` between calls.
    fill: usize,
    verifier: Verifier<E>,
    staged: Vec<E::Unit>,
}

impl<E: Encoding> ByteCodec<E> {
    pub fn new(order: Endianness, verifier: Verifier<E>) -> Self {
        debug_assert!(E::WIDTH <= MAX_WIDTH);
        Self {
            order,
            accumulator: [0; MAX_WIDTH],
            fill: 0,
            verifier,
            staged: Vec::new(),
        }
    }

    /// Bytes of an incomplete unit carried over from previous calls.
    pub fn pending(&self) -> usize {
        self.fill
    }

    /// Consume a chunk of bytes, appending every completed and verified unit
    /// to `sink`. Nothing from this chunk reaches `sink` unless the whole
    /// chunk verifies.
    pub fn decode(&mut self, bytes: &[u8], sink: &mut Vec<E::Unit>) -> Result<(), EncodingError> {
        if bytes.is_empty() {
            return Ok(());
        }

        self.staged.clear();
        for &byte in bytes {
            self.accumulator[self.fill] = byte;
            self.fill += 1;
            if self.fill == E::WIDTH {
                self.staged
                    .push(E::Unit::from_bytes(&self.accumulator[..E::WIDTH], self.order));
                self.fill = 0;
            }
        }

        trace!(
            bytes = bytes.len(),
            units = self.staged.len(),
            pending = self.fill,
            "decoded chunk"
        );

        self.verifier.verify(&self.staged)?;
        sink.extend_from_slice(&self.staged);
        Ok(())
    }

    /// End of input. Fails on a truncated final unit, then lets the
    /// verifier judge any unterminated multi-unit sequence.
    pub fn finish(mut self) -> Result<(), EncodingError> {
        if self.fill != 0 {
            trace!(leftover = self.fill, width = E::WIDTH, "truncated code unit");
            self.fill = 0;
            return Err(EncodingError::InvalidEncoding);
        }
        self.verifier.finish()
    }

    /// Write exactly `WIDTH` bytes per unit in `order`.
    pub fn encode(units: &[E::Unit], order: Endianness, out: &mut Vec<u8>) {
        out.reserve(units.len() * E::WIDTH);
        for &unit in units {
            unit.write_bytes(order, out);
        }
    }
}
