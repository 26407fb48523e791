//! Validity verification for assembled code-unit sequences.
//!
//! Byte packing alone cannot tell a lone surrogate or an out-of-range scalar
//! from a legal unit. The verifier streams units through a backend session
//! (encoding under test → UTF-16) and only observes accept/reject.

use std::marker::PhantomData;

use crate::backend::{ConversionHandle, ConversionService};
use crate::encoding::{CodeUnit, Encoding, Endianness, Utf16};
use crate::error::EncodingError;

/// Upper bound on the bytes sent to the backend in one round-trip.
pub const MAX_BATCH_BYTES: usize = 1024;

/// Number of whole `width`-byte units that fit in one batch of `batch_bytes`.
pub(crate) fn units_per_batch(batch_bytes: usize, width: usize) -> usize {
    batch_bytes.clamp(width, MAX_BATCH_BYTES.max(width)) / width
}

/// Streaming legality check for one sequence of `E` code units.
pub struct Verifier<E: Encoding> {
    handle: Box<dyn ConversionHandle>,
    units_per_batch: usize,
    scratch: Vec<u8>,
    discard: Vec<u8>,
    _encoding: PhantomData<E>,
}

impl<E: Encoding> std::fmt::Debug for Verifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("encoding", &E::backend_name())
            .field("units_per_batch", &self.units_per_batch)
            .finish()
    }
}

impl<E: Encoding> Verifier<E> {
    /// Open a verification session on `service`.
    pub fn open(
        service: &dyn ConversionService,
        accept_invalid: bool,
        batch_bytes: usize,
    ) -> Result<Self, EncodingError> {
        let handle = service.open(E::backend_name(), Utf16::backend_name(), accept_invalid)?;
        Ok(Self {
            handle,
            units_per_batch: units_per_batch(batch_bytes, E::WIDTH),
            scratch: Vec::new(),
            discard: Vec::new(),
            _encoding: PhantomData,
        })
    }

    /// Check the next stretch of the sequence.
    ///
    /// A multi-unit sequence may straddle calls; it is only judged
    /// incomplete by [`finish`](Self::finish).
    pub fn verify(&mut self, units: &[E::Unit]) -> Result<(), EncodingError> {
        for batch in units.chunks(self.units_per_batch) {
            self.scratch.clear();
            for &unit in batch {
                unit.write_bytes(Endianness::NATIVE, &mut self.scratch);
            }
            self.discard.clear();
            self.handle.convert(false, &self.scratch, &mut self.discard)?;
        }
        Ok(())
    }

    /// Signal end of stream; fails on an unterminated multi-unit sequence.
    pub fn finish(mut self) -> Result<(), EncodingError> {
        self.discard.clear();
        self.handle.convert(true, &[], &mut self.discard)
    }
}
