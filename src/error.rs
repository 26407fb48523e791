//! Error taxonomy shared by every conversion path.

use thiserror::Error;

/// Outcome of a failed conversion.
///
/// Every engine-level operation reports failure through this type; nothing
/// on the conversion path substitutes or drops data silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The source character has no image in the target encoding.
    #[error("character is not representable in the target encoding")]
    UnrepresentableCharacter,

    /// The source code point cannot be expressed in the target's code-unit scheme.
    #[error("code point is not expressible in the target code-unit scheme")]
    UnrepresentableCodepoint,

    /// The input is not a legal sequence in its declared encoding.
    /// Also raised at flush time for a truncated trailing sequence.
    #[error("input is not a valid sequence in the source encoding")]
    InvalidEncoding,

    /// The conversion service could not open the requested encoding pair.
    #[error("conversion backend cannot convert from `{from}` to `{to}`")]
    BackendFailure { from: String, to: String },
}

impl EncodingError {
    pub(crate) fn backend(from: &str, to: &str) -> Self {
        EncodingError::BackendFailure {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
