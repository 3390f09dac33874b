use thiserror::Error;

/// Operation not permitted in the buffer's current fill state.
///
/// The buffer is left untouched whenever one of these is returned, so the
/// caller can drain (or fill) and retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidOperation {
    #[error("Cannot read: buffer is empty")]
    Empty,

    #[error("Cannot write: buffer is full")]
    Full,
}
