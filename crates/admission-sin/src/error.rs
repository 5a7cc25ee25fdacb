//! Error types for SIN allocation and registration storage.
//!
//! ## Error Cases
//! - `Exhausted`: every discriminator for a tag pair is already taken.
//! - `NotFound`: the registration an operation requires does not exist.
//! - `SinConflict`: a write tried to replace an already assigned SIN.
//! - `InvalidSin`: a string could not be parsed as a SIN code.
//! - `InvalidRegistration`: the caller supplied a malformed registration.
//! - `Storage`: the backing store failed (I/O, serialization).
//!
//! A registration that disappears between listing and write-back is *not* an
//! error: [`RegistrationStore::apply_sin`] reports it as `Ok(false)` so batch
//! callers can record it and move on.
//!
//! [`RegistrationStore::apply_sin`]: crate::RegistrationStore::apply_sin

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors `admission-sin` can produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No free discriminator remains for the `PROGRAM-COURSE` prefix.
    #[error("SIN space exhausted for prefix {prefix}")]
    Exhausted { prefix: String },

    /// The registration does not exist.
    #[error("Registration not found: {id}")]
    NotFound { id: String },

    /// The registration already carries a different SIN.
    #[error("Registration {id} already has SIN {existing}")]
    SinConflict { id: String, existing: String },

    /// The input is not a well-formed SIN code.
    #[error("Invalid SIN: {input}")]
    InvalidSin { input: String },

    /// The registration payload was rejected.
    #[error("Invalid registration: {reason}")]
    InvalidRegistration { reason: String },

    /// The store failed to read or write.
    #[error("Storage error: {context}")]
    Storage { context: String },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage {
            context: format!("json: {err}"),
        }
    }
}
