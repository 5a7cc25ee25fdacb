use core::fmt;

/// Failures when decoding Crockford base32 text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Base32Error {
    DecodeInvalidLen { len: usize },
    DecodeInvalidAscii { byte: u8, index: usize },
}

impl fmt::Display for Base32Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeInvalidAscii { byte, index } => {
                write!(f, "invalid ascii byte {byte} at index {index}")
            }
            Self::DecodeInvalidLen { len } => write!(f, "invalid length: {len}"),
        }
    }
}

impl core::error::Error for Base32Error {}
