//! Library error types.

use std::fmt;

/// A keywise Result, normally returning a keywise [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A keywise error. Encoding and decoding are all-or-nothing: when one of
/// these is returned, no partial buffer or value was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The input value is permanently outside the encodable universe: a NaN
    /// number, an invalid timestamp, or a `High` sentinel nested inside a
    /// composite.
    BadValue(String),
    /// A runtime value the codec has no variant for. Nothing in the closed
    /// [`Value`][crate::Value] universe produces this; it exists for callers
    /// converting foreign values into keys.
    Unsupported(String),
    /// Decode input that no encoder could have produced: an unknown tag
    /// byte, a bad escape sequence, a missing terminator, a non-canonical
    /// payload, or trailing bytes after a completed value.
    Malformed(String),
    /// Decode input ended before the value was complete.
    LengthTooShort {
        /// What step of decoding was underway when the input ran out.
        step: &'static str,
        /// How many bytes were left.
        actual: usize,
        /// How many bytes the step needed.
        expected: usize,
    },
    /// Composite nesting exceeded the configured depth limit.
    TooDeep {
        /// The limit that was in force.
        max: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::BadValue(ref err) => write!(f, "Value cannot be encoded: {}", err),
            Error::Unsupported(ref err) => write!(f, "No variant for value: {}", err),
            Error::Malformed(ref err) => write!(f, "Malformed encoding: {}", err),
            Error::LengthTooShort {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected {} more bytes, but got {} on step [{}]",
                expected, actual, step
            ),
            Error::TooDeep { max } => write!(f, "Nesting depth limit of {} exceeded", max),
        }
    }
}

impl std::error::Error for Error {}
