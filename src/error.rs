//! The crate-wide error alias and the few domain errors that callers branch on.

use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The ways turning a transcript into a transaction can fail.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ParseError {
    /// No usable number was found in the transcript.
    AmountMissing,
    /// The number found is larger than a single transaction may be.
    AmountTooLarge,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::AmountMissing => write!(f, "Couldn't detect amount"),
            ParseError::AmountTooLarge => write!(f, "Amount too large"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Returned when a listening session is requested from an engine the host does not support.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MicUnavailable;

impl Display for MicUnavailable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mic not supported")
    }
}

impl std::error::Error for MicUnavailable {}
