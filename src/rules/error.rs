//! Error types for rule decoding.
//!
//! Every failure carries a discriminant (`ErrorKind`) and the structured
//! fields needed to render a human-readable reason: the offending token,
//! the bound that was violated, and the computed maximum.

use std::fmt;

use thiserror::Error;

/// Broad classification of a decode failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ErrorKind {
    /// Unexpected character, missing number or unknown letter.
    Lexical,
    /// A numeric value outside its permitted range.
    Range,
    /// Wrong token count, duplicate or conflicting items, malformed payloads.
    Structural,
    /// Well-formed input whose combination is not meaningful.
    Semantic,
}

/// Why two halves of an alternate rule can not be combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Incompatibility {
    Family,
    States,
    Neighborhood,
    Range,
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Incompatibility::Family => "different rule family",
            Incompatibility::States => "different number of states",
            Incompatibility::Neighborhood => "different neighborhood",
            Incompatibility::Range => "different range",
        };
        f.write_str(text)
    }
}

/// A rule string that could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule is empty")]
    Empty,

    #[error("unexpected '{found}' in {context}")]
    UnexpectedChar { found: char, context: &'static str },

    #[error("unexpected end of {context}")]
    UnexpectedEnd { context: &'static str },

    #[error("{context} needs a number")]
    MissingNumber { context: &'static str },

    #[error("unrecognized rule '{0}'")]
    UnknownFormat(String),

    #[error("'{token}' is not a valid letter for {count} neighbors")]
    InvalidLetter { token: String, count: u8 },

    #[error("letters are not supported for {0} rules")]
    LettersNotSupported(&'static str),

    #[error("{what} {value} is out of range, must be from {min} to {max}")]
    OutOfRange {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{what} minimum {min} is greater than maximum {max}")]
    InvertedBounds { what: &'static str, min: u32, max: u32 },

    #[error("duplicate letter '{letter}' for {count} neighbors")]
    DuplicateLetter { count: u8, letter: char },

    #[error("can not have minus and non-minus for {count} neighbors")]
    MixedNegation { count: u8 },

    #[error("'-' must be followed by letters for {count} neighbors")]
    DanglingMinus { count: u8 },

    #[error("{what} needs {expected} values but {found} were given")]
    TokenCount {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("MAP rule needs 6, 22 or 86 base64 digits but {found} were given")]
    MapLength { found: usize },

    #[error("MAP rule contains invalid base64 digit '{0}'")]
    MapAlphabet(char),

    #[error("only one alternate rule delimiter '|' is allowed")]
    TooManyAlternates,

    #[error("alternate rules have {0}")]
    Incompatible(Incompatibility),

    #[error("alternate rules are not supported for {0}")]
    AlternateUnsupported(&'static str),

    #[error("{0} is missing")]
    MissingField(&'static str),

    #[error("{0}")]
    Malformed(String),

    #[error("{0}")]
    Unsupported(String),
}

impl RuleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuleError::Empty
            | RuleError::UnexpectedChar { .. }
            | RuleError::UnexpectedEnd { .. }
            | RuleError::MissingNumber { .. }
            | RuleError::UnknownFormat(_)
            | RuleError::InvalidLetter { .. }
            | RuleError::LettersNotSupported(_) => ErrorKind::Lexical,
            RuleError::OutOfRange { .. } | RuleError::InvertedBounds { .. } => ErrorKind::Range,
            RuleError::DuplicateLetter { .. }
            | RuleError::MixedNegation { .. }
            | RuleError::DanglingMinus { .. }
            | RuleError::TokenCount { .. }
            | RuleError::MapLength { .. }
            | RuleError::MapAlphabet(_)
            | RuleError::TooManyAlternates
            | RuleError::Incompatible(_)
            | RuleError::MissingField(_)
            | RuleError::Malformed(_) => ErrorKind::Structural,
            RuleError::AlternateUnsupported(_) | RuleError::Unsupported(_) => ErrorKind::Semantic,
        }
    }

    pub(crate) fn out_of_range(what: &'static str, value: i64, min: i64, max: i64) -> Self {
        RuleError::OutOfRange {
            what,
            value,
            min,
            max,
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        RuleError::Unsupported(reason.into())
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        RuleError::Malformed(reason.into())
    }
}
