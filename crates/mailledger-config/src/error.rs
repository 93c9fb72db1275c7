//! Error and status types for configuration operations.

use bitflags::bitflags;

/// Why a candidate value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The text or native value is not valid for the variable's type.
    BadType,
    /// The type accepted the value but the variable's validator vetoed it.
    Validator,
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Contract violation by the caller (stale handle, unregistered type, ...).
    Code,
    /// The variable name is not registered.
    UnknownVariable,
    /// The value was rejected by the type or the validator.
    InvalidValue,
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Programmer error; should not happen in correct code.
    #[error("Code error: {0}")]
    Code(String),

    /// No variable with this name exists.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// The value was rejected and the stored value is unchanged.
    #[error("{message}")]
    InvalidValue {
        /// Which layer rejected the value.
        rejection: Rejection,
        /// Human-readable explanation, suitable for showing to the user.
        message: String,
    },
}

impl Error {
    pub(crate) fn code(message: impl Into<String>) -> Self {
        Self::Code(message.into())
    }

    pub(crate) fn bad_type(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            rejection: Rejection::BadType,
            message: message.into(),
        }
    }

    pub(crate) fn validator(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            rejection: Rejection::Validator,
            message: message.into(),
        }
    }

    /// Returns the broad kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Code(_) => ErrorKind::Code,
            Self::UnknownVariable(_) => ErrorKind::UnknownVariable,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
        }
    }

    /// Returns which layer rejected the value, for `InvalidValue` errors.
    #[must_use]
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::InvalidValue { rejection, .. } => Some(*rejection),
            _ => None,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

bitflags! {
    /// Informational modifiers attached to a successful operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// The resulting value is unset or blank.
        const EMPTY = 1 << 0;
        /// The variable is (again) inheriting its value from a parent scope.
        const INHERITED = 1 << 1;
        /// The validator accepted the value but wants the user warned.
        const WARNING = 1 << 2;
        /// The new value equals the old one; nothing was stored or announced.
        const NO_CHANGE = 1 << 3;
    }
}

/// Successful result of a mutating operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Modifier flags.
    pub status: Status,
    /// Warning text from a validator, if any.
    pub message: Option<String>,
}

impl Outcome {
    /// Plain success with no modifiers.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            status: Status::empty(),
            message: None,
        }
    }

    /// Success carrying the given modifiers.
    #[must_use]
    pub const fn with(status: Status) -> Self {
        Self {
            status,
            message: None,
        }
    }

    /// Success with a validator warning.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: Status::WARNING,
            message: Some(message.into()),
        }
    }

    /// Returns true if nothing was changed.
    #[must_use]
    pub const fn is_no_change(&self) -> bool {
        self.status.contains(Status::NO_CHANGE)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::code("x").kind(), ErrorKind::Code);
        assert_eq!(
            Error::UnknownVariable("Apple".into()).kind(),
            ErrorKind::UnknownVariable
        );
        assert_eq!(Error::bad_type("x").kind(), ErrorKind::InvalidValue);
        assert_eq!(Error::validator("x").kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_rejection_distinguishes_source() {
        assert_eq!(Error::bad_type("x").rejection(), Some(Rejection::BadType));
        assert_eq!(
            Error::validator("x").rejection(),
            Some(Rejection::Validator)
        );
        assert_eq!(Error::code("x").rejection(), None);
    }

    #[test]
    fn test_invalid_value_displays_message_verbatim() {
        let err = Error::bad_type("Invalid number: abc");
        assert_eq!(err.to_string(), "Invalid number: abc");
    }

    #[test]
    fn test_outcome_flags() {
        assert!(!Outcome::success().is_no_change());
        assert!(Outcome::with(Status::NO_CHANGE).is_no_change());

        let warn = Outcome::warning("careful");
        assert!(warn.status.contains(Status::WARNING));
        assert_eq!(warn.message.as_deref(), Some("careful"));
    }
}
