//! Quad-options: yes, no, or ask with a default answer.

use std::fmt;

use super::{ConfigType, Value, bad_initial, commit, mismatch};
use crate::def::{Initial, VariableDef};
use crate::error::{Error, Outcome, Result};

/// Four-state answer to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuadOption {
    /// Never.
    #[default]
    No,
    /// Always.
    Yes,
    /// Ask, defaulting to no.
    AskNo,
    /// Ask, defaulting to yes.
    AskYes,
}

impl QuadOption {
    /// Returns the option's config spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
            Self::AskNo => "ask-no",
            Self::AskYes => "ask-yes",
        }
    }

    /// Parses a config spelling, ignoring case.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        [Self::No, Self::Yes, Self::AskNo, Self::AskYes]
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(text))
    }

    /// Flips the answer, keeping whether to ask.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::No => Self::Yes,
            Self::Yes => Self::No,
            Self::AskNo => Self::AskYes,
            Self::AskYes => Self::AskNo,
        }
    }

    /// Returns true if the user should be prompted.
    #[must_use]
    pub const fn is_ask(self) -> bool {
        matches!(self, Self::AskNo | Self::AskYes)
    }
}

impl fmt::Display for QuadOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quad-option type.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadType;

impl ConfigType for QuadType {
    fn name(&self) -> &'static str {
        "quad"
    }

    fn parse(&self, _def: &VariableDef, text: &str) -> Result<Value> {
        QuadOption::parse(text)
            .map(Value::Quad)
            .ok_or_else(|| Error::bad_type(format!("Invalid quad value: {text}")))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        match value {
            Value::Quad(q) => Ok(Some(q.as_str().to_string())),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::Quad(_) => Ok(()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        let quad = match &def.initial {
            Initial::None => Some(QuadOption::No),
            Initial::Bool(b) => Some(if *b { QuadOption::Yes } else { QuadOption::No }),
            Initial::Number(n) => match n {
                0 => Some(QuadOption::No),
                1 => Some(QuadOption::Yes),
                2 => Some(QuadOption::AskNo),
                3 => Some(QuadOption::AskYes),
                _ => None,
            },
            Initial::Text(text) => QuadOption::parse(text),
        };
        quad.map(Value::Quad)
            .ok_or_else(|| bad_initial(def, self.name()))
    }

    fn toggle(&self, storage: &mut Value, def: &VariableDef) -> Result<Outcome> {
        let Value::Quad(q) = storage else {
            return Err(mismatch(def, self.name(), storage));
        };
        let flipped = Value::Quad(q.toggled());
        commit(self, storage, def, flipped)
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
    fn test_parse() {
        assert_eq!(QuadOption::parse("ASK-yes"), Some(QuadOption::AskYes));
        assert_eq!(QuadOption::parse("no"), Some(QuadOption::No));
        assert_eq!(QuadOption::parse("ask"), None);
    }

    #[test]
    fn test_toggle_keeps_ask() {
        assert_eq!(QuadOption::AskNo.toggled(), QuadOption::AskYes);
        assert_eq!(QuadOption::Yes.toggled(), QuadOption::No);
        assert!(QuadOption::AskYes.is_ask());
        assert!(!QuadOption::Yes.is_ask());
    }

    #[test]
    fn test_round_trip() {
        let def = VariableDef::quad("Jackfruit", QuadOption::AskYes);
        let mut storage = QuadType.initial_value(&def).unwrap();
        assert_eq!(storage, Value::Quad(QuadOption::AskYes));

        QuadType.string_set(&mut storage, &def, "Ask-No").unwrap();
        assert_eq!(
            QuadType.string_get(&storage, &def).unwrap().as_deref(),
            Some("ask-no")
        );
        QuadType.toggle(&mut storage, &def).unwrap();
        assert_eq!(storage, Value::Quad(QuadOption::AskYes));
    }

    #[test]
    fn test_invalid() {
        let def = VariableDef::quad("Jackfruit", QuadOption::No);
        let mut storage = Value::Quad(QuadOption::No);
        assert!(QuadType.string_set(&mut storage, &def, "sometimes").is_err());
    }
}
