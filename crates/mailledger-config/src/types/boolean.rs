//! Boolean options.

use super::{ConfigType, Value, bad_initial, commit, mismatch};
use crate::def::{Initial, VariableDef};
use crate::error::{Error, Outcome, Result};

const TRUE_WORDS: &[&str] = &["yes", "y", "true", "on", "1"];
const FALSE_WORDS: &[&str] = &["no", "n", "false", "off", "0"];

/// Parses a boolean word, ignoring case.
#[must_use]
pub fn parse_bool(text: &str) -> Option<bool> {
    if TRUE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text)) {
        Some(true)
    } else if FALSE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text)) {
        Some(false)
    } else {
        None
    }
}

/// `yes`/`no` option.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl ConfigType for BoolType {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn parse(&self, _def: &VariableDef, text: &str) -> Result<Value> {
        parse_bool(text)
            .map(Value::Bool)
            .ok_or_else(|| Error::bad_type(format!("Invalid boolean value: {text}")))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        match value {
            Value::Bool(b) => Ok(Some(if *b { "yes" } else { "no" }.to_string())),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::Bool(_) => Ok(()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        match &def.initial {
            Initial::None => Ok(Value::Bool(false)),
            Initial::Bool(b) => Ok(Value::Bool(*b)),
            Initial::Number(n) => Ok(Value::Bool(*n != 0)),
            Initial::Text(text) => parse_bool(text)
                .map(Value::Bool)
                .ok_or_else(|| bad_initial(def, self.name())),
        }
    }

    fn toggle(&self, storage: &mut Value, def: &VariableDef) -> Result<Outcome> {
        let Value::Bool(b) = storage else {
            return Err(mismatch(def, self.name(), storage));
        };
        let flipped = Value::Bool(!*b);
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
    use proptest::prelude::*;

    use super::*;
    use crate::error::{ErrorKind, Rejection};

    #[test]
    fn test_parse_words() {
        for word in ["yes", "Y", "TRUE", "on", "1"] {
            assert_eq!(parse_bool(word), Some(true), "{word}");
        }
        for word in ["no", "N", "false", "OFF", "0"] {
            assert_eq!(parse_bool(word), Some(false), "{word}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_string_round_trip() {
        let def = VariableDef::boolean("Apple", false);
        let mut storage = BoolType.initial_value(&def).unwrap();
        BoolType.string_set(&mut storage, &def, "on").unwrap();
        assert_eq!(BoolType.string_get(&storage, &def).unwrap().as_deref(), Some("yes"));
    }

    #[test]
    fn test_invalid_text_is_bad_type() {
        let def = VariableDef::boolean("Apple", false);
        let mut storage = Value::Bool(false);
        let err = BoolType.string_set(&mut storage, &def, "perhaps").unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::BadType));
        assert_eq!(storage, Value::Bool(false));
    }

    #[test]
    fn test_wrong_native_kind_is_code_error() {
        let def = VariableDef::boolean("Apple", false);
        let mut storage = Value::Bool(false);
        let err = BoolType
            .native_set(&mut storage, &def, Value::Number(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Code);
    }

    #[test]
    fn test_toggle() {
        let def = VariableDef::boolean("Apple", false);
        let mut storage = Value::Bool(false);
        BoolType.toggle(&mut storage, &def).unwrap();
        assert_eq!(storage, Value::Bool(true));
        BoolType.toggle(&mut storage, &def).unwrap();
        assert_eq!(storage, Value::Bool(false));
    }

    proptest! {
        #[test]
        fn prop_native_survives_text(b in any::<bool>()) {
            let def = VariableDef::boolean("Apple", !b);
            let mut storage = Value::Bool(!b);
            BoolType.native_set(&mut storage, &def, Value::Bool(b)).unwrap();
            let text = BoolType.string_get(&storage, &def).unwrap().unwrap();
            prop_assert_eq!(parse_bool(&text), Some(b));
        }
    }
}
