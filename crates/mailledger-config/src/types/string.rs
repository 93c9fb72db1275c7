//! Free-form strings.

use super::{ConfigType, Value, bad_initial, commit, mismatch};
use crate::def::{Initial, VarFlags, VariableDef};
use crate::error::{Error, Outcome, Result};

/// String type. The empty string is stored as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl ConfigType for StringType {
    fn name(&self) -> &'static str {
        "string"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        if text.is_empty() {
            if def.flags.contains(VarFlags::NOT_EMPTY) {
                return Err(Error::bad_type(format!("Option {} may not be empty", def.name)));
            }
            return Ok(Value::String(None));
        }
        Ok(Value::String(Some(text.to_string())))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::String(None) if def.flags.contains(VarFlags::NOT_EMPTY) => Err(
                Error::bad_type(format!("Option {} may not be empty", def.name)),
            ),
            Value::String(_) => Ok(()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        match &def.initial {
            Initial::None => Ok(Value::String(None)),
            Initial::Text(text) if text.is_empty() => Ok(Value::String(None)),
            Initial::Text(text) => Ok(Value::String(Some(text.to_string()))),
            Initial::Bool(_) | Initial::Number(_) => Err(bad_initial(def, self.name())),
        }
    }

    fn destroy(&self, storage: &mut Value, _def: &VariableDef) {
        *storage = Value::String(None);
    }

    fn plus_equals(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        let Value::String(current) = storage else {
            return Err(mismatch(def, self.name(), storage));
        };
        let joined = format!("{}{text}", current.as_deref().unwrap_or_default());
        let candidate = self.parse(def, &joined)?;
        commit(self, storage, def, candidate)
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
    use crate::error::Status;

    #[test]
    fn test_round_trip() {
        let def = VariableDef::string("Mango", None);
        let mut storage = StringType.initial_value(&def).unwrap();
        assert_eq!(StringType.string_get(&storage, &def).unwrap(), None);

        StringType.string_set(&mut storage, &def, "hello world").unwrap();
        assert_eq!(
            StringType.string_get(&storage, &def).unwrap().as_deref(),
            Some("hello world")
        );
    }

    #[test]
    fn test_not_empty() {
        let def = VariableDef::string("Mango", Some("x")).with_flags(VarFlags::NOT_EMPTY);
        let mut storage = StringType.initial_value(&def).unwrap();
        assert!(StringType.string_set(&mut storage, &def, "").is_err());
        assert!(
            StringType
                .native_set(&mut storage, &def, Value::String(None))
                .is_err()
        );
        assert_eq!(storage, Value::String(Some("x".into())));
    }

    #[test]
    fn test_plus_equals_appends() {
        let def = VariableDef::string("Mango", None);
        let mut storage = Value::String(None);
        StringType.plus_equals(&mut storage, &def, "abc").unwrap();
        StringType.plus_equals(&mut storage, &def, "def").unwrap();
        assert_eq!(storage, Value::String(Some("abcdef".into())));
    }

    #[test]
    fn test_setting_empty_reports_empty() {
        let def = VariableDef::string("Mango", Some("x"));
        let mut storage = StringType.initial_value(&def).unwrap();
        let outcome = StringType.string_set(&mut storage, &def, "").unwrap();
        assert!(outcome.status.contains(Status::EMPTY));
    }
}
