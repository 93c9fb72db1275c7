//! Named choices backed by integer codes.

use super::{ConfigType, Value, bad_initial, mismatch};
use crate::def::{Initial, Mapping, VariableDef};
use crate::error::{Error, Result};

pub(crate) fn mapping_of(def: &VariableDef) -> Result<Mapping> {
    def.mapping
        .ok_or_else(|| Error::code(format!("Option {} has no name table", def.name)))
}

pub(crate) fn code_for(mapping: Mapping, name: &str) -> Option<i32> {
    mapping
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, code)| code)
}

pub(crate) fn name_for(mapping: Mapping, code: i32) -> Option<&'static str> {
    mapping.iter().find(|&&(_, c)| c == code).map(|&(n, _)| n)
}

/// Enum type; the variable's mapping lists the valid names.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumType;

impl ConfigType for EnumType {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        let mapping = mapping_of(def)?;
        code_for(mapping, text.trim())
            .map(Value::Enum)
            .ok_or_else(|| Error::bad_type(format!("Invalid enum value: {text}")))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        let Value::Enum(code) = value else {
            return Err(mismatch(def, self.name(), value));
        };
        let mapping = mapping_of(def)?;
        name_for(mapping, *code)
            .map(|n| Some(n.to_string()))
            .ok_or_else(|| Error::code(format!("Option {} holds unknown code {code}", def.name)))
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        let Value::Enum(code) = value else {
            return Err(mismatch(def, self.name(), value));
        };
        let mapping = mapping_of(def)?;
        if name_for(mapping, *code).is_none() {
            return Err(Error::bad_type(format!("Invalid enum value: {code}")));
        }
        Ok(())
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        let mapping = mapping_of(def)?;
        match &def.initial {
            Initial::None => mapping
                .first()
                .map(|&(_, code)| Value::Enum(code))
                .ok_or_else(|| bad_initial(def, self.name())),
            Initial::Number(n) => {
                let code = i32::try_from(*n).map_err(|_| bad_initial(def, self.name()))?;
                let value = Value::Enum(code);
                self.check_native(def, &value)
                    .map_err(|_| bad_initial(def, self.name()))?;
                Ok(value)
            }
            Initial::Text(text) => self.parse(def, text),
            Initial::Bool(_) => Err(bad_initial(def, self.name())),
        }
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
    use crate::error::{ErrorKind, Rejection};

    const COLOURS: Mapping = &[("red", 1), ("green", 2), ("blue", 3), ("crimson", 1)];

    #[test]
    fn test_parse_case_insensitive() {
        let def = VariableDef::enumeration("Lemon", COLOURS, "red");
        assert_eq!(EnumType.parse(&def, "GREEN").unwrap(), Value::Enum(2));
        let err = EnumType.parse(&def, "purple").unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::BadType));
    }

    #[test]
    fn test_render_uses_first_name() {
        let def = VariableDef::enumeration("Lemon", COLOURS, "crimson");
        let storage = EnumType.initial_value(&def).unwrap();
        assert_eq!(
            EnumType.string_get(&storage, &def).unwrap().as_deref(),
            Some("red")
        );
    }

    #[test]
    fn test_native_checks_code() {
        let def = VariableDef::enumeration("Lemon", COLOURS, "red");
        let mut storage = Value::Enum(1);
        EnumType.native_set(&mut storage, &def, Value::Enum(3)).unwrap();
        assert!(EnumType.native_set(&mut storage, &def, Value::Enum(9)).is_err());
        assert_eq!(storage, Value::Enum(3));
    }

    #[test]
    fn test_missing_mapping_is_code_error() {
        let def = VariableDef::new("Lemon", crate::types::TypeTag::ENUM, Initial::None);
        assert_eq!(EnumType.parse(&def, "red").unwrap_err().kind(), ErrorKind::Code);
    }
}
