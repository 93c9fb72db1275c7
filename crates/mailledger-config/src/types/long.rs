//! 64-bit signed numbers.

use super::{ConfigType, Value, bad_initial, commit, mismatch};
use crate::def::{Initial, VarFlags, VariableDef};
use crate::error::{Error, Outcome, Result};

fn to_long(def: &VariableDef, text: &str) -> Result<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::bad_type(format!("Option {} may not be empty", def.name)));
    }
    let n = text
        .parse::<i64>()
        .map_err(|_| Error::bad_type(format!("Invalid long: {text}")))?;
    check_sign(def, n)?;
    Ok(n)
}

fn check_sign(def: &VariableDef, n: i64) -> Result<()> {
    if n < 0 && def.flags.contains(VarFlags::NOT_NEGATIVE) {
        return Err(Error::bad_type(format!(
            "Option {} may not be negative",
            def.name
        )));
    }
    Ok(())
}

/// 64-bit number type.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongType;

impl LongType {
    fn adjust(
        self,
        storage: &mut Value,
        def: &VariableDef,
        text: &str,
        add: bool,
    ) -> Result<Outcome> {
        let Value::Long(current) = storage else {
            return Err(mismatch(def, self.name(), storage));
        };
        let text = text.trim();
        let delta = text
            .parse::<i64>()
            .map_err(|_| Error::bad_type(format!("Invalid long: {text}")))?;
        let result = if add {
            current.checked_add(delta)
        } else {
            current.checked_sub(delta)
        };
        let n = result.ok_or_else(|| Error::bad_type(format!("Option {} would overflow", def.name)))?;
        check_sign(def, n)?;
        commit(&self, storage, def, Value::Long(n))
    }
}

impl ConfigType for LongType {
    fn name(&self) -> &'static str {
        "long"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        to_long(def, text).map(Value::Long)
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        match value {
            Value::Long(n) => Ok(Some(n.to_string())),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::Long(n) => check_sign(def, *n),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        match &def.initial {
            Initial::None => Ok(Value::Long(0)),
            Initial::Number(n) => {
                check_sign(def, *n)?;
                Ok(Value::Long(*n))
            }
            Initial::Text(text) => self.parse(def, text),
            Initial::Bool(_) => Err(bad_initial(def, self.name())),
        }
    }

    fn plus_equals(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        self.adjust(storage, def, text, true)
    }

    fn minus_equals(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        self.adjust(storage, def, text, false)
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
    fn test_large_values() {
        let def = VariableDef::long("Lime", 0);
        let mut storage = Value::Long(0);
        LongType
            .string_set(&mut storage, &def, "9000000000")
            .unwrap();
        assert_eq!(
            LongType.string_get(&storage, &def).unwrap().as_deref(),
            Some("9000000000")
        );
    }

    #[test]
    fn test_overflow_rejected() {
        let def = VariableDef::long("Lime", i64::MAX);
        let mut storage = LongType.initial_value(&def).unwrap();
        assert!(LongType.plus_equals(&mut storage, &def, "1").is_err());
        assert_eq!(storage, Value::Long(i64::MAX));
    }

    #[test]
    fn test_not_negative() {
        let def = VariableDef::long("Lime", 5).with_flags(VarFlags::NOT_NEGATIVE);
        let mut storage = Value::Long(5);
        assert!(LongType.minus_equals(&mut storage, &def, "6").is_err());
        LongType.minus_equals(&mut storage, &def, "5").unwrap();
        assert_eq!(storage, Value::Long(0));
    }
}
