//! 16-bit signed numbers.

use super::{ConfigType, Value, bad_initial, commit, mismatch};
use crate::def::{Initial, VarFlags, VariableDef};
use crate::error::{Error, Outcome, Result};

/// Parses and range-checks a number for `def`.
fn to_number(def: &VariableDef, text: &str) -> Result<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::bad_type(format!("Option {} may not be empty", def.name)));
    }
    text.parse::<i64>()
        .map_err(|_| Error::bad_type(format!("Invalid number: {text}")))
}

/// Converts to the stored form, enforcing range and sign rules.
fn checked(def: &VariableDef, n: i64) -> Result<Value> {
    let n = i16::try_from(n).map_err(|_| Error::bad_type(format!("Number is too big: {n}")))?;
    if n < 0 && def.flags.contains(VarFlags::NOT_NEGATIVE) {
        return Err(Error::bad_type(format!(
            "Option {} may not be negative",
            def.name
        )));
    }
    Ok(Value::Number(n))
}

/// 16-bit number type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberType;

impl NumberType {
    fn adjust(
        self,
        storage: &mut Value,
        def: &VariableDef,
        text: &str,
        sign: i64,
    ) -> Result<Outcome> {
        let Value::Number(current) = storage else {
            return Err(mismatch(def, self.name(), storage));
        };
        let delta = to_number(def, text)?;
        let total = delta
            .checked_mul(sign)
            .and_then(|d| d.checked_add(i64::from(*current)))
            .ok_or_else(|| Error::bad_type(format!("Number is too big: {delta}")))?;
        let candidate = checked(def, total)?;
        commit(&self, storage, def, candidate)
    }
}

impl ConfigType for NumberType {
    fn name(&self) -> &'static str {
        "number"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        checked(def, to_number(def, text)?)
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        match value {
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::Number(n) => checked(def, i64::from(*n)).map(|_| ()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        match &def.initial {
            Initial::None => Ok(Value::Number(0)),
            Initial::Number(n) => checked(def, *n),
            Initial::Text(text) => self.parse(def, text),
            Initial::Bool(_) => Err(bad_initial(def, self.name())),
        }
    }

    fn plus_equals(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        self.adjust(storage, def, text, 1)
    }

    fn minus_equals(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        self.adjust(storage, def, text, -1)
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
    use crate::error::Rejection;

    #[test]
    fn test_parse() {
        let def = VariableDef::number("Kiwi", 0);
        assert_eq!(NumberType.parse(&def, " 42 ").unwrap(), Value::Number(42));
        assert_eq!(NumberType.parse(&def, "-7").unwrap(), Value::Number(-7));
    }

    #[test]
    fn test_rejects_garbage_and_range() {
        let def = VariableDef::number("Kiwi", 0);
        for text in ["", "abc", "1.5", "40000", "-40000"] {
            let err = NumberType.parse(&def, text).unwrap_err();
            assert_eq!(err.rejection(), Some(Rejection::BadType), "{text}");
        }
    }

    #[test]
    fn test_not_negative() {
        let def = VariableDef::number("Kiwi", 0).with_flags(VarFlags::NOT_NEGATIVE);
        assert!(NumberType.parse(&def, "-1").is_err());
        assert!(NumberType.parse(&def, "0").is_ok());
        assert!(NumberType.check_native(&def, &Value::Number(-3)).is_err());
    }

    #[test]
    fn test_plus_minus_equals() {
        let def = VariableDef::number("Kiwi", 10);
        let mut storage = Value::Number(10);
        NumberType.plus_equals(&mut storage, &def, "5").unwrap();
        assert_eq!(storage, Value::Number(15));
        NumberType.minus_equals(&mut storage, &def, "20").unwrap();
        assert_eq!(storage, Value::Number(-5));
        assert!(NumberType.plus_equals(&mut storage, &def, "40000").is_err());
        assert_eq!(storage, Value::Number(-5));
    }

    proptest! {
        #[test]
        fn prop_round_trip(n in any::<i16>()) {
            let def = VariableDef::number("Kiwi", 0);
            let mut storage = Value::Number(0);
            NumberType.string_set(&mut storage, &def, &n.to_string()).unwrap();
            prop_assert_eq!(NumberType.string_get(&storage, &def).unwrap(), Some(n.to_string()));
        }
    }
}
