//! Character tables: each user-visible character selects a flag symbol.

use super::{ConfigType, Value, bad_initial, mismatch};
use crate::def::{Initial, VarFlags, VariableDef};
use crate::error::{Error, Result};

/// A string split into characters for indexed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MbTable {
    orig: String,
    chars: Vec<String>,
}

impl MbTable {
    /// Splits `text` into single-character entries.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            orig: text.to_string(),
            chars: text.chars().map(String::from).collect(),
        }
    }

    /// The text the table was built from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.orig
    }

    /// Entry `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.chars.get(index).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Character table type.
#[derive(Debug, Clone, Copy, Default)]
pub struct MbTableType;

impl ConfigType for MbTableType {
    fn name(&self) -> &'static str {
        "mbtable"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        if text.is_empty() {
            if def.flags.contains(VarFlags::NOT_EMPTY) {
                return Err(Error::bad_type(format!("Option {} may not be empty", def.name)));
            }
            return Ok(Value::MbTable(None));
        }
        Ok(Value::MbTable(Some(MbTable::new(text))))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        match value {
            Value::MbTable(t) => Ok(t.as_ref().map(|t| t.orig.clone())),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::MbTable(None) if def.flags.contains(VarFlags::NOT_EMPTY) => Err(
                Error::bad_type(format!("Option {} may not be empty", def.name)),
            ),
            Value::MbTable(_) => Ok(()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        match &def.initial {
            Initial::None => Ok(Value::MbTable(None)),
            Initial::Text(text) if text.is_empty() => Ok(Value::MbTable(None)),
            Initial::Text(text) => Ok(Value::MbTable(Some(MbTable::new(text)))),
            Initial::Bool(_) | Initial::Number(_) => Err(bad_initial(def, self.name())),
        }
    }

    fn destroy(&self, storage: &mut Value, _def: &VariableDef) {
        *storage = Value::MbTable(None);
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
    fn test_multibyte_entries() {
        let table = MbTable::new(" +T→F");
        assert_eq!(table.len(), 5);
        assert_eq!(table.get(3), Some("→"));
        assert_eq!(table.get(9), None);
        assert_eq!(table.as_str(), " +T→F");
    }

    #[test]
    fn test_type_round_trip() {
        let def = VariableDef::mbtable("Quince", Some(" +TCFL"));
        let mut storage = MbTableType.initial_value(&def).unwrap();
        MbTableType.string_set(&mut storage, &def, "ab✓").unwrap();
        assert_eq!(
            MbTableType.string_get(&storage, &def).unwrap().as_deref(),
            Some("ab✓")
        );
        MbTableType.string_set(&mut storage, &def, "").unwrap();
        assert_eq!(MbTableType.string_get(&storage, &def).unwrap(), None);
    }
}
