//! Sort orders: a method from the variable's mapping plus optional
//! `reverse-` and `last-` modifiers.

use super::enumeration::{code_for, mapping_of, name_for};
use super::{ConfigType, Value, bad_initial, mismatch};
use crate::def::{Initial, VarFlags, VariableDef};
use crate::error::{Error, Result};

const REVERSE: &str = "reverse-";
const LAST: &str = "last-";

/// A sort method with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortValue {
    /// Method code from the mapping.
    pub method: i32,
    /// Sort descending.
    pub reverse: bool,
    /// Apply the method last.
    pub last: bool,
}

impl SortValue {
    /// Plain ascending sort by `method`.
    #[must_use]
    pub const fn new(method: i32) -> Self {
        Self {
            method,
            reverse: false,
            last: false,
        }
    }
}

/// Sort type.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortType;

impl ConfigType for SortType {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        let mapping = mapping_of(def)?;
        let mut rest = text.trim();
        let mut value = SortValue::default();

        if let Some(stripped) = rest.strip_prefix(REVERSE) {
            if !def.flags.contains(VarFlags::SORT_REVERSE) {
                return Err(Error::bad_type(format!(
                    "Option {} does not accept the reverse- prefix",
                    def.name
                )));
            }
            value.reverse = true;
            rest = stripped;
        }
        if let Some(stripped) = rest.strip_prefix(LAST) {
            if !def.flags.contains(VarFlags::SORT_LAST) {
                return Err(Error::bad_type(format!(
                    "Option {} does not accept the last- prefix",
                    def.name
                )));
            }
            value.last = true;
            rest = stripped;
        }

        value.method = code_for(mapping, rest)
            .ok_or_else(|| Error::bad_type(format!("Invalid sort name: {rest}")))?;
        Ok(Value::Sort(value))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        let Value::Sort(sort) = value else {
            return Err(mismatch(def, self.name(), value));
        };
        let mapping = mapping_of(def)?;
        let name = name_for(mapping, sort.method).ok_or_else(|| {
            Error::code(format!("Option {} holds unknown method {}", def.name, sort.method))
        })?;
        let mut text = String::new();
        if sort.reverse {
            text.push_str(REVERSE);
        }
        if sort.last {
            text.push_str(LAST);
        }
        text.push_str(name);
        Ok(Some(text))
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        let Value::Sort(sort) = value else {
            return Err(mismatch(def, self.name(), value));
        };
        let mapping = mapping_of(def)?;
        if name_for(mapping, sort.method).is_none() {
            return Err(Error::bad_type(format!("Invalid sort type: {}", sort.method)));
        }
        if sort.reverse && !def.flags.contains(VarFlags::SORT_REVERSE) {
            return Err(Error::bad_type(format!("Option {} cannot be reversed", def.name)));
        }
        if sort.last && !def.flags.contains(VarFlags::SORT_LAST) {
            return Err(Error::bad_type(format!(
                "Option {} does not accept the last- prefix",
                def.name
            )));
        }
        Ok(())
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        let mapping = mapping_of(def)?;
        match &def.initial {
            Initial::None => mapping
                .first()
                .map(|&(_, code)| Value::Sort(SortValue::new(code)))
                .ok_or_else(|| bad_initial(def, self.name())),
            Initial::Number(n) => {
                let code = i32::try_from(*n).map_err(|_| bad_initial(def, self.name()))?;
                let value = Value::Sort(SortValue::new(code));
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
    use crate::def::Mapping;

    const METHODS: Mapping = &[("date", 1), ("from", 2), ("size", 3), ("subject", 4)];

    fn def() -> VariableDef {
        VariableDef::sort("Mandarin", METHODS, "date")
            .with_flags(VarFlags::SORT_REVERSE | VarFlags::SORT_LAST)
    }

    #[test]
    fn test_parse_with_prefixes() {
        let def = def();
        assert_eq!(
            SortType.parse(&def, "reverse-last-size").unwrap(),
            Value::Sort(SortValue {
                method: 3,
                reverse: true,
                last: true
            })
        );
        assert_eq!(
            SortType.parse(&def, "from").unwrap(),
            Value::Sort(SortValue::new(2))
        );
    }

    #[test]
    fn test_prefix_needs_flag() {
        let def = VariableDef::sort("Mandarin", METHODS, "date");
        assert!(SortType.parse(&def, "reverse-date").is_err());
        assert!(SortType.parse(&def, "last-date").is_err());
        assert!(
            SortType
                .check_native(
                    &def,
                    &Value::Sort(SortValue {
                        method: 1,
                        reverse: true,
                        last: false
                    })
                )
                .is_err()
        );
    }

    #[test]
    fn test_round_trip() {
        let def = def();
        let mut storage = SortType.initial_value(&def).unwrap();
        SortType
            .string_set(&mut storage, &def, "reverse-subject")
            .unwrap();
        assert_eq!(
            SortType.string_get(&storage, &def).unwrap().as_deref(),
            Some("reverse-subject")
        );
    }

    #[test]
    fn test_unknown_method() {
        assert!(SortType.parse(&def(), "colour").is_err());
    }
}
