//! Lists of strings, separated by a character chosen per variable.

use super::{ConfigType, Value, bad_initial, commit, mismatch};
use crate::def::{Initial, VarFlags, VariableDef};
use crate::error::{Error, Outcome, Result};

/// Ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Slist {
    items: Vec<String>,
}

impl Slist {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns the items in order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if `item` is present, using the variable's comparison.
    #[must_use]
    pub fn contains(&self, item: &str, flags: VarFlags) -> bool {
        self.items.iter().any(|i| same(i, item, flags))
    }

    fn push(&mut self, item: &str, flags: VarFlags) {
        if item.is_empty() && !flags.contains(VarFlags::SLIST_ALLOW_EMPTY) {
            return;
        }
        if !flags.contains(VarFlags::SLIST_ALLOW_DUPES) && self.contains(item, flags) {
            return;
        }
        self.items.push(item.to_string());
    }

    fn remove(&mut self, item: &str, flags: VarFlags) {
        self.items.retain(|i| !same(i, item, flags));
    }
}

impl<S: Into<String>> FromIterator<S> for Slist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn same(a: &str, b: &str, flags: VarFlags) -> bool {
    if flags.contains(VarFlags::SLIST_CASE_SENSITIVE) {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

const fn separator(flags: VarFlags) -> char {
    if flags.contains(VarFlags::SLIST_SEP_COMMA) {
        ','
    } else if flags.contains(VarFlags::SLIST_SEP_COLON) {
        ':'
    } else {
        ' '
    }
}

fn split(def: &VariableDef, text: &str) -> Slist {
    let mut list = Slist::new();
    if text.is_empty() {
        return list;
    }
    for item in text.split(separator(def.flags)) {
        list.push(item, def.flags);
    }
    list
}

/// String list type.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlistType;

impl ConfigType for SlistType {
    fn name(&self) -> &'static str {
        "slist"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        let list = split(def, text);
        if list.is_empty() && def.flags.contains(VarFlags::NOT_EMPTY) {
            return Err(Error::bad_type(format!("Option {} may not be empty", def.name)));
        }
        Ok(Value::Slist(list))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        let Value::Slist(list) = value else {
            return Err(mismatch(def, self.name(), value));
        };
        if list.is_empty() {
            return Ok(None);
        }
        let sep = separator(def.flags).to_string();
        Ok(Some(list.items.join(&sep)))
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::Slist(list) if list.is_empty() && def.flags.contains(VarFlags::NOT_EMPTY) => Err(
                Error::bad_type(format!("Option {} may not be empty", def.name)),
            ),
            Value::Slist(_) => Ok(()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        match &def.initial {
            Initial::None => Ok(Value::Slist(Slist::new())),
            Initial::Text(text) => Ok(Value::Slist(split(def, text))),
            Initial::Bool(_) | Initial::Number(_) => Err(bad_initial(def, self.name())),
        }
    }

    fn destroy(&self, storage: &mut Value, _def: &VariableDef) {
        *storage = Value::Slist(Slist::new());
    }

    fn plus_equals(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        let Value::Slist(current) = storage else {
            return Err(mismatch(def, self.name(), storage));
        };
        let mut list = current.clone();
        for item in split(def, text).items {
            list.push(&item, def.flags);
        }
        commit(self, storage, def, Value::Slist(list))
    }

    fn minus_equals(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        let Value::Slist(current) = storage else {
            return Err(mismatch(def, self.name(), storage));
        };
        let mut list = current.clone();
        for item in split(def, text).items {
            list.remove(&item, def.flags);
        }
        let candidate = Value::Slist(list);
        self.check_native(def, &candidate)?;
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

    fn comma(initial: Option<&'static str>) -> VariableDef {
        VariableDef::slist("Papaya", initial).with_flags(VarFlags::SLIST_SEP_COMMA)
    }

    #[test]
    fn test_separators() {
        let def = comma(None);
        let Value::Slist(list) = SlistType.parse(&def, "a,b,c").unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(list.items(), ["a", "b", "c"]);

        let def = VariableDef::slist("Papaya", None).with_flags(VarFlags::SLIST_SEP_COLON);
        let Value::Slist(list) = SlistType.parse(&def, "x:y").unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(list.len(), 2);

        let def = VariableDef::slist("Papaya", None);
        let Value::Slist(list) = SlistType.parse(&def, "one two").unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(list.items(), ["one", "two"]);
    }

    #[test]
    fn test_dupes_and_empties_dropped() {
        let def = comma(None);
        let Value::Slist(list) = SlistType.parse(&def, "a,,A,b,a").unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(list.items(), ["a", "b"]);

        let def = comma(None).with_flags(
            VarFlags::SLIST_ALLOW_DUPES | VarFlags::SLIST_ALLOW_EMPTY | VarFlags::SLIST_CASE_SENSITIVE,
        );
        let Value::Slist(list) = SlistType.parse(&def, "a,,A,a").unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(list.items(), ["a", "", "A", "a"]);
    }

    #[test]
    fn test_empty_renders_none() {
        let def = comma(None);
        let storage = SlistType.initial_value(&def).unwrap();
        assert_eq!(SlistType.string_get(&storage, &def).unwrap(), None);
    }

    #[test]
    fn test_plus_minus_equals() {
        let def = comma(Some("en,fr"));
        let mut storage = SlistType.initial_value(&def).unwrap();
        SlistType.plus_equals(&mut storage, &def, "de").unwrap();
        assert_eq!(
            SlistType.string_get(&storage, &def).unwrap().as_deref(),
            Some("en,fr,de")
        );
        let outcome = SlistType.plus_equals(&mut storage, &def, "EN").unwrap();
        assert!(outcome.is_no_change());

        SlistType.minus_equals(&mut storage, &def, "fr").unwrap();
        assert_eq!(
            SlistType.string_get(&storage, &def).unwrap().as_deref(),
            Some("en,de")
        );
    }

    #[test]
    fn test_not_empty() {
        let def = comma(Some("a")).with_flags(VarFlags::NOT_EMPTY);
        let mut storage = SlistType.initial_value(&def).unwrap();
        assert!(SlistType.string_set(&mut storage, &def, "").is_err());
        assert!(SlistType.minus_equals(&mut storage, &def, "a").is_err());
        assert_eq!(storage, Value::Slist(["a"].into_iter().collect()));
    }
}
