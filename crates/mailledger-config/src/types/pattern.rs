//! Regular expressions, compiled when set.

use regex::{Regex, RegexBuilder};

use super::{ConfigType, Value, bad_initial, mismatch};
use crate::def::{Initial, VarFlags, VariableDef};
use crate::error::{Error, Result};

/// A compiled pattern together with the text it came from.
#[derive(Debug, Clone)]
pub struct RegexValue {
    pattern: String,
    not: bool,
    regex: Regex,
}

impl PartialEq for RegexValue {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.not == other.not
    }
}

impl RegexValue {
    /// Compiles `text` using the rules of `def`.
    ///
    /// A leading `!` negates the match when the variable allows it. Unless the
    /// variable forces case-sensitive matching, a pattern without upper-case
    /// letters matches case-insensitively.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if the pattern does not compile or uses `!` where it is
    /// not allowed.
    pub fn new(def: &VariableDef, text: &str) -> Result<Self> {
        let (not, body) = match text.strip_prefix('!') {
            Some(body) if def.flags.contains(VarFlags::REGEX_ALLOW_NOT) => (true, body),
            Some(_) => {
                return Err(Error::bad_type(format!(
                    "Option {} may not be negated: {text}",
                    def.name
                )));
            }
            None => (false, text),
        };

        let ignore_case = !def.flags.contains(VarFlags::REGEX_MATCH_CASE)
            && !body.chars().any(char::is_uppercase);
        let regex = RegexBuilder::new(body)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| Error::bad_type(format!("Invalid regex for {}: {e}", def.name)))?;

        Ok(Self {
            pattern: text.to_string(),
            not,
            regex,
        })
    }

    /// The text the pattern was built from, including any `!`.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the pattern is negated.
    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.not
    }

    /// The compiled expression, without negation applied.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Tests `haystack`, honouring negation.
    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack) != self.not
    }
}

/// Regex type.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexType;

impl ConfigType for RegexType {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        if text.is_empty() {
            if def.flags.contains(VarFlags::NOT_EMPTY) {
                return Err(Error::bad_type(format!("Option {} may not be empty", def.name)));
            }
            return Ok(Value::Regex(None));
        }
        Ok(Value::Regex(Some(RegexValue::new(def, text)?)))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        match value {
            Value::Regex(r) => Ok(r.as_ref().map(|r| r.pattern.clone())),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::Regex(None) if def.flags.contains(VarFlags::NOT_EMPTY) => Err(
                Error::bad_type(format!("Option {} may not be empty", def.name)),
            ),
            Value::Regex(Some(r)) if r.not && !def.flags.contains(VarFlags::REGEX_ALLOW_NOT) => {
                Err(Error::bad_type(format!(
                    "Option {} may not be negated: {}",
                    def.name, r.pattern
                )))
            }
            Value::Regex(_) => Ok(()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        match &def.initial {
            Initial::None => Ok(Value::Regex(None)),
            Initial::Text(text) if text.is_empty() => Ok(Value::Regex(None)),
            Initial::Text(text) => RegexValue::new(def, text)
                .map(|r| Value::Regex(Some(r)))
                .map_err(|_| bad_initial(def, self.name())),
            Initial::Bool(_) | Initial::Number(_) => Err(bad_initial(def, self.name())),
        }
    }

    fn destroy(&self, storage: &mut Value, _def: &VariableDef) {
        *storage = Value::Regex(None);
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
    use crate::error::Rejection;

    #[test]
    fn test_smart_case() {
        let def = VariableDef::regex("Nance", None);
        let lower = RegexValue::new(&def, "re:").unwrap();
        assert!(lower.is_match("RE: hello"));
        let mixed = RegexValue::new(&def, "Re:").unwrap();
        assert!(!mixed.is_match("RE: hello"));

        let exact = VariableDef::regex("Nance", None).with_flags(VarFlags::REGEX_MATCH_CASE);
        assert!(!RegexValue::new(&exact, "re:").unwrap().is_match("RE:"));
    }

    #[test]
    fn test_negation() {
        let def = VariableDef::regex("Nance", None).with_flags(VarFlags::REGEX_ALLOW_NOT);
        let value = RegexValue::new(&def, "!spam").unwrap();
        assert!(value.is_negated());
        assert!(value.is_match("ham"));
        assert!(!value.is_match("spam"));
        assert_eq!(value.pattern(), "!spam");

        let plain = VariableDef::regex("Nance", None);
        assert!(RegexValue::new(&plain, "!spam").is_err());
    }

    #[test]
    fn test_bad_pattern_keeps_value() {
        let def = VariableDef::regex("Nance", Some("^a"));
        let mut storage = RegexType.initial_value(&def).unwrap();
        let err = RegexType.string_set(&mut storage, &def, "(unclosed").unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::BadType));
        assert_eq!(
            RegexType.string_get(&storage, &def).unwrap().as_deref(),
            Some("^a")
        );
    }

    #[test]
    fn test_same_pattern_is_no_change() {
        let def = VariableDef::regex("Nance", Some("^a"));
        let mut storage = RegexType.initial_value(&def).unwrap();
        let outcome = RegexType.string_set(&mut storage, &def, "^a").unwrap();
        assert!(outcome.is_no_change());
    }
}
