//! Email addresses with an optional display name.

use std::fmt;

use super::{ConfigType, Value, bad_initial, mismatch};
use crate::def::{Initial, VarFlags, VariableDef};
use crate::error::{Error, Result};

const SPECIALS: &[char] = &['(', ')', '<', '>', '@', ',', ';', ':', '\\', '"', '.', '[', ']'];

/// Address such as `Jane Doe <jane@example.com>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// Display name.
    pub personal: Option<String>,
    /// Mailbox, `local@domain`.
    pub mailbox: String,
}

impl Address {
    /// Creates an address from a bare mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox is malformed.
    pub fn new(mailbox: impl Into<String>) -> Result<Self> {
        let mailbox = mailbox.into();
        Self::validate(&mailbox)?;
        Ok(Self {
            personal: None,
            mailbox,
        })
    }

    /// Creates an address with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox is malformed.
    pub fn with_personal(personal: impl Into<String>, mailbox: impl Into<String>) -> Result<Self> {
        let mut address = Self::new(mailbox)?;
        address.personal = Some(personal.into());
        Ok(address)
    }

    /// Parses `mailbox`, `<mailbox>` or `Name <mailbox>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a single address.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let Some(open) = text.find('<') else {
            return Self::new(text);
        };
        let Some(inner) = text[open + 1..].strip_suffix('>') else {
            return Err(Error::bad_type(format!("Unterminated address: {text}")));
        };
        let mut address = Self::new(inner.trim())?;
        let personal = text[..open].trim();
        let personal = personal
            .strip_prefix('"')
            .and_then(|p| p.strip_suffix('"'))
            .map_or_else(|| personal.to_string(), |p| p.replace("\\\"", "\""));
        if !personal.is_empty() {
            address.personal = Some(personal);
        }
        Ok(address)
    }

    fn validate(mailbox: &str) -> Result<()> {
        if mailbox.is_empty() {
            return Err(Error::bad_type("Address cannot be empty"));
        }
        if mailbox.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | ',')) {
            return Err(Error::bad_type(format!("Invalid address: {mailbox}")));
        }
        let parts: Vec<&str> = mailbox.split('@').collect();
        if parts.len() > 2 {
            return Err(Error::bad_type("Address must have at most one @"));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::bad_type("Local and domain parts cannot be empty"));
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.personal {
            Some(name) if name.contains(SPECIALS) => {
                write!(f, "\"{}\" <{}>", name.replace('"', "\\\""), self.mailbox)
            }
            Some(name) => write!(f, "{name} <{}>", self.mailbox),
            None => f.write_str(&self.mailbox),
        }
    }
}

/// Address type.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressType;

impl ConfigType for AddressType {
    fn name(&self) -> &'static str {
        "address"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        if text.trim().is_empty() {
            if def.flags.contains(VarFlags::NOT_EMPTY) {
                return Err(Error::bad_type(format!("Option {} may not be empty", def.name)));
            }
            return Ok(Value::Address(None));
        }
        Ok(Value::Address(Some(Address::parse(text)?)))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        match value {
            Value::Address(a) => Ok(a.as_ref().map(ToString::to_string)),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::Address(None) if def.flags.contains(VarFlags::NOT_EMPTY) => Err(
                Error::bad_type(format!("Option {} may not be empty", def.name)),
            ),
            Value::Address(Some(a)) => Address::validate(&a.mailbox),
            Value::Address(None) => Ok(()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        match &def.initial {
            Initial::None => Ok(Value::Address(None)),
            Initial::Text(text) if text.is_empty() => Ok(Value::Address(None)),
            Initial::Text(text) => Address::parse(text)
                .map(|a| Value::Address(Some(a)))
                .map_err(|_| bad_initial(def, self.name())),
            Initial::Bool(_) | Initial::Number(_) => Err(bad_initial(def, self.name())),
        }
    }

    fn destroy(&self, storage: &mut Value, _def: &VariableDef) {
        *storage = Value::Address(None);
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
    fn test_parse_forms() {
        let bare = Address::parse("user@example.com").unwrap();
        assert_eq!(bare.mailbox, "user@example.com");
        assert!(bare.personal.is_none());

        let angle = Address::parse("<user@example.com>").unwrap();
        assert!(angle.personal.is_none());

        let named = Address::parse("John Doe <john@example.com>").unwrap();
        assert_eq!(named.personal.as_deref(), Some("John Doe"));
        assert_eq!(named.mailbox, "john@example.com");

        let quoted = Address::parse("\"Doe, John\" <john@example.com>").unwrap();
        assert_eq!(quoted.personal.as_deref(), Some("Doe, John"));
    }

    #[test]
    fn test_invalid() {
        assert!(Address::parse("@example.com").is_err());
        assert!(Address::parse("user@").is_err());
        assert!(Address::parse("a@b@c").is_err());
        assert!(Address::parse("John <john@example.com").is_err());
        assert!(Address::parse("two words").is_err());
    }

    #[test]
    fn test_display_quotes_specials() {
        let a = Address::with_personal("Doe, John", "john@example.com").unwrap();
        assert_eq!(a.to_string(), "\"Doe, John\" <john@example.com>");
        let b = Address::with_personal("John Doe", "john@example.com").unwrap();
        assert_eq!(b.to_string(), "John Doe <john@example.com>");
    }

    #[test]
    fn test_type_round_trip() {
        let def = VariableDef::address("Olive", None);
        let mut storage = AddressType.initial_value(&def).unwrap();
        AddressType
            .string_set(&mut storage, &def, "\"Doe, John\" <john@example.com>")
            .unwrap();
        assert_eq!(
            AddressType.string_get(&storage, &def).unwrap().as_deref(),
            Some("\"Doe, John\" <john@example.com>")
        );
    }
}
