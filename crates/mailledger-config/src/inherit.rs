//! Inheritance overlays.
//!
//! An overlay shadows one parent entry (a global variable or another
//! overlay). Until it is written it holds nothing and every read falls
//! through to the parent; once written it owns a value of the parent's type
//! until it is reset.

use crate::hash::Handle;
use crate::types::Value;

/// Whether an overlay has its own value.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState {
    /// Reads go to the parent.
    Proxy,
    /// Overridden locally.
    Owned(Value),
}

/// A scoped shadow of a parent entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Inheritance {
    /// Entry this overlay shadows.
    pub parent: Handle,
    /// Scope-qualified name, e.g. `work:Quince`.
    pub name: String,
    /// Local state.
    pub state: OverlayState,
}

impl Inheritance {
    /// Creates an overlay that proxies to `parent`.
    #[must_use]
    pub fn new(parent: Handle, name: impl Into<String>) -> Self {
        Self {
            parent,
            name: name.into(),
            state: OverlayState::Proxy,
        }
    }

    /// Returns true if the overlay holds its own value.
    #[must_use]
    pub const fn is_overridden(&self) -> bool {
        matches!(self.state, OverlayState::Owned(_))
    }

    /// The local value, if overridden.
    #[must_use]
    pub const fn local(&self) -> Option<&Value> {
        match &self.state {
            OverlayState::Owned(value) => Some(value),
            OverlayState::Proxy => None,
        }
    }
}

/// Joins a scope name and a variable name: `scope:var`.
#[must_use]
pub fn qualify(scope: &str, var: &str) -> String {
    format!("{scope}:{var}")
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
    use crate::hash::{HashFlags, HashTable};

    #[test]
    fn test_new_overlay_proxies() {
        let mut table: HashTable<()> = HashTable::new(4, HashFlags::empty());
        let parent = table.insert("Quince", 0, ()).unwrap();

        let mut overlay = Inheritance::new(parent, qualify("work", "Quince"));
        assert_eq!(overlay.name, "work:Quince");
        assert!(!overlay.is_overridden());
        assert!(overlay.local().is_none());

        overlay.state = OverlayState::Owned(Value::Number(9));
        assert!(overlay.is_overridden());
        assert_eq!(overlay.local(), Some(&Value::Number(9)));
    }
}
