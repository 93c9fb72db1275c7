//! Config subsets: named scopes of overlays.
//!
//! A subset shadows a chosen list of variables under a qualified name
//! (`scope:var`). Each variable gets a stable index at creation time so hot
//! paths can skip the name lookup.

use crate::error::{Error, Outcome, Result};
use crate::hash::Handle;
use crate::inherit::qualify;
use crate::set::ConfigSet;
use crate::types::Value;

/// How deep a scope sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeLevel {
    /// Directly under the global set.
    Account,
    /// Under an account.
    Mailbox,
}

/// A scope of overlays over the global set or over another scope.
///
/// The overlays live in the [`ConfigSet`]; release them with
/// [`destroy`](Self::destroy).
#[derive(Debug)]
pub struct ConfigSubset {
    name: String,
    parent: Option<String>,
    level: ScopeLevel,
    var_names: Vec<String>,
    handles: Vec<Handle>,
}

impl ConfigSubset {
    /// Creates a scope called `name` shadowing `var_names`.
    ///
    /// With a `parent` scope each variable shadows `parent:var`, otherwise
    /// the global `var`. Either every overlay is created or none is.
    ///
    /// # Errors
    ///
    /// `UnknownVariable` if a parent variable is missing, `Code` if a
    /// qualified name is already taken.
    pub fn create(
        cs: &mut ConfigSet,
        name: &str,
        parent: Option<&str>,
        level: ScopeLevel,
        var_names: &[&str],
    ) -> Result<Self> {
        let mut handles = Vec::with_capacity(var_names.len());
        for var in var_names {
            let parent_name = parent.map_or_else(|| (*var).to_string(), |p| qualify(p, var));
            let created = cs
                .lookup(&parent_name)
                .ok_or(Error::UnknownVariable(parent_name))
                .and_then(|parent_handle| cs.inherit(parent_handle, &qualify(name, var)));
            match created {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(scope = name, variable = *var, error = %e, "Scope creation failed");
                    for handle in handles.into_iter().rev() {
                        if let Err(e) = cs.remove_overlay(handle) {
                            tracing::error!(scope = name, error = %e, "Failed to unwind overlay");
                        }
                    }
                    return Err(e);
                }
            }
        }

        tracing::debug!(scope = name, parent = ?parent, count = handles.len(), "Created scope");
        Ok(Self {
            name: name.to_string(),
            parent: parent.map(ToString::to_string),
            level,
            var_names: var_names.iter().map(ToString::to_string).collect(),
            handles,
        })
    }

    /// Resets and removes every overlay in the scope.
    ///
    /// # Errors
    ///
    /// The first error hit; the remaining overlays are still removed.
    pub fn destroy(self, cs: &mut ConfigSet) -> Result<()> {
        let mut first_error = None;
        for handle in self.handles.into_iter().rev() {
            if let Err(e) = cs.remove_overlay(handle) {
                tracing::error!(scope = %self.name, error = %e, "Failed to remove overlay");
                first_error.get_or_insert(e);
            }
        }
        tracing::debug!(scope = %self.name, "Destroyed scope");
        first_error.map_or(Ok(()), Err)
    }

    /// The scope's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent scope's name, if nested.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The scope's level.
    #[must_use]
    pub const fn level(&self) -> ScopeLevel {
        self.level
    }

    /// Shadowed variable names, by index.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.var_names
    }

    /// Number of shadowed variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if the scope shadows nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// The qualified name of `var` in this scope.
    #[must_use]
    pub fn qualified(&self, var: &str) -> String {
        qualify(&self.name, var)
    }

    /// Index of a bare variable name.
    #[must_use]
    pub fn index_of(&self, var: &str) -> Option<usize> {
        self.var_names.iter().position(|n| n == var)
    }

    /// Overlay handle for a bare variable name.
    #[must_use]
    pub fn lookup(&self, var: &str) -> Option<Handle> {
        self.index_of(var).map(|i| self.handles[i])
    }

    /// Overlay handle at `index`.
    ///
    /// # Errors
    ///
    /// `Code` if the index is out of range.
    pub fn handle(&self, index: usize) -> Result<Handle> {
        self.handles.get(index).copied().ok_or_else(|| {
            Error::code(format!(
                "Index {index} is out of range for scope {} ({} variables)",
                self.name,
                self.handles.len()
            ))
        })
    }

    /// Renders the value at `index`.
    ///
    /// # Errors
    ///
    /// `Code` if the index is out of range.
    pub fn get_string_by_index(&self, cs: &ConfigSet, index: usize) -> Result<Option<String>> {
        cs.get_string_by_handle(self.handle(index)?)
    }

    /// Parses and stores a value at `index`.
    ///
    /// # Errors
    ///
    /// `Code` if the index is out of range, or `InvalidValue`.
    pub fn set_string_by_index(
        &self,
        cs: &mut ConfigSet,
        index: usize,
        text: &str,
    ) -> Result<Outcome> {
        cs.set_string_by_handle(self.handle(index)?, text)
    }

    /// Returns a copy of the value at `index`.
    ///
    /// # Errors
    ///
    /// `Code` if the index is out of range.
    pub fn get_native_by_index(&self, cs: &ConfigSet, index: usize) -> Result<Value> {
        cs.get_native_by_handle(self.handle(index)?)
    }

    /// Stores a programmatic value at `index`.
    ///
    /// # Errors
    ///
    /// `Code` if the index is out of range or the value is the wrong kind,
    /// or `InvalidValue`.
    pub fn set_native_by_index(
        &self,
        cs: &mut ConfigSet,
        index: usize,
        value: Value,
    ) -> Result<Outcome> {
        cs.set_native_by_handle(self.handle(index)?, value)
    }

    /// Makes the variable at `index` inherit again.
    ///
    /// # Errors
    ///
    /// `Code` if the index is out of range.
    pub fn reset_by_index(&self, cs: &mut ConfigSet, index: usize) -> Result<Outcome> {
        cs.reset_by_handle(self.handle(index)?)
    }

    /// Returns true if the variable at `index` holds its own value.
    ///
    /// # Errors
    ///
    /// `Code` if the index is out of range.
    pub fn is_overridden(&self, cs: &ConfigSet, index: usize) -> Result<bool> {
        cs.is_overridden(self.handle(index)?)
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
    use crate::def::VariableDef;
    use crate::error::{ErrorKind, Status};

    fn orchard() -> ConfigSet {
        let mut cs = ConfigSet::with_builtin_types("test").unwrap();
        cs.register_variables([
            VariableDef::number("Quince", 5),
            VariableDef::string("Raspberry", Some("tart")),
            VariableDef::boolean("Sloe", true),
        ])
        .unwrap();
        cs
    }

    #[test]
    fn test_index_access() {
        let mut cs = orchard();
        let scope =
            ConfigSubset::create(&mut cs, "ac", None, ScopeLevel::Account, &["Quince", "Sloe"])
                .unwrap();
        assert_eq!(scope.len(), 2);
        assert_eq!(scope.index_of("Sloe"), Some(1));
        assert_eq!(scope.index_of("Raspberry"), None);
        assert_eq!(scope.qualified("Quince"), "ac:Quince");

        assert_eq!(
            scope.get_string_by_index(&cs, 0).unwrap().as_deref(),
            Some("5")
        );
        assert!(!scope.is_overridden(&cs, 0).unwrap());

        scope.set_string_by_index(&mut cs, 0, "7").unwrap();
        assert!(scope.is_overridden(&cs, 0).unwrap());
        assert_eq!(scope.get_native_by_index(&cs, 0).unwrap(), Value::Number(7));
        assert_eq!(cs.get_string("Quince").unwrap().as_deref(), Some("5"));

        scope
            .set_native_by_index(&mut cs, 1, Value::Bool(false))
            .unwrap();
        assert_eq!(cs.get_native("Sloe").unwrap(), Value::Bool(true));

        let outcome = scope.reset_by_index(&mut cs, 0).unwrap();
        assert!(outcome.status.contains(Status::INHERITED));
        assert_eq!(scope.get_native_by_index(&cs, 0).unwrap(), Value::Number(5));

        assert_eq!(
            scope.get_string_by_index(&cs, 9).unwrap_err().kind(),
            ErrorKind::Code
        );
        scope.destroy(&mut cs).unwrap();
    }

    #[test]
    fn test_missing_variable_unwinds() {
        let mut cs = orchard();
        let before = cs.len();
        let err = ConfigSubset::create(
            &mut cs,
            "ac",
            None,
            ScopeLevel::Account,
            &["Quince", "Raspberry", "NoSuchVar"],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownVariable);
        assert_eq!(cs.len(), before);
        assert!(cs.lookup("ac:Quince").is_none());
        assert!(cs.lookup("ac:Raspberry").is_none());
    }

    #[test]
    fn test_duplicate_scope_unwinds() {
        let mut cs = orchard();
        let first =
            ConfigSubset::create(&mut cs, "ac", None, ScopeLevel::Account, &["Sloe"]).unwrap();
        let before = cs.len();
        let err = ConfigSubset::create(
            &mut cs,
            "ac",
            None,
            ScopeLevel::Account,
            &["Quince", "Sloe"],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Code);
        assert_eq!(cs.len(), before);
        assert!(cs.lookup("ac:Quince").is_none());
        assert!(cs.lookup("ac:Sloe").is_some());
        first.destroy(&mut cs).unwrap();
    }

    #[test]
    fn test_destroy_removes_overlays() {
        let mut cs = orchard();
        let before = cs.len();
        let scope =
            ConfigSubset::create(&mut cs, "ac", None, ScopeLevel::Account, &["Raspberry"]).unwrap();
        cs.set_string("ac:Raspberry", "sweet").unwrap();
        assert_eq!(cs.len(), before + 1);

        scope.destroy(&mut cs).unwrap();
        assert_eq!(cs.len(), before);
        assert_eq!(cs.get_string("Raspberry").unwrap().as_deref(), Some("tart"));
    }

    #[test]
    fn test_parent_scope_destroyed_first() {
        let mut cs = orchard();
        let account =
            ConfigSubset::create(&mut cs, "ac", None, ScopeLevel::Account, &["Quince"]).unwrap();
        let mailbox =
            ConfigSubset::create(&mut cs, "ac:mbox", Some("ac"), ScopeLevel::Mailbox, &["Quince"])
                .unwrap();
        cs.set_string("ac:Quince", "7").unwrap();

        account.destroy(&mut cs).unwrap();
        assert_eq!(mailbox.get_string_by_index(&cs, 0).unwrap().as_deref(), Some("5"));
        mailbox.set_string_by_index(&mut cs, 0, "9").unwrap();
        assert_eq!(cs.get_string("Quince").unwrap().as_deref(), Some("5"));
        mailbox.destroy(&mut cs).unwrap();
        assert!(cs.lookup("ac:mbox:Quince").is_none());
    }
}
