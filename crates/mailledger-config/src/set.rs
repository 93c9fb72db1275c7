//! The config set: registration, lookup and mutation of variables.
//!
//! A [`ConfigSet`] owns one [`HashTable`] of entries and one
//! [`TypeRegistry`]. Entries are plain variables, synonyms (aliases that
//! resolve to a variable) or overlays created by [`ConfigSet::inherit`].
//! Every operation is available by name and by [`Handle`]; handle access
//! skips the hash lookup.

use std::mem;

use crate::def::{Initial, VariableDef};
use crate::error::{Error, Outcome, Result, Status};
use crate::hash::{DuplicateKey, Handle, HashElem, HashFlags, HashTable};
use crate::inherit::{Inheritance, OverlayState};
use crate::notify::{ConfigEvent, EventKind, Listener, ListenerId, Listeners};
use crate::types::{ConfigType, TypeRegistry, TypeTag, Value, validate};

/// Bucket count used by [`ConfigSet::new`].
pub const DEFAULT_CAPACITY: usize = 500;

/// A registered variable: its definition and current global value.
#[derive(Debug, Clone)]
pub struct Variable {
    def: VariableDef,
    value: Value,
    initial_set: bool,
}

impl Variable {
    /// The variable's definition.
    #[must_use]
    pub const fn def(&self) -> &VariableDef {
        &self.def
    }

    /// The current global value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

/// What a table entry holds.
#[derive(Debug, Clone)]
pub enum ConfigEntry {
    /// A concrete variable.
    Variable(Variable),
    /// Alias for the variable behind the handle.
    Synonym(Handle),
    /// Scoped shadow of another entry.
    Overlay(Inheritance),
}

/// Builder for [`ConfigSet`].
#[derive(Debug, Clone)]
pub struct ConfigSetBuilder {
    name: String,
    capacity: usize,
    case_insensitive: bool,
}

impl ConfigSetBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity: DEFAULT_CAPACITY,
            case_insensitive: false,
        }
    }

    /// Sets the number of hash buckets.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets whether variable names compare case-insensitively.
    #[must_use]
    pub const fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Builds an empty set with no types registered.
    #[must_use]
    pub fn build(self) -> ConfigSet {
        let flags = if self.case_insensitive {
            HashFlags::CASE_INSENSITIVE
        } else {
            HashFlags::empty()
        };
        ConfigSet {
            name: self.name,
            table: HashTable::new(self.capacity, flags).with_destructor(destroy_entry),
            types: TypeRegistry::new(),
            listeners: Listeners::default(),
        }
    }
}

/// A collection of config variables.
#[derive(Debug)]
pub struct ConfigSet {
    name: String,
    table: HashTable<ConfigEntry, TypeRegistry>,
    types: TypeRegistry,
    listeners: Listeners,
}

impl ConfigSet {
    /// Creates an empty set with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Starts building a set.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ConfigSetBuilder {
        ConfigSetBuilder::new(name)
    }

    /// Creates a set with every built-in type registered.
    ///
    /// # Errors
    ///
    /// Fails only if a built-in type cannot be registered.
    pub fn with_builtin_types(name: impl Into<String>) -> Result<Self> {
        let mut cs = Self::new(name);
        cs.register_types()?;
        Ok(cs)
    }

    /// The set's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries, including synonyms and overlays.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The type registry.
    #[must_use]
    pub const fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Registers every built-in type.
    ///
    /// # Errors
    ///
    /// `Code` if any built-in tag is already bound.
    pub fn register_types(&mut self) -> Result<()> {
        self.types.register_builtins()
    }

    /// Registers one custom type.
    ///
    /// # Errors
    ///
    /// `Code` if the tag is reserved or already bound.
    pub fn register_type(&mut self, tag: TypeTag, ty: Box<dyn ConfigType>) -> Result<()> {
        self.types.register(tag, ty)
    }

    /// Registers a batch of definitions.
    ///
    /// Each definition is registered independently. A failing definition is
    /// logged and skipped; the rest still register.
    ///
    /// # Errors
    ///
    /// `Code` naming every definition that failed, if any did.
    pub fn register_variables(&mut self, defs: impl IntoIterator<Item = VariableDef>) -> Result<()> {
        let mut failed = Vec::new();
        for def in defs {
            let name = def.name.to_string();
            if let Err(e) = self.register_variable(def) {
                tracing::error!(variable = %name, error = %e, "Failed to register variable");
                failed.push(name);
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::code(format!(
                "{} variable(s) failed to register: {}",
                failed.len(),
                failed.join(", ")
            )))
        }
    }

    /// Registers one definition and sets it to its default.
    ///
    /// The declared default is trusted: the validator only gates later
    /// changes, so a variable whose validator rejects everything still
    /// registers and keeps its default.
    ///
    /// # Errors
    ///
    /// `Code` if the name is taken, the type is not registered, the default
    /// cannot be built, or a synonym's target is not a variable.
    pub fn register_variable(&mut self, def: VariableDef) -> Result<Handle> {
        if def.type_tag == TypeTag::SYNONYM {
            let Initial::Text(target) = &def.initial else {
                return Err(Error::code(format!("Synonym {} has no target", def.name)));
            };
            return self.create_synonym(&def.name, target);
        }

        let ty = descriptor(&self.types, &def)?;
        let value = ty.initial_value(&def)?;

        let name = def.name.to_string();
        let tag = u32::from(def.type_tag.raw());
        let entry = ConfigEntry::Variable(Variable {
            def,
            value,
            initial_set: false,
        });
        let handle = self.table.insert(name.as_str(), tag, entry).map_err(duplicate)?;
        tracing::debug!(variable = %name, kind = ty.name(), "Registered variable");
        Ok(handle)
    }

    /// Adds `name` as an alias for the variable `target`.
    ///
    /// # Errors
    ///
    /// `Code` if `target` is missing or is not a plain variable, or if
    /// `name` is taken.
    pub fn create_synonym(&mut self, name: &str, target: &str) -> Result<Handle> {
        let target_handle = self.table.find(target).ok_or_else(|| {
            Error::code(format!("Synonym {name} points at unknown variable {target}"))
        })?;
        if !matches!(
            self.table.get(target_handle).map(|e| &e.data),
            Some(ConfigEntry::Variable(_))
        ) {
            return Err(Error::code(format!(
                "Synonym {name} must point at a variable, {target} is not one"
            )));
        }
        let tag = u32::from(TypeTag::SYNONYM.raw());
        let handle = self
            .table
            .insert(name, tag, ConfigEntry::Synonym(target_handle))
            .map_err(duplicate)?;
        tracing::debug!(synonym = %name, variable = %target, "Registered synonym");
        Ok(handle)
    }

    /// Creates an overlay called `name` that shadows `parent`.
    ///
    /// # Errors
    ///
    /// `Code` if `parent` is stale or a synonym, or `name` is taken.
    pub fn inherit(&mut self, parent: Handle, name: &str) -> Result<Handle> {
        match self.table.get(parent).map(|e| &e.data) {
            Some(ConfigEntry::Variable(_) | ConfigEntry::Overlay(_)) => {}
            Some(ConfigEntry::Synonym(_)) => {
                return Err(Error::code(format!("{name} cannot inherit from a synonym")));
            }
            None => return Err(stale(parent)),
        }
        let tag = u32::from(TypeTag::NONE.raw());
        let handle = self
            .table
            .insert(name, tag, ConfigEntry::Overlay(Inheritance::new(parent, name)))
            .map_err(duplicate)?;
        tracing::debug!(overlay = %name, "Created overlay");
        Ok(handle)
    }

    /// Resets and removes an overlay.
    ///
    /// Overlays that inherit from the removed one are re-parented onto its
    /// parent, so a mailbox scope outliving its account reads the global
    /// value. Listeners see a `Reset` (if the overlay was overridden)
    /// followed by `Deleted`.
    ///
    /// # Errors
    ///
    /// `Code` if the handle is stale or not an overlay.
    pub fn remove_overlay(&mut self, handle: Handle) -> Result<()> {
        let ConfigEntry::Overlay(inh) = &self.entry(handle)?.data else {
            return Err(Error::code(format!("Entry {} is not an overlay", self.key_of(handle))));
        };
        let grandparent = inh.parent;
        self.reset_by_handle(handle)?;
        self.notify(handle, EventKind::Deleted);

        let children: Vec<Handle> = self
            .table
            .iter()
            .filter(|(_, e)| {
                matches!(&e.data, ConfigEntry::Overlay(child) if child.parent == handle)
            })
            .map(|(h, _)| h)
            .collect();
        for &child in &children {
            if let Some(ConfigEntry::Overlay(inh)) =
                self.table.get_mut(child).map(|e| &mut e.data)
            {
                inh.parent = grandparent;
            }
        }

        let Self { table, types, .. } = self;
        table.remove(handle, types);
        tracing::debug!(?handle, reparented = children.len(), "Removed overlay");
        Ok(())
    }

    /// Finds a variable, following one synonym hop.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Handle> {
        let handle = self.table.find(name)?;
        match &self.table.get(handle)?.data {
            ConfigEntry::Synonym(target) => Some(*target),
            ConfigEntry::Variable(_) | ConfigEntry::Overlay(_) => Some(handle),
        }
    }

    /// Returns the entry behind a handle.
    ///
    /// # Errors
    ///
    /// `Code` if the handle is stale.
    pub fn entry(&self, handle: Handle) -> Result<&HashElem<ConfigEntry>> {
        self.table.get(handle).ok_or_else(|| stale(handle))
    }

    /// Returns the definition governing a name (the parent's, for overlays).
    ///
    /// # Errors
    ///
    /// `UnknownVariable` if the name is not registered.
    pub fn definition(&self, name: &str) -> Result<&VariableDef> {
        let handle = self.resolve(name)?;
        Ok(&self.base(handle)?.def)
    }

    /// All non-synonym names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .table
            .iter()
            .filter(|(_, e)| !matches!(e.data, ConfigEntry::Synonym(_)))
            .map(|(_, e)| e.key().to_string())
            .collect();
        names.sort();
        names
    }

    /// Renders a variable's value; `None` if unset.
    ///
    /// # Errors
    ///
    /// `UnknownVariable` if the name is not registered.
    pub fn get_string(&self, name: &str) -> Result<Option<String>> {
        self.get_string_by_handle(self.resolve(name)?)
    }

    /// Parses and stores a value.
    ///
    /// # Errors
    ///
    /// `UnknownVariable`, or `InvalidValue` if the text is rejected. The
    /// stored value is unchanged on error.
    pub fn set_string(&mut self, name: &str, text: &str) -> Result<Outcome> {
        let handle = self.resolve(name)?;
        self.set_string_by_handle(handle, text)
    }

    /// Returns a copy of a variable's value.
    ///
    /// # Errors
    ///
    /// `UnknownVariable` if the name is not registered.
    pub fn get_native(&self, name: &str) -> Result<Value> {
        self.get_native_by_handle(self.resolve(name)?)
    }

    /// Stores a programmatic value.
    ///
    /// # Errors
    ///
    /// `UnknownVariable`, `Code` for a value of the wrong kind, or
    /// `InvalidValue` if it is rejected.
    pub fn set_native(&mut self, name: &str, value: Value) -> Result<Outcome> {
        let handle = self.resolve(name)?;
        self.set_native_by_handle(handle, value)
    }

    /// Restores a variable's default, or makes an overlay inherit again.
    ///
    /// # Errors
    ///
    /// `UnknownVariable` if the name is not registered.
    pub fn reset(&mut self, name: &str) -> Result<Outcome> {
        let handle = self.resolve(name)?;
        self.reset_by_handle(handle)
    }

    /// Replaces a variable's default, then resets it.
    ///
    /// Every variable gets a default when it is registered, so this is the
    /// one-shot override of that registered default (for example a default
    /// only known once the environment has been read). It is allowed once
    /// per variable and never on an overlay. Unlike the registered default,
    /// the new one must pass the validator.
    ///
    /// # Errors
    ///
    /// `Code` on a second call or an overlay; `InvalidValue` if the text is
    /// rejected, in which case the old default is kept.
    pub fn set_initial(&mut self, name: &str, text: &str) -> Result<Outcome> {
        let handle = self.resolve(name)?;
        {
            let Self { table, types, .. } = self;
            let elem = table.get_mut(handle).ok_or_else(|| stale(handle))?;
            let ConfigEntry::Variable(var) = &mut elem.data else {
                return Err(Error::code(format!(
                    "Cannot set the initial value of overlay {name}"
                )));
            };
            if var.initial_set {
                return Err(Error::code(format!("Initial value of {name} is already set")));
            }
            let ty = descriptor(types, &var.def)?;
            let previous = var.def.initial.clone();
            ty.string_set_initial(&mut var.def, text)?;
            if let Err(e) = ty
                .initial_value(&var.def)
                .and_then(|v| validate(&var.def, &v))
            {
                var.def.initial = previous;
                return Err(e);
            }
            var.initial_set = true;
        }
        self.notify(handle, EventKind::InitialSet);
        self.reset_by_handle(handle)
    }

    /// `set name += text`.
    ///
    /// # Errors
    ///
    /// `UnknownVariable`, `Code` if the type has no append, or
    /// `InvalidValue`.
    pub fn plus_equals(&mut self, name: &str, text: &str) -> Result<Outcome> {
        let handle = self.resolve(name)?;
        self.plus_equals_by_handle(handle, text)
    }

    /// `set name -= text`.
    ///
    /// # Errors
    ///
    /// `UnknownVariable`, `Code` if the type has no remove, or
    /// `InvalidValue`.
    pub fn minus_equals(&mut self, name: &str, text: &str) -> Result<Outcome> {
        let handle = self.resolve(name)?;
        self.minus_equals_by_handle(handle, text)
    }

    /// Flips a boolean or quad-option.
    ///
    /// # Errors
    ///
    /// `UnknownVariable`, or `Code` for types that cannot be toggled.
    pub fn toggle(&mut self, name: &str) -> Result<Outcome> {
        let handle = self.resolve(name)?;
        self.toggle_by_handle(handle)
    }

    /// Returns true if the current value differs from the default.
    ///
    /// # Errors
    ///
    /// `UnknownVariable` if the name is not registered.
    pub fn has_been_set(&self, name: &str) -> Result<bool> {
        let handle = self.resolve(name)?;
        let var = self.base(handle)?;
        let initial = descriptor(&self.types, &var.def)?.initial_value(&var.def)?;
        Ok(*self.effective(handle)? != initial)
    }

    /// See [`get_string`](Self::get_string).
    ///
    /// # Errors
    ///
    /// `Code` if the handle is stale.
    pub fn get_string_by_handle(&self, handle: Handle) -> Result<Option<String>> {
        let var = self.base(handle)?;
        let ty = descriptor(&self.types, &var.def)?;
        ty.string_get(self.effective(handle)?, &var.def)
    }

    /// See [`get_native`](Self::get_native).
    ///
    /// # Errors
    ///
    /// `Code` if the handle is stale.
    pub fn get_native_by_handle(&self, handle: Handle) -> Result<Value> {
        let var = self.base(handle)?;
        let ty = descriptor(&self.types, &var.def)?;
        ty.native_get(self.effective(handle)?, &var.def)
    }

    /// See [`set_string`](Self::set_string).
    ///
    /// # Errors
    ///
    /// `Code` if the handle is stale, or `InvalidValue`.
    pub fn set_string_by_handle(&mut self, handle: Handle, text: &str) -> Result<Outcome> {
        self.apply(handle, EventKind::Set, |ty, value, def| {
            ty.string_set(value, def, text)
        })
    }

    /// See [`set_native`](Self::set_native).
    ///
    /// # Errors
    ///
    /// `Code` if the handle is stale or the value is the wrong kind, or
    /// `InvalidValue`.
    pub fn set_native_by_handle(&mut self, handle: Handle, value: Value) -> Result<Outcome> {
        self.apply(handle, EventKind::Set, move |ty, storage, def| {
            ty.native_set(storage, def, value)
        })
    }

    /// See [`plus_equals`](Self::plus_equals).
    ///
    /// # Errors
    ///
    /// As [`plus_equals`](Self::plus_equals).
    pub fn plus_equals_by_handle(&mut self, handle: Handle, text: &str) -> Result<Outcome> {
        self.apply(handle, EventKind::Set, |ty, value, def| {
            ty.plus_equals(value, def, text)
        })
    }

    /// See [`minus_equals`](Self::minus_equals).
    ///
    /// # Errors
    ///
    /// As [`minus_equals`](Self::minus_equals).
    pub fn minus_equals_by_handle(&mut self, handle: Handle, text: &str) -> Result<Outcome> {
        self.apply(handle, EventKind::Set, |ty, value, def| {
            ty.minus_equals(value, def, text)
        })
    }

    /// See [`toggle`](Self::toggle).
    ///
    /// # Errors
    ///
    /// As [`toggle`](Self::toggle).
    pub fn toggle_by_handle(&mut self, handle: Handle) -> Result<Outcome> {
        self.apply(handle, EventKind::Set, |ty, value, def| ty.toggle(value, def))
    }

    /// See [`reset`](Self::reset).
    ///
    /// Resetting an overlay that is not overridden changes nothing and
    /// returns `INHERITED | NO_CHANGE` without notifying.
    ///
    /// # Errors
    ///
    /// `Code` if the handle is stale or the default cannot be built.
    pub fn reset_by_handle(&mut self, handle: Handle) -> Result<Outcome> {
        let handle = self.concrete(handle)?;
        let overridden = match &self.entry(handle)?.data {
            ConfigEntry::Overlay(inh) => inh.is_overridden(),
            ConfigEntry::Variable(_) | ConfigEntry::Synonym(_) => {
                return self.apply(handle, EventKind::Reset, |ty, value, def| {
                    ty.reset(value, def)
                });
            }
        };
        if !overridden {
            return Ok(Outcome::with(Status::INHERITED | Status::NO_CHANGE));
        }

        let elem = self.table.get_mut(handle).ok_or_else(|| stale(handle))?;
        elem.type_tag = u32::from(TypeTag::NONE.raw());
        let ConfigEntry::Overlay(inh) = &mut elem.data else {
            return Err(stale(handle));
        };
        if let OverlayState::Owned(mut local) = mem::replace(&mut inh.state, OverlayState::Proxy) {
            let var = self.base(handle)?;
            descriptor(&self.types, &var.def)?.destroy(&mut local, &var.def);
        }

        self.notify(handle, EventKind::Reset);
        Ok(Outcome::with(Status::INHERITED))
    }

    /// Returns true if the handle is an overlay holding its own value.
    ///
    /// # Errors
    ///
    /// `Code` if the handle is stale.
    pub fn is_overridden(&self, handle: Handle) -> Result<bool> {
        Ok(match &self.entry(handle)?.data {
            ConfigEntry::Overlay(inh) => inh.is_overridden(),
            ConfigEntry::Variable(_) | ConfigEntry::Synonym(_) => false,
        })
    }

    /// Adds a listener, called after every change.
    pub fn add_listener(&mut self, listener: Listener) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Iterates over every entry in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &HashElem<ConfigEntry>)> {
        self.table.iter()
    }

    /// The variable an entry ultimately shadows.
    pub(crate) fn base(&self, mut handle: Handle) -> Result<&Variable> {
        for _ in 0..=self.table.len() {
            match &self.entry(handle)?.data {
                ConfigEntry::Variable(var) => return Ok(var),
                ConfigEntry::Overlay(inh) => handle = inh.parent,
                ConfigEntry::Synonym(target) => handle = *target,
            }
        }
        Err(Error::code(format!("Inheritance loop at {}", self.key_of(handle))))
    }

    /// The value reads of `handle` see: the first overridden link walking
    /// up from `handle`, or the global value.
    pub(crate) fn effective(&self, mut handle: Handle) -> Result<&Value> {
        for _ in 0..=self.table.len() {
            match &self.entry(handle)?.data {
                ConfigEntry::Variable(var) => return Ok(&var.value),
                ConfigEntry::Overlay(inh) => match &inh.state {
                    OverlayState::Owned(value) => return Ok(value),
                    OverlayState::Proxy => handle = inh.parent,
                },
                ConfigEntry::Synonym(target) => handle = *target,
            }
        }
        Err(Error::code(format!("Inheritance loop at {}", self.key_of(handle))))
    }

    fn resolve(&self, name: &str) -> Result<Handle> {
        self.lookup(name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    fn concrete(&self, handle: Handle) -> Result<Handle> {
        match &self.entry(handle)?.data {
            ConfigEntry::Synonym(target) => Ok(*target),
            ConfigEntry::Variable(_) | ConfigEntry::Overlay(_) => Ok(handle),
        }
    }

    fn key_of(&self, handle: Handle) -> String {
        self.table
            .get(handle)
            .map_or_else(|| format!("{handle:?}"), |e| e.key().to_string())
    }

    /// Runs a mutation and announces it if something changed.
    fn apply<F>(&mut self, handle: Handle, kind: EventKind, op: F) -> Result<Outcome>
    where
        F: FnOnce(&dyn ConfigType, &mut Value, &VariableDef) -> Result<Outcome>,
    {
        let handle = self.concrete(handle)?;
        let outcome = if matches!(self.entry(handle)?.data, ConfigEntry::Overlay(_)) {
            self.mutate_overlay(handle, op)?
        } else {
            let Self { table, types, .. } = self;
            let elem = table.get_mut(handle).ok_or_else(|| stale(handle))?;
            let ConfigEntry::Variable(var) = &mut elem.data else {
                return Err(stale(handle));
            };
            let ty = descriptor(types, &var.def)?;
            op(ty, &mut var.value, &var.def)?
        };

        if !outcome.is_no_change() {
            self.notify(handle, kind);
        }
        Ok(outcome)
    }

    /// Mutates a copy of the overlay's effective value and stores it locally.
    ///
    /// An overlay that was inheriting becomes overridden even if the value
    /// did not change.
    fn mutate_overlay<F>(&mut self, handle: Handle, op: F) -> Result<Outcome>
    where
        F: FnOnce(&dyn ConfigType, &mut Value, &VariableDef) -> Result<Outcome>,
    {
        let ConfigEntry::Overlay(inh) = &self.entry(handle)?.data else {
            return Err(stale(handle));
        };
        let (mut local, was_proxy) = match &inh.state {
            OverlayState::Owned(value) => (value.clone(), false),
            OverlayState::Proxy => (self.effective(inh.parent)?.clone(), true),
        };

        let (mut outcome, tag) = {
            let var = self.base(handle)?;
            let ty = descriptor(&self.types, &var.def)?;
            (op(ty, &mut local, &var.def)?, var.def.type_tag)
        };
        if outcome.is_no_change() {
            if !was_proxy {
                return Ok(outcome);
            }
            outcome.status.remove(Status::NO_CHANGE);
        }

        let elem = self.table.get_mut(handle).ok_or_else(|| stale(handle))?;
        elem.type_tag = u32::from(tag.raw());
        if let ConfigEntry::Overlay(inh) = &mut elem.data {
            inh.state = OverlayState::Owned(local);
        }
        Ok(outcome)
    }

    fn notify(&mut self, handle: Handle, kind: EventKind) {
        let Some(name) = self.table.get(handle).map(|e| e.key().to_string()) else {
            return;
        };
        tracing::trace!(variable = %name, ?kind, "Config changed");
        if self.listeners.is_empty() {
            return;
        }
        let event = ConfigEvent { handle, name, kind };
        let mut listeners = mem::take(&mut self.listeners);
        listeners.dispatch(self, &event);
        self.listeners = listeners;
    }
}

impl Drop for ConfigSet {
    fn drop(&mut self) {
        let Self { table, types, .. } = self;
        table.clear(types);
    }
}

fn descriptor<'a>(types: &'a TypeRegistry, def: &VariableDef) -> Result<&'a dyn ConfigType> {
    types.get(def.type_tag).ok_or_else(|| {
        Error::code(format!(
            "Option {} has unregistered type {}",
            def.name, def.type_tag
        ))
    })
}

fn destroy_entry(elem: &mut HashElem<ConfigEntry>, types: &TypeRegistry) {
    match &mut elem.data {
        ConfigEntry::Variable(var) => {
            if let Some(ty) = types.get(var.def.type_tag) {
                ty.destroy(&mut var.value, &var.def);
            }
        }
        ConfigEntry::Overlay(inh) => inh.state = OverlayState::Proxy,
        ConfigEntry::Synonym(_) => {}
    }
}

fn stale(handle: Handle) -> Error {
    Error::code(format!("Stale config handle {handle:?}"))
}

fn duplicate(err: DuplicateKey) -> Error {
    Error::code(format!("Variable {} is already registered", err.0))
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
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::def::Verdict;
    use crate::error::{ErrorKind, Rejection};
    use crate::notify::Flow;
    use crate::types::QuadOption;

    fn fruit() -> ConfigSet {
        let mut cs = ConfigSet::with_builtin_types("test").unwrap();
        cs.register_variables([
            VariableDef::string("Apple", Some("red")),
            VariableDef::synonym("Banana", "Apple"),
            VariableDef::number("Cherry", 3),
            VariableDef::boolean("Date", false),
            VariableDef::quad("Elder", QuadOption::AskYes),
        ])
        .unwrap();
        cs
    }

    fn recorder(cs: &mut ConfigSet) -> Rc<RefCell<Vec<(String, EventKind)>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        cs.add_listener(Box::new(move |_: &ConfigSet, event: &ConfigEvent| {
            log.borrow_mut().push((event.name.clone(), event.kind));
            Flow::Continue
        }));
        seen
    }

    #[test]
    fn test_defaults_after_registration() {
        let cs = fruit();
        assert_eq!(cs.get_string("Apple").unwrap().as_deref(), Some("red"));
        assert_eq!(cs.get_string("Cherry").unwrap().as_deref(), Some("3"));
        assert_eq!(cs.get_string("Date").unwrap().as_deref(), Some("no"));
        assert_eq!(cs.get_string("Elder").unwrap().as_deref(), Some("ask-yes"));
        assert_eq!(cs.len(), 5);
    }

    #[test]
    fn test_unknown_variable() {
        let mut cs = fruit();
        assert_eq!(
            cs.get_string("NoSuchVar").unwrap_err().kind(),
            ErrorKind::UnknownVariable
        );
        assert_eq!(
            cs.set_string("NoSuchVar", "x").unwrap_err().kind(),
            ErrorKind::UnknownVariable
        );
        assert_eq!(
            cs.reset("NoSuchVar").unwrap_err().kind(),
            ErrorKind::UnknownVariable
        );
    }

    #[test]
    fn test_synonym_resolves_to_target() {
        let mut cs = fruit();
        assert_eq!(cs.lookup("Banana"), cs.lookup("Apple"));
        cs.set_string("Banana", "x").unwrap();
        assert_eq!(cs.get_string("Apple").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_synonym_needs_variable_target() {
        let mut cs = fruit();
        assert!(cs.create_synonym("Fig", "Nowhere").is_err());
        assert!(cs.create_synonym("Fig", "Banana").is_err());
        assert!(cs.lookup("Fig").is_none());
    }

    #[test]
    fn test_no_change_skips_listeners() {
        let mut cs = fruit();
        let seen = recorder(&mut cs);

        let outcome = cs.set_string("Cherry", "3").unwrap();
        assert!(outcome.is_no_change());
        assert!(seen.borrow().is_empty());

        cs.set_string("Cherry", "4").unwrap();
        assert_eq!(*seen.borrow(), [("Cherry".to_string(), EventKind::Set)]);
    }

    #[test]
    fn test_listener_stop_and_remove() {
        let mut cs = fruit();
        let first = cs.add_listener(Box::new(|_: &ConfigSet, _: &ConfigEvent| Flow::Stop));
        let seen = recorder(&mut cs);

        cs.set_string("Apple", "green").unwrap();
        assert!(seen.borrow().is_empty());

        assert!(cs.remove_listener(first));
        assert!(!cs.remove_listener(first));
        cs.set_string("Apple", "blue").unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_listener_can_read_set() {
        let mut cs = fruit();
        let seen = Rc::new(RefCell::new(None));
        let log = Rc::clone(&seen);
        cs.add_listener(Box::new(move |cs: &ConfigSet, event: &ConfigEvent| {
            *log.borrow_mut() = cs.get_string(&event.name).unwrap();
            Flow::Continue
        }));
        cs.set_string("Apple", "pink").unwrap();
        assert_eq!(seen.borrow().as_deref(), Some("pink"));
    }

    #[test]
    fn test_reset_restores_default() {
        let mut cs = fruit();
        let seen = recorder(&mut cs);
        cs.set_string("Cherry", "42").unwrap();
        assert!(cs.has_been_set("Cherry").unwrap());

        cs.reset("Cherry").unwrap();
        assert_eq!(cs.get_string("Cherry").unwrap().as_deref(), Some("3"));
        assert!(!cs.has_been_set("Cherry").unwrap());
        assert_eq!(seen.borrow().last().unwrap().1, EventKind::Reset);
    }

    #[test]
    fn test_native_round_trip() {
        let mut cs = fruit();
        cs.set_native("Cherry", Value::Number(-12)).unwrap();
        assert_eq!(cs.get_native("Cherry").unwrap(), Value::Number(-12));

        let err = cs.set_native("Cherry", Value::Bool(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Code);
        assert_eq!(cs.get_native("Cherry").unwrap(), Value::Number(-12));
    }

    #[test]
    fn test_bad_text_keeps_value() {
        let mut cs = fruit();
        let err = cs.set_string("Cherry", "lots").unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::BadType));
        assert_eq!(cs.get_string("Cherry").unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn test_set_initial_once() {
        let mut cs = fruit();
        let seen = recorder(&mut cs);
        cs.set_initial("Cherry", "8").unwrap();
        assert_eq!(cs.get_string("Cherry").unwrap().as_deref(), Some("8"));
        assert!(!cs.has_been_set("Cherry").unwrap());
        assert_eq!(seen.borrow()[0].1, EventKind::InitialSet);

        let err = cs.set_initial("Cherry", "9").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Code);
    }

    #[test]
    fn test_set_initial_rejects_bad_text() {
        let mut cs = fruit();
        assert!(cs.set_initial("Cherry", "many").is_err());
        assert_eq!(cs.get_string("Cherry").unwrap().as_deref(), Some("3"));
        cs.set_initial("Cherry", "5").unwrap();
    }

    #[test]
    fn test_toggle_and_adjust() {
        let mut cs = fruit();
        cs.toggle("Date").unwrap();
        assert_eq!(cs.get_native("Date").unwrap(), Value::Bool(true));
        cs.toggle("Elder").unwrap();
        assert_eq!(cs.get_string("Elder").unwrap().as_deref(), Some("ask-no"));

        cs.plus_equals("Cherry", "10").unwrap();
        cs.minus_equals("Cherry", "1").unwrap();
        assert_eq!(cs.get_native("Cherry").unwrap(), Value::Number(12));

        assert_eq!(cs.toggle("Cherry").unwrap_err().kind(), ErrorKind::Code);
    }

    #[test]
    fn test_batch_registration_is_best_effort() {
        let mut cs = ConfigSet::with_builtin_types("test").unwrap();
        let err = cs
            .register_variables([
                VariableDef::number("Grape", 1),
                VariableDef::number("Grape", 2),
                VariableDef::synonym("Hazel", "Missing"),
                VariableDef::new("Ilama", TypeTag::new(20), Initial::None),
                VariableDef::string("Jackfruit", Some("ok")),
            ])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Code);
        assert!(err.to_string().contains("3 variable(s)"));

        assert_eq!(cs.get_string("Grape").unwrap().as_deref(), Some("1"));
        assert_eq!(cs.get_string("Jackfruit").unwrap().as_deref(), Some("ok"));
        assert!(cs.lookup("Hazel").is_none());
        assert!(cs.lookup("Ilama").is_none());
    }

    #[test]
    fn test_case_insensitive_names() {
        let mut cs = ConfigSet::builder("test")
            .capacity(16)
            .case_insensitive(true)
            .build();
        cs.register_types().unwrap();
        cs.register_variable(VariableDef::number("Kumquat", 1)).unwrap();
        cs.set_string("KUMQUAT", "2").unwrap();
        assert_eq!(cs.get_string("kumquat").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_overlay_promotes_and_resets() {
        let mut cs = fruit();
        let parent = cs.lookup("Cherry").unwrap();
        let overlay = cs.inherit(parent, "work:Cherry").unwrap();
        assert_eq!(cs.entry(overlay).unwrap().type_tag, 0);
        assert!(!cs.is_overridden(overlay).unwrap());

        let seen = recorder(&mut cs);
        let outcome = cs.set_string("work:Cherry", "3").unwrap();
        assert!(!outcome.is_no_change());
        assert!(cs.is_overridden(overlay).unwrap());
        assert_eq!(
            cs.entry(overlay).unwrap().type_tag,
            u32::from(TypeTag::NUMBER.raw())
        );

        cs.set_string("Cherry", "50").unwrap();
        assert_eq!(cs.get_string("work:Cherry").unwrap().as_deref(), Some("3"));

        let outcome = cs.reset("work:Cherry").unwrap();
        assert_eq!(outcome.status, Status::INHERITED);
        assert_eq!(cs.get_string("work:Cherry").unwrap().as_deref(), Some("50"));

        let outcome = cs.reset("work:Cherry").unwrap();
        assert_eq!(outcome.status, Status::INHERITED | Status::NO_CHANGE);

        let kinds: Vec<EventKind> = seen.borrow().iter().map(|(_, k)| *k).collect();
        assert_eq!(kinds, [EventKind::Set, EventKind::Set, EventKind::Reset]);
    }

    #[test]
    fn test_overlay_set_initial_refused() {
        let mut cs = fruit();
        let parent = cs.lookup("Cherry").unwrap();
        cs.inherit(parent, "work:Cherry").unwrap();
        let err = cs.set_initial("work:Cherry", "1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Code);
    }

    #[test]
    fn test_remove_overlay() {
        let mut cs = fruit();
        let parent = cs.lookup("Apple").unwrap();
        let overlay = cs.inherit(parent, "work:Apple").unwrap();
        cs.set_string("work:Apple", "teal").unwrap();

        let seen = recorder(&mut cs);
        cs.remove_overlay(overlay).unwrap();
        let kinds: Vec<EventKind> = seen.borrow().iter().map(|(_, k)| *k).collect();
        assert_eq!(kinds, [EventKind::Reset, EventKind::Deleted]);

        assert!(cs.lookup("work:Apple").is_none());
        assert!(cs.entry(overlay).is_err());
        assert!(cs.remove_overlay(parent).is_err());
    }

    #[test]
    fn test_remove_parent_overlay_reparents_children() {
        let mut cs = fruit();
        let global = cs.lookup("Cherry").unwrap();
        let account = cs.inherit(global, "ac:Cherry").unwrap();
        let mailbox = cs.inherit(account, "ac:mbox:Cherry").unwrap();
        cs.set_string("ac:Cherry", "7").unwrap();
        assert_eq!(cs.get_string("ac:mbox:Cherry").unwrap().as_deref(), Some("7"));

        cs.remove_overlay(account).unwrap();
        assert_eq!(cs.get_string("ac:mbox:Cherry").unwrap().as_deref(), Some("3"));
        cs.set_string("Cherry", "4").unwrap();
        assert_eq!(cs.get_string_by_handle(mailbox).unwrap().as_deref(), Some("4"));
        cs.remove_overlay(mailbox).unwrap();
    }

    fn refuse(_def: &VariableDef, _value: &Value) -> std::result::Result<Verdict, String> {
        Err("read-only".to_string())
    }

    #[test]
    fn test_rejecting_validator_still_registers() {
        let mut cs = fruit();
        cs.register_variable(VariableDef::string("Fennel", Some("seed")).with_validator(refuse))
            .unwrap();
        assert_eq!(cs.get_string("Fennel").unwrap().as_deref(), Some("seed"));

        let err = cs.set_string("Fennel", "bulb").unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::Validator));
        assert!(cs.reset("Fennel").unwrap().is_no_change());

        let err = cs.set_initial("Fennel", "frond").unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::Validator));
        assert_eq!(cs.get_string("Fennel").unwrap().as_deref(), Some("seed"));
    }

    #[test]
    fn test_names_sorted_without_synonyms() {
        let cs = fruit();
        assert_eq!(cs.names(), ["Apple", "Cherry", "Date", "Elder"]);
    }
}
