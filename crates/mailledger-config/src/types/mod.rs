//! Config value types.
//!
//! Every variable names a [`TypeTag`]; the [`TypeRegistry`] maps that tag to a
//! [`ConfigType`] descriptor which knows how to parse, render, validate and
//! store values of that kind. The engine never looks inside a [`Value`]
//! itself, so a new kind can be added by registering another descriptor.
//!
//! Descriptors implement a handful of primitives (`parse`, `render`,
//! `check_native`, `initial_value`); the operations the engine calls
//! (`string_set`, `native_set`, `reset`, ...) are provided on top of them and
//! share one commit path:
//!
//! 1. build the candidate value,
//! 2. stop with [`Status::NO_CHANGE`] if it equals the stored value,
//! 3. run the variable's validator,
//! 4. `destroy` the old value and store the candidate.
//!
//! Nothing is written unless every step succeeds.

mod address;
mod boolean;
mod enumeration;
mod long;
mod mbtable;
mod number;
mod path;
mod pattern;
mod quad;
mod slist;
mod sort;
mod string;

use std::fmt;

pub use address::{Address, AddressType};
pub use boolean::BoolType;
pub use enumeration::EnumType;
pub use long::LongType;
pub use mbtable::{MbTable, MbTableType};
pub use number::NumberType;
pub use path::PathType;
pub use pattern::{RegexType, RegexValue};
pub use quad::{QuadOption, QuadType};
pub use slist::{Slist, SlistType};
pub use sort::{SortType, SortValue};
pub use string::StringType;

use crate::def::{Initial, Verdict, VariableDef};
use crate::error::{Error, Outcome, Result, Status};

/// Number of type tags the registry can hold.
pub const MAX_TYPES: usize = 32;

/// Small integer naming a value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(u8);

impl TypeTag {
    /// No type; an overlay that has not been overridden.
    pub const NONE: Self = Self(0);
    /// Boolean.
    pub const BOOL: Self = Self(1);
    /// 16-bit number.
    pub const NUMBER: Self = Self(2);
    /// String.
    pub const STRING: Self = Self(3);
    /// Path with `~` expansion.
    pub const PATH: Self = Self(4);
    /// Quad-option.
    pub const QUAD: Self = Self(5);
    /// Enum.
    pub const ENUM: Self = Self(6);
    /// Sort order.
    pub const SORT: Self = Self(7);
    /// Regular expression.
    pub const REGEX: Self = Self(8);
    /// Email address.
    pub const ADDRESS: Self = Self(9);
    /// String list.
    pub const SLIST: Self = Self(10);
    /// Character table.
    pub const MBTABLE: Self = Self(11);
    /// 64-bit number.
    pub const LONG: Self = Self(12);
    /// Alias for another variable. Never bound in the registry.
    pub const SYNONYM: Self = Self(31);

    /// Creates a tag from its raw value.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-memory representation of a config value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Quad-option.
    Quad(QuadOption),
    /// 16-bit number.
    Number(i16),
    /// 64-bit number.
    Long(i64),
    /// String; `None` when unset.
    String(Option<String>),
    /// Expanded path; `None` when unset.
    Path(Option<String>),
    /// Enum code.
    Enum(i32),
    /// Sort order.
    Sort(SortValue),
    /// Compiled regex; `None` when unset.
    Regex(Option<RegexValue>),
    /// Address; `None` when unset.
    Address(Option<Address>),
    /// String list; may be empty.
    Slist(Slist),
    /// Character table; `None` when unset.
    MbTable(Option<MbTable>),
}

impl Value {
    /// Short name of the variant, for messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Quad(_) => "quad",
            Self::Number(_) => "number",
            Self::Long(_) => "long",
            Self::String(_) => "string",
            Self::Path(_) => "path",
            Self::Enum(_) => "enum",
            Self::Sort(_) => "sort",
            Self::Regex(_) => "regex",
            Self::Address(_) => "address",
            Self::Slist(_) => "slist",
            Self::MbTable(_) => "mbtable",
        }
    }

    /// Returns true for unset values and empty lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(v) | Self::Path(v) => v.is_none(),
            Self::Regex(v) => v.is_none(),
            Self::Address(v) => v.is_none(),
            Self::MbTable(v) => v.is_none(),
            Self::Slist(list) => list.is_empty(),
            Self::Bool(_)
            | Self::Quad(_)
            | Self::Number(_)
            | Self::Long(_)
            | Self::Enum(_)
            | Self::Sort(_) => false,
        }
    }
}

/// Operations for one kind of config value.
///
/// Implementors supply the primitives; the engine calls the provided
/// operations, which validate before committing.
pub trait ConfigType {
    /// Type name, as shown in dumps.
    fn name(&self) -> &'static str;

    /// Parses user text into a value.
    ///
    /// # Errors
    ///
    /// `InvalidValue` with [`Rejection::BadType`](crate::Rejection::BadType)
    /// if the text is not valid for this type.
    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value>;

    /// Renders a value as text; `None` if the value is unset.
    ///
    /// # Errors
    ///
    /// `Code` if the value is not of this type.
    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>>;

    /// Checks that a programmatic value is valid for this variable.
    ///
    /// # Errors
    ///
    /// `Code` for a value of the wrong kind, `InvalidValue` if out of range.
    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()>;

    /// Builds the variable's default value from its [`Initial`].
    ///
    /// # Errors
    ///
    /// `Code` if the initial is of a form this type cannot use.
    fn initial_value(&self, def: &VariableDef) -> Result<Value>;

    /// Parses `text` and stores it.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse); also fails if the validator rejects.
    fn string_set(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        let candidate = self.parse(def, text)?;
        commit(self, storage, def, candidate)
    }

    /// Parses `text` and makes it the variable's default.
    ///
    /// The live value is untouched; callers reset afterwards.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    fn string_set_initial(&self, def: &mut VariableDef, text: &str) -> Result<()> {
        self.parse(def, text)?;
        def.initial = Initial::Text(text.to_string().into());
        Ok(())
    }

    /// Renders the stored value.
    ///
    /// # Errors
    ///
    /// See [`render`](Self::render).
    fn string_get(&self, storage: &Value, def: &VariableDef) -> Result<Option<String>> {
        self.render(def, storage)
    }

    /// Stores a programmatic value.
    ///
    /// # Errors
    ///
    /// See [`check_native`](Self::check_native); also fails if the validator
    /// rejects.
    fn native_set(&self, storage: &mut Value, def: &VariableDef, value: Value) -> Result<Outcome> {
        self.check_native(def, &value)?;
        commit(self, storage, def, value)
    }

    /// Returns a copy of the stored value.
    ///
    /// # Errors
    ///
    /// `Code` if the stored value is not of this type.
    fn native_get(&self, storage: &Value, def: &VariableDef) -> Result<Value> {
        self.check_native(def, storage)?;
        Ok(storage.clone())
    }

    /// Restores the variable's default. The validator is not consulted.
    ///
    /// # Errors
    ///
    /// Fails if the default cannot be built.
    fn reset(&self, storage: &mut Value, def: &VariableDef) -> Result<Outcome> {
        let candidate = self.initial_value(def)?;
        Ok(install(self, storage, def, candidate))
    }

    /// Releases whatever the stored value owns. Called before every
    /// overwrite. Plain value types need not override this.
    fn destroy(&self, storage: &mut Value, def: &VariableDef) {
        let _ = (storage, def);
    }

    /// `set name += text`.
    ///
    /// # Errors
    ///
    /// `Code` for types without an append operation.
    fn plus_equals(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        let _ = (storage, text);
        Err(Error::code(format!(
            "Option {} of type {} does not support +=",
            def.name,
            self.name()
        )))
    }

    /// `set name -= text`.
    ///
    /// # Errors
    ///
    /// `Code` for types without a remove operation.
    fn minus_equals(&self, storage: &mut Value, def: &VariableDef, text: &str) -> Result<Outcome> {
        let _ = (storage, text);
        Err(Error::code(format!(
            "Option {} of type {} does not support -=",
            def.name,
            self.name()
        )))
    }

    /// Flips a two-state value.
    ///
    /// # Errors
    ///
    /// `Code` for types that cannot be toggled.
    fn toggle(&self, storage: &mut Value, def: &VariableDef) -> Result<Outcome> {
        let _ = storage;
        Err(Error::code(format!(
            "Option {} of type {} cannot be toggled",
            def.name,
            self.name()
        )))
    }
}

/// Runs the variable's validator against a candidate.
///
/// # Errors
///
/// `InvalidValue` attributed to the validator if it vetoes.
pub fn validate(def: &VariableDef, candidate: &Value) -> Result<Outcome> {
    let Some(validator) = def.validator else {
        return Ok(Outcome::success());
    };
    match validator(def, candidate) {
        Ok(Verdict::Accept) => Ok(Outcome::success()),
        Ok(Verdict::Warn(message)) => Ok(Outcome::warning(message)),
        Err(message) => Err(Error::validator(message)),
    }
}

/// Shared commit path: no-change check, validator, destroy, store.
pub(crate) fn commit<T: ConfigType + ?Sized>(
    ty: &T,
    storage: &mut Value,
    def: &VariableDef,
    candidate: Value,
) -> Result<Outcome> {
    if *storage == candidate {
        return Ok(Outcome::with(Status::NO_CHANGE));
    }
    let outcome = validate(def, &candidate)?;
    Ok(store(ty, storage, def, candidate, outcome))
}

/// Stores a default without asking the validator.
pub(crate) fn install<T: ConfigType + ?Sized>(
    ty: &T,
    storage: &mut Value,
    def: &VariableDef,
    candidate: Value,
) -> Outcome {
    if *storage == candidate {
        return Outcome::with(Status::NO_CHANGE);
    }
    store(ty, storage, def, candidate, Outcome::success())
}

fn store<T: ConfigType + ?Sized>(
    ty: &T,
    storage: &mut Value,
    def: &VariableDef,
    candidate: Value,
    mut outcome: Outcome,
) -> Outcome {
    ty.destroy(storage, def);
    *storage = candidate;
    if storage.is_empty() {
        outcome.status |= Status::EMPTY;
    }
    outcome
}

/// Error for a value of the wrong kind reaching a descriptor.
pub(crate) fn mismatch(def: &VariableDef, expected: &str, value: &Value) -> Error {
    Error::code(format!(
        "Option {} expects a {expected} value, got {}",
        def.name,
        value.kind_name()
    ))
}

/// Error for an [`Initial`] of a form the type cannot use.
pub(crate) fn bad_initial(def: &VariableDef, type_name: &str) -> Error {
    Error::code(format!(
        "Option {} has an initial value unusable for type {type_name}",
        def.name
    ))
}

/// Fixed-size table binding type tags to descriptors.
pub struct TypeRegistry {
    slots: [Option<Box<dyn ConfigType>>; MAX_TYPES],
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.slots
                    .iter()
                    .enumerate()
                    .filter_map(|(i, s)| s.as_ref().map(|t| (i, t.name()))),
            )
            .finish()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a descriptor to a tag.
    ///
    /// # Errors
    ///
    /// `Code` if the tag is reserved, out of range, or already bound. The
    /// existing binding is left intact.
    pub fn register(&mut self, tag: TypeTag, ty: Box<dyn ConfigType>) -> Result<()> {
        let index = usize::from(tag.raw());
        if tag == TypeTag::NONE || tag == TypeTag::SYNONYM || index >= MAX_TYPES {
            return Err(Error::code(format!("Type tag {tag} cannot be registered")));
        }
        if let Some(existing) = &self.slots[index] {
            return Err(Error::code(format!(
                "Type tag {tag} is already registered to {}",
                existing.name()
            )));
        }
        tracing::debug!(tag = tag.raw(), kind = ty.name(), "Registered config type");
        self.slots[index] = Some(ty);
        Ok(())
    }

    /// Looks up the descriptor for a tag.
    #[must_use]
    pub fn get(&self, tag: TypeTag) -> Option<&dyn ConfigType> {
        self.slots.get(usize::from(tag.raw()))?.as_deref()
    }

    /// Registers every built-in type.
    ///
    /// # Errors
    ///
    /// `Code` if any built-in tag is already bound.
    pub fn register_builtins(&mut self) -> Result<()> {
        self.register(TypeTag::BOOL, Box::new(BoolType))?;
        self.register(TypeTag::NUMBER, Box::new(NumberType))?;
        self.register(TypeTag::STRING, Box::new(StringType))?;
        self.register(TypeTag::PATH, Box::new(PathType))?;
        self.register(TypeTag::QUAD, Box::new(QuadType))?;
        self.register(TypeTag::ENUM, Box::new(EnumType))?;
        self.register(TypeTag::SORT, Box::new(SortType))?;
        self.register(TypeTag::REGEX, Box::new(RegexType))?;
        self.register(TypeTag::ADDRESS, Box::new(AddressType))?;
        self.register(TypeTag::SLIST, Box::new(SlistType))?;
        self.register(TypeTag::MBTABLE, Box::new(MbTableType))?;
        self.register(TypeTag::LONG, Box::new(LongType))?;
        Ok(())
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
    use crate::error::{ErrorKind, Rejection};

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeTag::BOOL, Box::new(BoolType)).unwrap();
        assert_eq!(registry.get(TypeTag::BOOL).unwrap().name(), "boolean");
        assert!(registry.get(TypeTag::NUMBER).is_none());
    }

    #[test]
    fn test_second_registration_keeps_first() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeTag::BOOL, Box::new(BoolType)).unwrap();

        let err = registry
            .register(TypeTag::BOOL, Box::new(NumberType))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Code);

        let ty = registry.get(TypeTag::BOOL).unwrap();
        let def = VariableDef::boolean("Apple", true);
        assert_eq!(
            ty.string_get(&Value::Bool(true), &def).unwrap().as_deref(),
            Some("yes")
        );
    }

    #[test]
    fn test_reserved_tags_rejected() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register(TypeTag::NONE, Box::new(BoolType)).is_err());
        assert!(registry.register(TypeTag::SYNONYM, Box::new(BoolType)).is_err());
        assert!(registry.register(TypeTag::new(200), Box::new(BoolType)).is_err());
        assert!(registry.get(TypeTag::new(200)).is_none());
    }

    #[test]
    fn test_builtins_registered_once() {
        let mut registry = TypeRegistry::new();
        registry.register_builtins().unwrap();
        assert!(registry.get(TypeTag::SLIST).is_some());
        assert!(registry.register_builtins().is_err());
    }

    #[test]
    fn test_commit_no_change() {
        let def = VariableDef::number("Damson", 3);
        let mut storage = Value::Number(3);
        let outcome = NumberType.string_set(&mut storage, &def, "3").unwrap();
        assert!(outcome.is_no_change());
    }

    fn reject_all(_def: &VariableDef, _value: &Value) -> std::result::Result<Verdict, String> {
        Err("nope".to_string())
    }

    fn warn_all(_def: &VariableDef, _value: &Value) -> std::result::Result<Verdict, String> {
        Ok(Verdict::Warn("are you sure?".to_string()))
    }

    #[test]
    fn test_validator_veto_keeps_value() {
        let def = VariableDef::string("Elder", Some("old")).with_validator(reject_all);
        let mut storage = Value::String(Some("old".into()));

        let err = StringType.string_set(&mut storage, &def, "new").unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::Validator));
        assert_eq!(err.to_string(), "nope");
        assert_eq!(storage, Value::String(Some("old".into())));

        let err = StringType
            .native_set(&mut storage, &def, Value::String(Some("new".into())))
            .unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::Validator));
        assert_eq!(storage, Value::String(Some("old".into())));
    }

    #[test]
    fn test_reset_skips_validator() {
        let def = VariableDef::string("Elder", Some("old")).with_validator(reject_all);
        let mut storage = Value::String(Some("changed".into()));
        let outcome = StringType.reset(&mut storage, &def).unwrap();
        assert!(!outcome.is_no_change());
        assert_eq!(storage, Value::String(Some("old".into())));
    }

    #[test]
    fn test_validator_warning_commits() {
        let def = VariableDef::number("Fig", 1).with_validator(warn_all);
        let mut storage = Value::Number(1);
        let outcome = NumberType.string_set(&mut storage, &def, "2").unwrap();
        assert!(outcome.status.contains(Status::WARNING));
        assert_eq!(outcome.message.as_deref(), Some("are you sure?"));
        assert_eq!(storage, Value::Number(2));
    }

    #[test]
    fn test_empty_status_reported() {
        let def = VariableDef::string("Guava", Some("x"));
        let mut storage = Value::String(Some("x".into()));
        let outcome = StringType.string_set(&mut storage, &def, "").unwrap();
        assert!(outcome.status.contains(Status::EMPTY));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_unsupported_operations_are_code_errors() {
        let def = VariableDef::boolean("Hazel", false);
        let mut storage = Value::Bool(false);
        let err = BoolType.plus_equals(&mut storage, &def, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Code);
        let def = VariableDef::number("Ilama", 0);
        let err = NumberType.toggle(&mut Value::Number(0), &def).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Code);
    }
}
