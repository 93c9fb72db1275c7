//! Variable definitions.

use std::borrow::Cow;
use std::fmt;

use bitflags::bitflags;

use crate::types::{QuadOption, TypeTag, Value};

bitflags! {
    /// Per-variable behaviour flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VarFlags: u32 {
        /// Value is a secret; dumps may redact it.
        const SENSITIVE = 1 << 0;
        /// Strings may not be set to the empty string.
        const NOT_EMPTY = 1 << 1;
        /// Numbers may not be negative.
        const NOT_NEGATIVE = 1 << 2;
        /// Path names a directory.
        const PATH_DIR = 1 << 3;
        /// Path names a file.
        const PATH_FILE = 1 << 4;
        /// Regex is always case-sensitive (no smart case).
        const REGEX_MATCH_CASE = 1 << 5;
        /// Regex may be negated with a leading `!`.
        const REGEX_ALLOW_NOT = 1 << 6;
        /// Sort accepts the `reverse-` prefix.
        const SORT_REVERSE = 1 << 7;
        /// Sort accepts the `last-` prefix.
        const SORT_LAST = 1 << 8;
        /// List items are separated by commas.
        const SLIST_SEP_COMMA = 1 << 9;
        /// List items are separated by colons.
        const SLIST_SEP_COLON = 1 << 10;
        /// List items are separated by spaces (the default).
        const SLIST_SEP_SPACE = 1 << 11;
        /// List may hold the same item twice.
        const SLIST_ALLOW_DUPES = 1 << 12;
        /// List may hold empty items.
        const SLIST_ALLOW_EMPTY = 1 << 13;
        /// List items compare case-sensitively.
        const SLIST_CASE_SENSITIVE = 1 << 14;
        /// Variable is registered but hidden from dumps.
        const DISABLED = 1 << 15;
    }
}

/// A variable's declared default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initial {
    /// No default: the type's empty value.
    None,
    /// Boolean default.
    Bool(bool),
    /// Numeric default (also used for enum and sort codes).
    Number(i64),
    /// Textual default, parsed by the type.
    Text(Cow<'static, str>),
}

/// What a validator decided about a candidate value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Value is fine.
    Accept,
    /// Value is accepted but the user should be told something.
    Warn(String),
}

/// Pre-commit hook; `Err` vetoes the value with a message for the user.
pub type Validator = fn(&VariableDef, &Value) -> Result<Verdict, String>;

/// Name/code table used by enum and sort variables.
pub type Mapping = &'static [(&'static str, i32)];

/// Static description of one configuration variable.
#[derive(Clone)]
pub struct VariableDef {
    /// Variable name.
    pub name: Cow<'static, str>,
    /// Which registered type stores the value.
    pub type_tag: TypeTag,
    /// Behaviour flags.
    pub flags: VarFlags,
    /// Declared default.
    pub initial: Initial,
    /// Name/code table for enum and sort types.
    pub mapping: Option<Mapping>,
    /// Optional pre-commit hook.
    pub validator: Option<Validator>,
    /// Opaque UI redraw hints; stored, never interpreted.
    pub redraw: u32,
    /// One-line description.
    pub docs: &'static str,
}

impl fmt::Debug for VariableDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableDef")
            .field("name", &self.name)
            .field("type_tag", &self.type_tag)
            .field("flags", &self.flags)
            .field("initial", &self.initial)
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

impl VariableDef {
    /// Creates a definition with no flags, mapping or validator.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, type_tag: TypeTag, initial: Initial) -> Self {
        Self {
            name: name.into(),
            type_tag,
            flags: VarFlags::empty(),
            initial,
            mapping: None,
            validator: None,
            redraw: 0,
            docs: "",
        }
    }

    /// Boolean variable.
    #[must_use]
    pub fn boolean(name: impl Into<Cow<'static, str>>, initial: bool) -> Self {
        Self::new(name, TypeTag::BOOL, Initial::Bool(initial))
    }

    /// Quad-option variable.
    #[must_use]
    pub fn quad(name: impl Into<Cow<'static, str>>, initial: QuadOption) -> Self {
        Self::new(name, TypeTag::QUAD, Initial::Text(Cow::Borrowed(initial.as_str())))
    }

    /// 16-bit number variable.
    #[must_use]
    pub fn number(name: impl Into<Cow<'static, str>>, initial: i16) -> Self {
        Self::new(name, TypeTag::NUMBER, Initial::Number(i64::from(initial)))
    }

    /// 64-bit number variable.
    #[must_use]
    pub fn long(name: impl Into<Cow<'static, str>>, initial: i64) -> Self {
        Self::new(name, TypeTag::LONG, Initial::Number(initial))
    }

    /// String variable.
    #[must_use]
    pub fn string(name: impl Into<Cow<'static, str>>, initial: Option<&'static str>) -> Self {
        Self::new(name, TypeTag::STRING, text_initial(initial))
    }

    /// Path variable.
    #[must_use]
    pub fn path(name: impl Into<Cow<'static, str>>, initial: Option<&'static str>) -> Self {
        Self::new(name, TypeTag::PATH, text_initial(initial))
    }

    /// Enum variable.
    #[must_use]
    pub fn enumeration(
        name: impl Into<Cow<'static, str>>,
        mapping: Mapping,
        initial: &'static str,
    ) -> Self {
        let mut def = Self::new(name, TypeTag::ENUM, Initial::Text(Cow::Borrowed(initial)));
        def.mapping = Some(mapping);
        def
    }

    /// Sort variable.
    #[must_use]
    pub fn sort(name: impl Into<Cow<'static, str>>, mapping: Mapping, initial: &'static str) -> Self {
        let mut def = Self::new(name, TypeTag::SORT, Initial::Text(Cow::Borrowed(initial)));
        def.mapping = Some(mapping);
        def
    }

    /// Regex variable.
    #[must_use]
    pub fn regex(name: impl Into<Cow<'static, str>>, initial: Option<&'static str>) -> Self {
        Self::new(name, TypeTag::REGEX, text_initial(initial))
    }

    /// Email address variable.
    #[must_use]
    pub fn address(name: impl Into<Cow<'static, str>>, initial: Option<&'static str>) -> Self {
        Self::new(name, TypeTag::ADDRESS, text_initial(initial))
    }

    /// String list variable.
    #[must_use]
    pub fn slist(name: impl Into<Cow<'static, str>>, initial: Option<&'static str>) -> Self {
        Self::new(name, TypeTag::SLIST, text_initial(initial))
    }

    /// Character table variable.
    #[must_use]
    pub fn mbtable(name: impl Into<Cow<'static, str>>, initial: Option<&'static str>) -> Self {
        Self::new(name, TypeTag::MBTABLE, text_initial(initial))
    }

    /// Alias for another, already defined, variable.
    #[must_use]
    pub fn synonym(name: impl Into<Cow<'static, str>>, target: &'static str) -> Self {
        Self::new(name, TypeTag::SYNONYM, Initial::Text(Cow::Borrowed(target)))
    }

    /// Adds flags.
    #[must_use]
    pub fn with_flags(mut self, flags: VarFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Sets the validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Sets the opaque redraw hints.
    #[must_use]
    pub const fn with_redraw(mut self, redraw: u32) -> Self {
        self.redraw = redraw;
        self
    }

    /// Sets the description.
    #[must_use]
    pub const fn with_docs(mut self, docs: &'static str) -> Self {
        self.docs = docs;
        self
    }

    /// Returns true if the variable holds a secret.
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        self.flags.contains(VarFlags::SENSITIVE)
    }
}

fn text_initial(initial: Option<&'static str>) -> Initial {
    initial.map_or(Initial::None, |s| Initial::Text(Cow::Borrowed(s)))
}
