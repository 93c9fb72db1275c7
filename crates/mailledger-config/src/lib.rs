//! # mailledger-config
//!
//! Typed, hierarchical configuration registry for the MailLedger email
//! client.
//!
//! ## Features
//!
//! - **Pluggable types**: each variable names a type tag; a [`TypeRegistry`]
//!   maps tags to [`ConfigType`] descriptors that parse, render, validate and
//!   store values
//! - **Twelve built-in types**: boolean, quad-option, number, long, string,
//!   path, enum, sort, regex, address, string list and character table
//! - **Validation before commit**: a rejected value never replaces the
//!   stored one
//! - **Synonyms** for renamed options
//! - **Scopes**: accounts and mailboxes shadow chosen variables and fall back
//!   to their parent until overridden
//! - **Change notifications** after every effective mutation
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailledger_config::{Account, ConfigSet, VariableDef};
//!
//! let mut cs = ConfigSet::with_builtin_types("main")?;
//! cs.register_variables([
//!     VariableDef::number("timeout", 600),
//!     VariableDef::string("signature", None),
//! ])?;
//!
//! cs.set_string("timeout", "30")?;
//! assert_eq!(cs.get_string("timeout")?.as_deref(), Some("30"));
//!
//! let work = Account::new(&mut cs, "work", &["signature"])?;
//! cs.set_string("work:signature", "-- \nSent from work")?;
//! work.free(&mut cs)?;
//! ```
//!
//! ## Modules
//!
//! - [`hash`]: Fixed-capacity chained hash table
//! - [`types`]: Type tags, descriptors and built-in types
//! - [`set`]: The config set
//! - [`subset`] and [`account`]: Inheritance scopes
//! - [`dump`]: Sorted dumps with redaction

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod def;
pub mod dump;
mod error;
pub mod hash;
pub mod inherit;
pub mod notify;
pub mod set;
pub mod subset;
pub mod types;

pub use account::Account;
pub use def::{Initial, Mapping, Validator, VarFlags, VariableDef, Verdict};
pub use dump::{DumpEntry, DumpFlags, REDACTED, dump_config, dump_entries};
pub use error::{Error, ErrorKind, Outcome, Rejection, Result, Status};
pub use hash::{Handle, HashFlags, HashKey, HashTable};
pub use inherit::{Inheritance, OverlayState};
pub use notify::{ConfigEvent, EventKind, Flow, Listener, ListenerId};
pub use set::{ConfigEntry, ConfigSet, ConfigSetBuilder};
pub use subset::{ConfigSubset, ScopeLevel};
pub use types::{ConfigType, QuadOption, TypeRegistry, TypeTag, Value};
