//! # mailledger-vars
//!
//! The MailLedger option catalogue: every user-facing setting, its type,
//! default and validation rules, ready to load into a
//! [`ConfigSet`](mailledger_config::ConfigSet).
//!
//! ## Quick Start
//!
//! ```ignore
//! let mut cs = mailledger_vars::config_set("main")?;
//! cs.set_string("sort", "reverse-date")?;
//!
//! let account = mailledger_config::Account::new(&mut cs, "work", mailledger_vars::ACCOUNT_VARS)?;
//! ```
//!
//! ## Modules
//!
//! - [`options`]: Option definitions, grouped by area
//! - [`validate`]: Validators shared by several options
//! - [`redraw`]: Redraw hints attached to options

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod options;
pub mod redraw;
pub mod validate;

use mailledger_config::{ConfigSet, Result, VariableDef};

/// Variables an account may override.
pub const ACCOUNT_VARS: &[&str] = &[
    "folder",
    "spool_file",
    "record",
    "postponed",
    "from",
    "real_name",
    "signature",
    "imap_user",
    "imap_pass",
    "smtp_url",
    "smtp_pass",
    "sort",
    "index_format",
    "mail_check",
];

/// Variables a mailbox may override. Each is also an account variable.
pub const MAILBOX_VARS: &[&str] = &["sort", "index_format", "signature", "mail_check"];

/// Every option definition, synonyms last.
#[must_use]
pub fn definitions() -> Vec<VariableDef> {
    let mut defs = Vec::new();
    defs.extend(options::general::definitions());
    defs.extend(options::compose::definitions());
    defs.extend(options::index::definitions());
    defs.extend(options::network::definitions());
    defs.extend(options::synonyms());
    defs
}

/// Builds a config set holding the whole catalogue.
///
/// # Errors
///
/// Fails if a type or option cannot be registered.
pub fn config_set(name: &str) -> Result<ConfigSet> {
    let mut cs = ConfigSet::with_builtin_types(name)?;
    cs.register_variables(definitions())?;
    tracing::debug!(count = cs.len(), "Loaded option catalogue");
    Ok(cs)
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
    use mailledger_config::{Account, ErrorKind};

    use super::*;

    #[test]
    fn test_catalogue_registers_cleanly() {
        let cs = config_set("test").unwrap();
        assert_eq!(cs.len(), definitions().len());
    }

    #[test]
    fn test_names_unique() {
        let mut names: Vec<String> = definitions().iter().map(|d| d.name.to_string()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_scope_lists_are_registered() {
        let mut cs = config_set("test").unwrap();
        let mut account = Account::new(&mut cs, "work", ACCOUNT_VARS).unwrap();
        account.add_mailbox(&mut cs, "INBOX", MAILBOX_VARS).unwrap();
        assert_eq!(
            cs.get_string("work:INBOX:sort").unwrap().as_deref(),
            Some("date")
        );
        account.free(&mut cs).unwrap();
    }

    #[test]
    fn test_synonyms_resolve() {
        let mut cs = config_set("test").unwrap();
        cs.set_string("edit_hdrs", "yes").unwrap();
        assert_eq!(cs.get_string("edit_headers").unwrap().as_deref(), Some("yes"));
        assert_eq!(
            cs.get_string("realname").unwrap(),
            cs.get_string("real_name").unwrap()
        );
    }

    #[test]
    fn test_sensitive_options() {
        let cs = config_set("test").unwrap();
        for name in ["imap_pass", "smtp_pass", "smtp_url"] {
            assert!(cs.definition(name).unwrap().is_sensitive(), "{name}");
        }
        assert!(!cs.definition("from").unwrap().is_sensitive());
        assert_eq!(
            cs.definition("nosuch").unwrap_err().kind(),
            ErrorKind::UnknownVariable
        );
    }
}
