//! Option definitions, grouped by the part of the client that reads them.

pub mod compose;
pub mod general;
pub mod index;
pub mod network;

use mailledger_config::VariableDef;

/// Old names kept working for existing config files.
#[must_use]
pub fn synonyms() -> Vec<VariableDef> {
    vec![
        VariableDef::synonym("edit_hdrs", "edit_headers"),
        VariableDef::synonym("print_cmd", "print_command"),
        VariableDef::synonym("realname", "real_name"),
        VariableDef::synonym("spoolfile", "spool_file"),
    ]
}
