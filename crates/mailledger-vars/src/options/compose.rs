//! Composing and sending.

use mailledger_config::{QuadOption, VarFlags, VariableDef};

use crate::validate;

/// Compose options.
#[must_use]
pub fn definitions() -> Vec<VariableDef> {
    vec![
        VariableDef::address("from", None)
            .with_validator(validate::sender_address)
            .with_docs("Default sender address"),
        VariableDef::string("real_name", None).with_docs("Name shown with the sender address"),
        VariableDef::path("signature", Some("~/.signature"))
            .with_flags(VarFlags::PATH_FILE)
            .with_docs("File appended to outgoing messages"),
        VariableDef::boolean("sig_dashes", true).with_docs("Put \"-- \" above the signature"),
        VariableDef::boolean("askcc", false).with_docs("Prompt for Cc recipients"),
        VariableDef::boolean("edit_headers", false)
            .with_docs("Let the editor change message headers"),
        VariableDef::quad("copy", QuadOption::Yes).with_docs("Save a copy of sent mail"),
        VariableDef::quad("postpone", QuadOption::AskYes)
            .with_docs("Postpone a message when leaving the composer"),
        VariableDef::quad("abort_unmodified", QuadOption::Yes)
            .with_docs("Abort if the message was not edited"),
        VariableDef::slist("send_charset", Some("us-ascii:iso-8859-1:utf-8"))
            .with_flags(VarFlags::SLIST_SEP_COLON | VarFlags::NOT_EMPTY)
            .with_validator(validate::charset_list)
            .with_docs("Charsets tried in order for outgoing mail"),
        VariableDef::string("attribution", Some("On %d, %n wrote:"))
            .with_docs("Line introducing a quoted reply"),
    ]
}
