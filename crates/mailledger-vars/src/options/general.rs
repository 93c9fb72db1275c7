//! Mail storage and general behaviour.

use mailledger_config::{Mapping, VarFlags, VariableDef};

use crate::{redraw, validate};

/// Mailbox formats for new folders.
pub const MBOX_TYPES: Mapping = &[("mbox", 1), ("mmdf", 2), ("mh", 3), ("maildir", 4)];

/// General options.
#[must_use]
pub fn definitions() -> Vec<VariableDef> {
    vec![
        VariableDef::path("folder", Some("~/Mail"))
            .with_flags(VarFlags::PATH_DIR)
            .with_docs("Default location of mailboxes"),
        VariableDef::path("spool_file", None).with_docs("Where new mail arrives"),
        VariableDef::path("record", Some("~/sent")).with_docs("Folder for sent mail"),
        VariableDef::path("postponed", Some("~/postponed"))
            .with_docs("Folder for postponed messages"),
        VariableDef::enumeration("mbox_type", MBOX_TYPES, "mbox")
            .with_docs("Format of newly created mailboxes"),
        VariableDef::number("timeout", 600)
            .with_flags(VarFlags::NOT_NEGATIVE)
            .with_validator(validate::zero_disables)
            .with_docs("Seconds of idle time before checking for mail"),
        VariableDef::number("mail_check", 5)
            .with_flags(VarFlags::NOT_NEGATIVE)
            .with_validator(validate::zero_disables)
            .with_redraw(redraw::STATUS)
            .with_docs("Seconds between mailbox scans"),
        VariableDef::string("pager", Some("builtin"))
            .with_flags(VarFlags::NOT_EMPTY)
            .with_redraw(redraw::PAGER)
            .with_docs("Program used to view messages"),
        VariableDef::number("pager_index_lines", 0)
            .with_flags(VarFlags::NOT_NEGATIVE)
            .with_redraw(redraw::PAGER | redraw::INDEX)
            .with_docs("Index lines shown above the pager"),
        VariableDef::string("print_command", Some("lpr"))
            .with_docs("Command used to print messages"),
        VariableDef::long("header_cache_pagesize", 16384)
            .with_flags(VarFlags::NOT_NEGATIVE)
            .with_docs("Page size of the header cache"),
    ]
}
