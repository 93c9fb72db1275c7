//! Message index display.

use mailledger_config::{Mapping, VarFlags, VariableDef};

use crate::redraw;

/// Sort methods for the message index.
pub const SORT_METHODS: Mapping = &[
    ("date", 1),
    ("size", 2),
    ("subject", 3),
    ("from", 4),
    ("order", 5),
    ("threads", 6),
    ("to", 7),
    ("score", 8),
    ("spam", 9),
    ("label", 10),
];

/// Index options.
#[must_use]
pub fn definitions() -> Vec<VariableDef> {
    vec![
        VariableDef::sort("sort", SORT_METHODS, "date")
            .with_flags(VarFlags::SORT_REVERSE | VarFlags::SORT_LAST)
            .with_redraw(redraw::INDEX | redraw::RESORT)
            .with_docs("Order of the message index"),
        VariableDef::sort("sort_aux", SORT_METHODS, "date")
            .with_flags(VarFlags::SORT_REVERSE | VarFlags::SORT_LAST)
            .with_redraw(redraw::INDEX | redraw::RESORT)
            .with_docs("Secondary order for equal messages"),
        VariableDef::string("index_format", Some("%4C %Z %{%b %d} %-15.15L (%4l) %s"))
            .with_flags(VarFlags::NOT_EMPTY)
            .with_redraw(redraw::INDEX)
            .with_docs("Format of index lines"),
        VariableDef::mbtable("to_chars", Some(" +TCFLR"))
            .with_redraw(redraw::INDEX)
            .with_docs("Flags showing how you were addressed"),
        VariableDef::regex("reply_regex", Some("^((re|aw|sv)(\\[[0-9]+\\])*:[ \t]*)*"))
            .with_redraw(redraw::INDEX | redraw::RETHREAD)
            .with_docs("Subject prefixes marking a reply"),
        VariableDef::regex("quote_regex", Some("^([ \t]*[|>:}#])+"))
            .with_flags(VarFlags::REGEX_MATCH_CASE)
            .with_redraw(redraw::PAGER)
            .with_docs("Lines treated as quoted text"),
    ]
}
