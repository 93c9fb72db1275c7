//! IMAP and SMTP connections.

use mailledger_config::{VarFlags, VariableDef};

use crate::validate;

/// Network options.
#[must_use]
pub fn definitions() -> Vec<VariableDef> {
    vec![
        VariableDef::number("connect_timeout", 30)
            .with_docs("Seconds to wait for a connection; negative waits forever"),
        VariableDef::string("imap_user", None).with_docs("IMAP login name"),
        VariableDef::string("imap_pass", None)
            .with_flags(VarFlags::SENSITIVE)
            .with_docs("IMAP password"),
        VariableDef::number("imap_keepalive", 300)
            .with_flags(VarFlags::NOT_NEGATIVE)
            .with_validator(validate::zero_disables)
            .with_docs("Seconds between keepalive commands"),
        VariableDef::string("smtp_url", None)
            .with_flags(VarFlags::SENSITIVE)
            .with_validator(validate::smtp_url)
            .with_docs("SMTP server URL; may embed credentials"),
        VariableDef::string("smtp_pass", None)
            .with_flags(VarFlags::SENSITIVE)
            .with_docs("SMTP password"),
        VariableDef::boolean("ssl_force_tls", true)
            .with_docs("Refuse unencrypted connections"),
    ]
}
