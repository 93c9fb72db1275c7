//! Validators shared by several options.

use mailledger_config::types::Address;
use mailledger_config::{Value, VariableDef, Verdict};

/// Requires the address to have a domain; warns if the domain has no dot.
///
/// # Errors
///
/// A message for the user if the address has no domain.
pub fn sender_address(def: &VariableDef, value: &Value) -> Result<Verdict, String> {
    let Value::Address(Some(Address { mailbox, .. })) = value else {
        return Ok(Verdict::Accept);
    };
    let Some((_, domain)) = mailbox.split_once('@') else {
        return Err(format!("Option {}: address {mailbox} needs a domain", def.name));
    };
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Ok(Verdict::Warn(format!(
            "Option {}: domain {domain} looks incomplete",
            def.name
        )));
    }
    Ok(Verdict::Accept)
}

/// Requires every charset name to be plain ASCII (letters, digits, `-`,
/// `_`, `.`, `:`).
///
/// # Errors
///
/// A message naming the first bad charset.
pub fn charset_list(def: &VariableDef, value: &Value) -> Result<Verdict, String> {
    let Value::Slist(list) = value else {
        return Ok(Verdict::Accept);
    };
    for charset in list.items() {
        let ok = charset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
        if !ok {
            return Err(format!("Option {}: invalid charset {charset}", def.name));
        }
    }
    Ok(Verdict::Accept)
}

/// Requires an `smtp://` or `smtps://` URL.
///
/// # Errors
///
/// A message if the scheme is missing or wrong.
pub fn smtp_url(def: &VariableDef, value: &Value) -> Result<Verdict, String> {
    let Value::String(Some(url)) = value else {
        return Ok(Verdict::Accept);
    };
    if url.starts_with("smtp://") || url.starts_with("smtps://") {
        Ok(Verdict::Accept)
    } else {
        Err(format!("Option {} must be an smtp:// or smtps:// URL", def.name))
    }
}

/// Warns that zero turns the feature off.
///
/// # Errors
///
/// Never fails.
pub fn zero_disables(def: &VariableDef, value: &Value) -> Result<Verdict, String> {
    match value {
        Value::Number(0) => Ok(Verdict::Warn(format!("Option {} is now disabled", def.name))),
        _ => Ok(Verdict::Accept),
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
    use mailledger_config::types::Slist;

    use super::*;

    fn address(text: &str) -> Value {
        Value::Address(Some(Address::parse(text).unwrap()))
    }

    #[test]
    fn test_sender_address() {
        let def = VariableDef::address("from", None);
        assert_eq!(
            sender_address(&def, &address("joe@example.com")),
            Ok(Verdict::Accept)
        );
        assert!(matches!(
            sender_address(&def, &address("joe@localhost")),
            Ok(Verdict::Warn(_))
        ));
        assert!(sender_address(&def, &address("joe")).is_err());
        assert_eq!(sender_address(&def, &Value::Address(None)), Ok(Verdict::Accept));
    }

    #[test]
    fn test_charset_list() {
        let def = VariableDef::slist("send_charset", None);
        let good: Slist = ["us-ascii", "utf-8"].into_iter().collect();
        assert_eq!(charset_list(&def, &Value::Slist(good)), Ok(Verdict::Accept));
        let bad: Slist = ["utf 8"].into_iter().collect();
        assert!(charset_list(&def, &Value::Slist(bad)).is_err());
    }

    #[test]
    fn test_smtp_url() {
        let def = VariableDef::string("smtp_url", None);
        let url = |s: &str| Value::String(Some(s.to_string()));
        assert!(smtp_url(&def, &url("smtps://mail.example.com:465")).is_ok());
        assert!(smtp_url(&def, &url("imap://mail.example.com")).is_err());
        assert!(smtp_url(&def, &Value::String(None)).is_ok());
    }

    #[test]
    fn test_zero_disables() {
        let def = VariableDef::number("mail_check", 5);
        assert!(matches!(
            zero_disables(&def, &Value::Number(0)),
            Ok(Verdict::Warn(_))
        ));
        assert_eq!(zero_disables(&def, &Value::Number(3)), Ok(Verdict::Accept));
    }
}
