//! File and directory paths, with `~` expansion.

use std::path::Path;

use super::{ConfigType, Value, bad_initial, mismatch};
use crate::def::{Initial, VarFlags, VariableDef};
use crate::error::{Error, Result};

/// Expands a leading `~` or `~/` to the user's home directory.
///
/// Other text, including `~user`, is returned unchanged.
#[must_use]
pub fn expand_home(text: &str) -> String {
    let rest = match text.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return text.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{rest}", home.display()),
        None => text.to_string(),
    }
}

fn normalise(def: &VariableDef, text: &str) -> String {
    let mut path = expand_home(text);
    if def.flags.contains(VarFlags::PATH_DIR) {
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
    }
    path
}

/// Path type.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathType;

impl ConfigType for PathType {
    fn name(&self) -> &'static str {
        "path"
    }

    fn parse(&self, def: &VariableDef, text: &str) -> Result<Value> {
        if text.is_empty() {
            if def.flags.contains(VarFlags::NOT_EMPTY) {
                return Err(Error::bad_type(format!("Option {} may not be empty", def.name)));
            }
            return Ok(Value::Path(None));
        }
        if def.flags.contains(VarFlags::PATH_FILE) && text.ends_with('/') {
            return Err(Error::bad_type(format!(
                "Option {} must name a file, not a directory: {text}",
                def.name
            )));
        }
        Ok(Value::Path(Some(normalise(def, text))))
    }

    fn render(&self, def: &VariableDef, value: &Value) -> Result<Option<String>> {
        match value {
            Value::Path(p) => Ok(p.clone()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn check_native(&self, def: &VariableDef, value: &Value) -> Result<()> {
        match value {
            Value::Path(None) if def.flags.contains(VarFlags::NOT_EMPTY) => Err(
                Error::bad_type(format!("Option {} may not be empty", def.name)),
            ),
            Value::Path(Some(p)) if Path::new(p).as_os_str().is_empty() => {
                Err(Error::bad_type(format!("Option {} has an empty path", def.name)))
            }
            Value::Path(_) => Ok(()),
            other => Err(mismatch(def, self.name(), other)),
        }
    }

    fn initial_value(&self, def: &VariableDef) -> Result<Value> {
        match &def.initial {
            Initial::None => Ok(Value::Path(None)),
            Initial::Text(text) if text.is_empty() => Ok(Value::Path(None)),
            Initial::Text(text) => Ok(Value::Path(Some(normalise(def, text)))),
            Initial::Bool(_) | Initial::Number(_) => Err(bad_initial(def, self.name())),
        }
    }

    fn destroy(&self, storage: &mut Value, _def: &VariableDef) {
        *storage = Value::Path(None);
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

    #[test]
    fn test_expand_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let home = home.display().to_string();
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("~/Mail"), format!("{home}/Mail"));
        assert_eq!(expand_home("~bob/Mail"), "~bob/Mail");
        assert_eq!(expand_home("/var/mail"), "/var/mail");
    }

    #[test]
    fn test_directory_trailing_slash() {
        let def = VariableDef::path("Nectarine", None).with_flags(VarFlags::PATH_DIR);
        assert_eq!(
            PathType.parse(&def, "/var/mail//").unwrap(),
            Value::Path(Some("/var/mail".into()))
        );
        assert_eq!(
            PathType.parse(&def, "/").unwrap(),
            Value::Path(Some("/".into()))
        );
    }

    #[test]
    fn test_file_rejects_directory() {
        let def = VariableDef::path("Nectarine", None).with_flags(VarFlags::PATH_FILE);
        assert!(PathType.parse(&def, "/tmp/").is_err());
        assert!(PathType.parse(&def, "/tmp/file").is_ok());
    }

    #[test]
    fn test_empty_unsets() {
        let def = VariableDef::path("Nectarine", Some("/tmp"));
        let mut storage = PathType.initial_value(&def).unwrap();
        PathType.string_set(&mut storage, &def, "").unwrap();
        assert_eq!(PathType.string_get(&storage, &def).unwrap(), None);
    }
}
