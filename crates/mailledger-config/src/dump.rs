//! Dumping a config set for display or export.

use bitflags::bitflags;
use serde::Serialize;

use crate::def::VarFlags;
use crate::error::{Error, Result};
use crate::set::{ConfigEntry, ConfigSet};

/// Shown instead of a sensitive value.
pub const REDACTED: &str = "***";

bitflags! {
    /// Dump options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DumpFlags: u8 {
        /// Print [`REDACTED`] for sensitive variables without rendering them.
        const HIDE_SENSITIVE = 1 << 0;
        /// Only variables whose value differs from the default.
        const ONLY_CHANGED = 1 << 1;
        /// Include each variable's default.
        const SHOW_DEFAULTS = 1 << 2;
        /// Include scope overlays as well as global variables.
        const SHOW_OVERLAYS = 1 << 3;
    }
}

/// One line of a dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpEntry {
    /// Full name.
    pub name: String,
    /// Type name.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Rendered value; `None` if unset.
    pub value: Option<String>,
    /// Rendered default, with [`DumpFlags::SHOW_DEFAULTS`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    /// True for scope overlays.
    pub overlay: bool,
    /// True if the value differs from the default (or the overlay is
    /// overridden).
    pub changed: bool,
}

/// Collects dump entries, sorted by name.
///
/// Synonyms and disabled variables are skipped.
///
/// # Errors
///
/// `Code` if an entry's type is missing.
pub fn dump_entries(cs: &ConfigSet, flags: DumpFlags) -> Result<Vec<DumpEntry>> {
    let mut entries = Vec::new();
    for (handle, elem) in cs.iter() {
        let overlay = match &elem.data {
            ConfigEntry::Synonym(_) => continue,
            ConfigEntry::Variable(_) => false,
            ConfigEntry::Overlay(_) => true,
        };
        if overlay && !flags.contains(DumpFlags::SHOW_OVERLAYS) {
            continue;
        }

        let def = cs.base(handle)?.def();
        if def.flags.contains(VarFlags::DISABLED) {
            continue;
        }
        let ty = cs.types().get(def.type_tag).ok_or_else(|| {
            Error::code(format!("Option {} has unregistered type {}", def.name, def.type_tag))
        })?;

        let initial_value = ty.initial_value(def)?;
        let changed = if overlay {
            cs.is_overridden(handle)?
        } else {
            *cs.effective(handle)? != initial_value
        };
        if flags.contains(DumpFlags::ONLY_CHANGED) && !changed {
            continue;
        }

        let redact = def.is_sensitive() && flags.contains(DumpFlags::HIDE_SENSITIVE);
        let value = if redact {
            Some(REDACTED.to_string())
        } else {
            ty.string_get(cs.effective(handle)?, def)?
        };
        let initial = if !flags.contains(DumpFlags::SHOW_DEFAULTS) {
            None
        } else if redact {
            Some(REDACTED.to_string())
        } else {
            ty.render(def, &initial_value)?
        };

        entries.push(DumpEntry {
            name: elem.key().to_string(),
            kind: ty.name(),
            value,
            initial,
            overlay,
            changed,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Renders the set as `set name = "value"` lines.
///
/// # Errors
///
/// As [`dump_entries`].
pub fn dump_config(cs: &ConfigSet, flags: DumpFlags) -> Result<String> {
    let mut out = String::new();
    for entry in dump_entries(cs, flags)? {
        out.push_str(&format!("set {} = {}", entry.name, quote(entry.value.as_deref())));
        if let Some(initial) = &entry.initial {
            out.push_str(&format!("  # default: {}", quote(Some(initial))));
        }
        out.push('\n');
    }
    Ok(out)
}

fn quote(value: Option<&str>) -> String {
    let text = value.unwrap_or_default();
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
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
    use crate::def::VariableDef;
    use crate::error::Error;
    use crate::types::{ConfigType, TypeTag, Value};

    /// Fails the test if a sensitive value is ever rendered.
    #[derive(Debug)]
    struct Tripwire;

    impl ConfigType for Tripwire {
        fn name(&self) -> &'static str {
            "tripwire"
        }

        fn parse(&self, _def: &VariableDef, text: &str) -> Result<Value> {
            Ok(Value::String(Some(text.to_string())))
        }

        fn render(&self, _def: &VariableDef, _value: &Value) -> Result<Option<String>> {
            Err(Error::Code("rendered a secret".into()))
        }

        fn check_native(&self, _def: &VariableDef, _value: &Value) -> Result<()> {
            Ok(())
        }

        fn initial_value(&self, _def: &VariableDef) -> Result<Value> {
            Ok(Value::String(Some("hunter2".into())))
        }
    }

    fn garden() -> ConfigSet {
        let mut cs = ConfigSet::with_builtin_types("test").unwrap();
        cs.register_type(TypeTag::new(20), Box::new(Tripwire)).unwrap();
        cs.register_variables([
            VariableDef::string("Tangerine", Some("orange")),
            VariableDef::synonym("Satsuma", "Tangerine"),
            VariableDef::number("Ugli", 2),
            VariableDef::new(
                "Vanilla",
                TypeTag::new(20),
                crate::def::Initial::None,
            )
            .with_flags(VarFlags::SENSITIVE),
            VariableDef::boolean("Wolfberry", false).with_flags(VarFlags::DISABLED),
        ])
        .unwrap();
        cs
    }

    #[test]
    fn test_sorted_without_synonyms() {
        let cs = garden();
        let names: Vec<String> = dump_entries(&cs, DumpFlags::HIDE_SENSITIVE)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["Tangerine", "Ugli", "Vanilla"]);
    }

    #[test]
    fn test_hide_sensitive_never_renders() {
        let cs = garden();
        let entries = dump_entries(&cs, DumpFlags::HIDE_SENSITIVE | DumpFlags::SHOW_DEFAULTS)
            .unwrap();
        let vanilla = entries.iter().find(|e| e.name == "Vanilla").unwrap();
        assert_eq!(vanilla.value.as_deref(), Some(REDACTED));
        assert_eq!(vanilla.initial.as_deref(), Some(REDACTED));

        assert!(dump_entries(&cs, DumpFlags::empty()).is_err());
    }

    #[test]
    fn test_only_changed() {
        let mut cs = garden();
        cs.set_string("Ugli", "9").unwrap();
        let entries = dump_entries(&cs, DumpFlags::ONLY_CHANGED | DumpFlags::HIDE_SENSITIVE)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Ugli");
        assert!(entries[0].changed);
    }

    #[test]
    fn test_overlays_on_request() {
        let mut cs = garden();
        let parent = cs.lookup("Ugli").unwrap();
        cs.inherit(parent, "work:Ugli").unwrap();

        let plain = dump_entries(&cs, DumpFlags::HIDE_SENSITIVE).unwrap();
        assert!(plain.iter().all(|e| !e.overlay));

        cs.set_string("work:Ugli", "4").unwrap();
        let all = dump_entries(&cs, DumpFlags::HIDE_SENSITIVE | DumpFlags::SHOW_OVERLAYS).unwrap();
        let overlay = all.iter().find(|e| e.name == "work:Ugli").unwrap();
        assert!(overlay.overlay);
        assert!(overlay.changed);
        assert_eq!(overlay.value.as_deref(), Some("4"));
    }

    #[test]
    fn test_text_dump() {
        let mut cs = garden();
        cs.set_string("Tangerine", "say \"hi\"").unwrap();
        let text = dump_config(&cs, DumpFlags::HIDE_SENSITIVE | DumpFlags::SHOW_DEFAULTS).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                r#"set Tangerine = "say \"hi\""  # default: "orange""#,
                r#"set Ugli = "2"  # default: "2""#,
                r#"set Vanilla = "***"  # default: "***""#,
            ]
        );
    }

    #[test]
    fn test_text_dump_without_defaults() {
        let mut cs = garden();
        cs.set_string("Ugli", "12").unwrap();
        let text = dump_config(&cs, DumpFlags::HIDE_SENSITIVE | DumpFlags::ONLY_CHANGED).unwrap();
        assert_eq!(text, "set Ugli = \"12\"\n");
    }

    #[test]
    fn test_json_shape() {
        let cs = garden();
        let entries = dump_entries(&cs, DumpFlags::HIDE_SENSITIVE).unwrap();
        let json = serde_json::to_value(&entries[1]).unwrap();
        assert_eq!(json["name"], "Ugli");
        assert_eq!(json["type"], "number");
        assert_eq!(json["value"], "2");
        assert!(json.get("initial").is_none());
    }
}
