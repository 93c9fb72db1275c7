//! Integration tests for the config registry.
//!
//! These drive the public API the way the command layer and the account
//! manager do: by name, by handle and through scopes.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use mailledger_config::def::Mapping;
use mailledger_config::types::{BoolType, SortValue};
use mailledger_config::{
    Account, ConfigEvent, ConfigSet, ConfigSubset, ErrorKind, EventKind, Flow, HashFlags,
    HashTable, QuadOption, Rejection, ScopeLevel, Status, TypeTag, Value, VarFlags, VariableDef,
    Verdict,
};

const PAGERS: Mapping = &[("builtin", 0), ("less", 1), ("more", 2)];
const SORTS: Mapping = &[("date", 1), ("from", 2), ("subject", 3), ("threads", 4)];

fn never(_def: &VariableDef, _value: &Value) -> Result<Verdict, String> {
    Err("Option is locked".to_string())
}

fn catalogue() -> Vec<VariableDef> {
    vec![
        VariableDef::boolean("Apple", true),
        VariableDef::quad("Blueberry", QuadOption::AskYes),
        VariableDef::number("Cherry", 10),
        VariableDef::long("Damson", 1_000_000),
        VariableDef::string("Elderberry", Some("hello")),
        VariableDef::path("Fig", Some("/var/mail")),
        VariableDef::enumeration("Grape", PAGERS, "less"),
        VariableDef::sort("Huckleberry", SORTS, "date").with_flags(VarFlags::SORT_REVERSE),
        VariableDef::regex("Ilama", Some("^(re|fwd?):")),
        VariableDef::address("Jackfruit", Some("Joe Bloggs <joe@example.com>")),
        VariableDef::slist("Kiwi", Some("en,de")).with_flags(VarFlags::SLIST_SEP_COMMA),
        VariableDef::mbtable("Lime", Some(" +TCF")),
        VariableDef::string("Mango", Some("fixed")).with_validator(never),
        VariableDef::synonym("Nectarine", "Elderberry"),
        VariableDef::number("Quince", 5),
    ]
}

fn config() -> ConfigSet {
    let mut cs = ConfigSet::with_builtin_types("integration").unwrap();
    cs.register_variables(catalogue()).unwrap();
    cs
}

#[test]
fn test_string_round_trip() {
    let mut cs = config();
    let cases = [
        ("Apple", "no"),
        ("Blueberry", "ask-no"),
        ("Cherry", "-3"),
        ("Damson", "9000000000"),
        ("Elderberry", "goodbye"),
        ("Fig", "/tmp/mail"),
        ("Grape", "more"),
        ("Huckleberry", "reverse-subject"),
        ("Ilama", "^Subject"),
        ("Jackfruit", "jane@example.org"),
        ("Kiwi", "fr,it"),
        ("Lime", "abc"),
    ];
    for (name, text) in cases {
        cs.set_string(name, text).unwrap();
        assert_eq!(cs.get_string(name).unwrap().as_deref(), Some(text), "{name}");
    }
}

#[test]
fn test_native_round_trip() {
    let mut cs = config();
    let cases = [
        ("Apple", Value::Bool(false)),
        ("Blueberry", Value::Quad(QuadOption::No)),
        ("Cherry", Value::Number(-300)),
        ("Damson", Value::Long(-42)),
        ("Elderberry", Value::String(Some("native".into()))),
        ("Grape", Value::Enum(0)),
        (
            "Huckleberry",
            Value::Sort(SortValue {
                method: 4,
                reverse: true,
                last: false,
            }),
        ),
    ];
    for (name, value) in cases {
        cs.set_native(name, value.clone()).unwrap();
        assert_eq!(cs.get_native(name).unwrap(), value, "{name}");
    }
}

#[test]
fn test_default_fidelity() {
    let mut cs = config();
    let names = cs.names();
    let defaults: Vec<Option<String>> = names.iter().map(|n| cs.get_string(n).unwrap()).collect();
    assert_eq!(defaults[names.iter().position(|n| n == "Grape").unwrap()].as_deref(), Some("less"));
    assert_eq!(
        defaults[names.iter().position(|n| n == "Jackfruit").unwrap()].as_deref(),
        Some("Joe Bloggs <joe@example.com>")
    );

    cs.set_string("Cherry", "99").unwrap();
    cs.set_string("Kiwi", "").unwrap();
    cs.set_string("Ilama", "x").unwrap();
    for name in &names {
        cs.reset(name).unwrap();
    }
    let after: Vec<Option<String>> = names.iter().map(|n| cs.get_string(n).unwrap()).collect();
    assert_eq!(defaults, after);
    for name in &names {
        assert!(!cs.has_been_set(name).unwrap(), "{name}");
    }
}

#[test]
fn test_no_op_set_is_silent() {
    let mut cs = config();
    let fired = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&fired);
    cs.add_listener(Box::new(move |_: &ConfigSet, _: &ConfigEvent| {
        *counter.borrow_mut() += 1;
        Flow::Continue
    }));

    let outcome = cs.set_string("Elderberry", "hello").unwrap();
    assert!(outcome.status.contains(Status::NO_CHANGE));
    let outcome = cs.set_native("Cherry", Value::Number(10)).unwrap();
    assert!(outcome.status.contains(Status::NO_CHANGE));
    let outcome = cs.reset("Apple").unwrap();
    assert!(outcome.status.contains(Status::NO_CHANGE));
    assert_eq!(*fired.borrow(), 0);

    cs.set_string("Elderberry", "changed").unwrap();
    assert_eq!(*fired.borrow(), 1);
}

#[test]
fn test_unknown_name() {
    let mut cs = config();
    for err in [
        cs.get_string("NoSuchVar").unwrap_err(),
        cs.get_native("NoSuchVar").unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::UnknownVariable);
    }
    for err in [
        cs.set_string("NoSuchVar", "x").unwrap_err(),
        cs.set_native("NoSuchVar", Value::Bool(true)).unwrap_err(),
        cs.reset("NoSuchVar").unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::UnknownVariable);
    }
}

#[test]
fn test_synonym_transparency() {
    let mut cs = ConfigSet::with_builtin_types("synonyms").unwrap();
    cs.register_variables([
        VariableDef::string("Apple", None),
        VariableDef::synonym("Banana", "Apple"),
    ])
    .unwrap();
    cs.set_string("Banana", "x").unwrap();
    assert_eq!(cs.get_string("Apple").unwrap().as_deref(), Some("x"));
    assert_eq!(cs.get_string("Banana").unwrap().as_deref(), Some("x"));
}

#[test]
fn test_inheritance_chain() {
    let mut cs = config();
    let account = ConfigSubset::create(&mut cs, "ac", None, ScopeLevel::Account, &["Quince"]).unwrap();
    let mailbox = ConfigSubset::create(
        &mut cs,
        "ac:mbox",
        Some("ac"),
        ScopeLevel::Mailbox,
        &["Quince"],
    )
    .unwrap();

    assert_eq!(cs.get_native("ac:mbox:Quince").unwrap(), Value::Number(5));

    cs.set_string("ac:Quince", "7").unwrap();
    assert_eq!(cs.get_native("ac:mbox:Quince").unwrap(), Value::Number(7));

    cs.set_string("ac:mbox:Quince", "9").unwrap();
    assert_eq!(cs.get_native("Quince").unwrap(), Value::Number(5));
    assert_eq!(cs.get_native("ac:Quince").unwrap(), Value::Number(7));
    assert_eq!(cs.get_native("ac:mbox:Quince").unwrap(), Value::Number(9));

    let outcome = cs.reset("ac:mbox:Quince").unwrap();
    assert!(outcome.status.contains(Status::INHERITED));
    assert_eq!(cs.get_native("ac:mbox:Quince").unwrap(), Value::Number(7));

    cs.reset("ac:Quince").unwrap();
    assert_eq!(cs.get_native("ac:mbox:Quince").unwrap(), Value::Number(5));

    mailbox.destroy(&mut cs).unwrap();
    account.destroy(&mut cs).unwrap();
    assert!(cs.lookup("ac:Quince").is_none());
}

#[test]
fn test_account_scope_destroyed_before_mailbox() {
    let mut cs = config();
    let account = ConfigSubset::create(&mut cs, "ac", None, ScopeLevel::Account, &["Quince"]).unwrap();
    let mailbox = ConfigSubset::create(
        &mut cs,
        "ac:mbox",
        Some("ac"),
        ScopeLevel::Mailbox,
        &["Quince"],
    )
    .unwrap();
    cs.set_string("ac:Quince", "7").unwrap();

    account.destroy(&mut cs).unwrap();
    assert_eq!(cs.get_native("ac:mbox:Quince").unwrap(), Value::Number(5));
    cs.set_string("Quince", "6").unwrap();
    assert_eq!(cs.get_native("ac:mbox:Quince").unwrap(), Value::Number(6));

    mailbox.destroy(&mut cs).unwrap();
    assert!(cs.lookup("ac:mbox:Quince").is_none());
}

#[test]
fn test_account_chain_events() {
    let mut cs = config();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    cs.add_listener(Box::new(move |_: &ConfigSet, event: &ConfigEvent| {
        log.borrow_mut().push((event.name.clone(), event.kind));
        Flow::Continue
    }));

    let mut account = Account::new(&mut cs, "work", &["Quince", "Elderberry"]).unwrap();
    account.add_mailbox(&mut cs, "inbox", &["Quince"]).unwrap();
    cs.set_string("work:inbox:Quince", "1").unwrap();
    account.free(&mut cs).unwrap();

    let events = seen.borrow();
    assert_eq!(events[0], ("work:inbox:Quince".to_string(), EventKind::Set));
    assert!(events.contains(&("work:inbox:Quince".to_string(), EventKind::Reset)));
    assert!(events.contains(&("work:Elderberry".to_string(), EventKind::Deleted)));
    let deleted = events.iter().filter(|(_, k)| *k == EventKind::Deleted).count();
    assert_eq!(deleted, 3);
}

#[test]
fn test_validator_veto() {
    let mut cs = config();
    let before = cs.get_string("Mango").unwrap();
    assert_eq!(before.as_deref(), Some("fixed"));

    let err = cs.set_string("Mango", "other").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert_eq!(err.rejection(), Some(Rejection::Validator));
    assert_eq!(err.to_string(), "Option is locked");
    assert_eq!(cs.get_string("Mango").unwrap(), before);

    let err = cs
        .set_native("Mango", Value::String(Some("other".into())))
        .unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::Validator));
    assert_eq!(cs.get_string("Mango").unwrap(), before);

    let err = cs.set_string("Cherry", "ten").unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::BadType));
}

#[test]
fn test_validator_guards_overlays() {
    let mut cs = config();
    let scope = ConfigSubset::create(&mut cs, "ac", None, ScopeLevel::Account, &["Mango"]).unwrap();
    assert!(cs.set_string("ac:Mango", "other").is_err());
    assert!(!scope.is_overridden(&cs, 0).unwrap());
    assert_eq!(cs.get_string("ac:Mango").unwrap().as_deref(), Some("fixed"));
    scope.destroy(&mut cs).unwrap();
}

#[test]
fn test_type_registration_guard() {
    let mut cs = config();
    let err = cs.register_type(TypeTag::BOOL, Box::new(BoolType)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Code);
    assert_eq!(cs.get_string("Apple").unwrap().as_deref(), Some("yes"));
}

#[test]
fn test_scope_unwinds_on_missing_parent() {
    let mut cs = config();
    let before = cs.len();
    let err = Account::new(&mut cs, "ac", &["Quince", "Cherry", "Zucchini"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownVariable);
    assert_eq!(cs.len(), before);
    assert!(cs.lookup("ac:Quince").is_none());
    assert!(cs.lookup("ac:Cherry").is_none());
}

#[test]
fn test_hash_chaining_with_colliding_keys() {
    let mut table: HashTable<u64> = HashTable::new(8, HashFlags::empty());
    let keys: Vec<u64> = (0..20).map(|i| 5 + 8 * i).collect();
    let handles: Vec<_> = keys
        .iter()
        .map(|&k| table.insert(k, 0, k * 10).unwrap())
        .collect();
    assert!(keys.iter().all(|&k| table.bucket_of(k) == 5));

    for &k in &keys {
        let handle = table.find(k).unwrap();
        assert_eq!(table.get(handle).unwrap().data, k * 10);
    }

    assert_eq!(table.delete(keys[7], None, &()), 1);
    assert!(table.find(keys[7]).is_none());
    assert!(table.get(handles[7]).is_none());
    for (i, &k) in keys.iter().enumerate().filter(|&(i, _)| i != 7) {
        assert_eq!(table.find(k), Some(handles[i]));
    }
    assert_eq!(table.len(), keys.len() - 1);
}
