// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::strategies::{arb_configuration, arb_protected};
use proptest::prelude::*;

fn config(pairs: &[(&str, ConfigValue)]) -> Configuration {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}

#[test]
fn merge_overrides_unprotected_keys() {
    let base = config(&[("resize_to", ConfigValue::Int(2048)), ("project_path", "/data".into())]);
    let overrides = config(&[("resize_to", ConfigValue::Int(1024)), ("mesh_size", ConfigValue::Int(100000))]);

    let merged = merge(&base, &overrides, &ProtectedKeys::workspace_root());

    assert_eq!(merged.get("resize_to"), Some(&ConfigValue::Int(1024)));
    assert_eq!(merged.get("mesh_size"), Some(&ConfigValue::Int(100000)));
    assert_eq!(merged.get_str("project_path"), Some("/data"));
}

#[test]
fn merge_keeps_protected_key_from_base() {
    let base = config(&[("project_path", "/data".into())]);
    let overrides = config(&[("project_path", "/evil".into())]);

    let merged = merge(&base, &overrides, &ProtectedKeys::workspace_root());

    assert_eq!(merged.get_str("project_path"), Some("/data"));
}

#[test]
fn merge_does_not_inherit_protected_key_absent_from_base() {
    let base = Configuration::new();
    let overrides = config(&[("project_path", "/evil".into())]);

    let merged = merge(&base, &overrides, &ProtectedKeys::workspace_root());

    assert!(!merged.contains_key("project_path"));
}

#[test]
fn merge_leaves_inputs_untouched() {
    let base = config(&[("a", ConfigValue::Int(1))]);
    let overrides = config(&[("a", ConfigValue::Int(2))]);
    let (base_before, overrides_before) = (base.clone(), overrides.clone());

    let _ = merge(&base, &overrides, &ProtectedKeys::default());

    assert_eq!(base, base_before);
    assert_eq!(overrides, overrides_before);
}

#[test]
fn store_always_protects_workspace_root() {
    let store = ConfigStore::new(config(&[("project_path", "/data".into())]), ProtectedKeys::default());
    assert!(store.protected().contains(PROJECT_PATH_KEY));

    let merged = store.merge(&config(&[("project_path", "/evil".into())]));
    assert_eq!(merged.get_str("project_path"), Some("/data"));
}

#[test]
fn later_layer_wins() {
    let store = ConfigStore::new(config(&[("dem", false.into())]), ProtectedKeys::default());
    let file = config(&[("dem", true.into()), ("orthophoto_resolution", ConfigValue::Int(20))]);
    let params = config(&[("orthophoto_resolution", ConfigValue::Int(5))]);

    let merged = store.merge_layers([&file, &params]);

    assert_eq!(merged.get("dem"), Some(&ConfigValue::Bool(true)));
    assert_eq!(merged.get("orthophoto_resolution"), Some(&ConfigValue::Int(5)));
}

#[test]
fn from_yaml_parses_flat_mapping() {
    let doc = "resize_to: 1024\nrerun_all: true\nname: field-7\nratio: 0.5\nempty: ~\n";
    let parsed = Configuration::from_yaml_str(doc).unwrap();

    assert_eq!(parsed.get("resize_to"), Some(&ConfigValue::Int(1024)));
    assert!(parsed.flag("rerun_all"));
    assert_eq!(parsed.get_str("name"), Some("field-7"));
    assert_eq!(parsed.get("ratio"), Some(&ConfigValue::Float(0.5)));
    assert_eq!(parsed.get("empty"), Some(&ConfigValue::Null));
    assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["resize_to", "rerun_all", "name", "ratio", "empty"]);
}

#[yare::parameterized(
    empty         = { "" },
    comments_only = { "# nothing here\n" },
)]
fn from_yaml_empty_document_is_empty(doc: &str) {
    assert!(Configuration::from_yaml_str(doc).unwrap().is_empty());
}

#[test]
fn from_yaml_rejects_nested_values() {
    assert!(Configuration::from_yaml_str("opensfm:\n  depthmap: 4\n").is_err());
}

#[yare::parameterized(
    boolean = { "true",   ConfigValue::Bool(true) },
    integer = { "16",     ConfigValue::Int(16) },
    float   = { "2.5",    ConfigValue::Float(2.5) },
    string  = { "fast",   ConfigValue::Str("fast".into()) },
    null    = { "~",      ConfigValue::Null },
    empty   = { "",       ConfigValue::Str(String::new()) },
    list    = { "[1, 2]", ConfigValue::Str("[1, 2]".into()) },
)]
fn parse_scalar_types(raw: &str, expected: ConfigValue) {
    assert_eq!(ConfigValue::parse_scalar(raw), expected);
}

#[test]
fn assignments_parse_key_value_pairs() {
    let parsed = Configuration::from_assignments(["rerun_all=true", "name = site-a"]).unwrap();
    assert!(parsed.flag("rerun_all"));
    assert_eq!(parsed.get_str("name"), Some("site-a"));
}

#[yare::parameterized(
    missing_equals = { "rerun_all" },
    missing_key    = { "=true" },
)]
fn assignments_reject_malformed(raw: &str) {
    assert!(matches!(
        Configuration::from_assignments([raw]),
        Err(ConfigError::InvalidAssignment(_))
    ));
}

#[yare::parameterized(
    null      = { ConfigValue::Null,            "" },
    boolean   = { ConfigValue::Bool(false),     "false" },
    integer   = { ConfigValue::Int(-3),         "-3" },
    string    = { ConfigValue::Str("a b".into()), "a b" },
    whole     = { ConfigValue::Float(1.0),      "1.0" },
    negative  = { ConfigValue::Float(-2.0),     "-2.0" },
    fraction  = { ConfigValue::Float(0.25),     "0.25" },
)]
fn value_display(value: ConfigValue, expected: &str) {
    assert_eq!(value.to_string(), expected);
}

#[yare::parameterized(
    float_whole    = { "ratio: 1.0",     ConfigValue::Float(1.0) },
    float_fraction = { "ratio: 0.5",     ConfigValue::Float(0.5) },
    integer        = { "ratio: 1",       ConfigValue::Int(1) },
)]
fn rendered_value_reparses_to_same_type(doc: &str, expected: ConfigValue) {
    let config = Configuration::from_yaml_str(doc).unwrap();
    let value = config.get("ratio").unwrap();
    assert_eq!(value, &expected);
    assert_eq!(ConfigValue::parse_scalar(&value.to_string()), expected);
}

#[yare::parameterized(
    value_lf   = { "resize_to: \"1\\nproject_path : /evil\"" },
    value_crlf = { "resize_to: \"1\\r\\nproject_path : /evil\"" },
    block      = { "notes: |\n  first\n  second\n" },
    key        = { "\"a\\nproject_path\": 1" },
)]
fn yaml_rejects_multi_line_settings(doc: &str) {
    assert!(matches!(Configuration::from_yaml_str(doc), Err(ConfigError::MultiLine(_))));
}

#[test]
fn assignments_reject_multi_line_values() {
    let result = Configuration::from_assignments(["resize_to=1\nproject_path : /evil"]);
    assert!(matches!(result, Err(ConfigError::MultiLine(key)) if key == "resize_to"));
}

proptest! {
    #[test]
    fn finite_floats_display_as_floats(x in -1.0e12f64..1.0e12) {
        let shown = ConfigValue::Float(x).to_string();
        prop_assert_eq!(ConfigValue::parse_scalar(&shown), ConfigValue::Float(x));
    }

    #[test]
    fn protected_keys_keep_base_value(
        base in arb_configuration(),
        overrides in arb_configuration(),
        protected in arb_protected(),
    ) {
        let merged = merge(&base, &overrides, &protected);
        for key in protected.iter() {
            prop_assert_eq!(merged.get(key), base.get(key));
        }
    }

    #[test]
    fn unprotected_override_keys_win(
        base in arb_configuration(),
        overrides in arb_configuration(),
        protected in arb_protected(),
    ) {
        let merged = merge(&base, &overrides, &protected);
        for (key, value) in overrides.iter() {
            if !protected.contains(key) {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
    }
}
