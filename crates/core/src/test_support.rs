// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::artifact::OutputArtifact;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for configuration types.
pub mod strategies {
    use crate::config::{ConfigValue, Configuration, ProtectedKeys};
    use proptest::prelude::*;

    /// Small key alphabet so generated maps overlap often.
    pub fn arb_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("project_path".to_string()),
            Just("name".to_string()),
            Just("rerun_all".to_string()),
            "[a-z_]{1,6}",
        ]
    }

    pub fn arb_value() -> impl Strategy<Value = ConfigValue> {
        prop_oneof![
            Just(ConfigValue::Null),
            any::<bool>().prop_map(ConfigValue::Bool),
            any::<i64>().prop_map(ConfigValue::Int),
            (-1.0e6f64..1.0e6).prop_map(ConfigValue::Float),
            "[ -~]{0,12}".prop_map(ConfigValue::Str),
        ]
    }

    pub fn arb_configuration() -> impl Strategy<Value = Configuration> {
        proptest::collection::vec((arb_key(), arb_value()), 0..8)
            .prop_map(|pairs| pairs.into_iter().collect())
    }

    pub fn arb_protected() -> impl Strategy<Value = ProtectedKeys> {
        proptest::collection::vec(arb_key(), 0..4).prop_map(|keys| keys.into_iter().collect())
    }
}

// ── Manifest factories ──────────────────────────────────────────────────

/// An artifact with the given source; id and destination derive from it.
pub fn artifact(source: &str, compress: bool) -> OutputArtifact {
    let file_name = source.rsplit('/').next().unwrap_or(source);
    let id = file_name.split('.').next().unwrap_or(file_name);
    OutputArtifact::new(id, source, file_name, compress)
}
