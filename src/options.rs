//! Flat configuration record supplied by whatever front end drives the compiler.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::OptionsError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Identity of the unit; prefixes registry keys and tags log spans.
    pub unit_name: String,
    pub debug: bool,
    /// Phases whose debug events are enabled. Empty with `debug` set means all.
    pub debug_phases: Vec<String>,
    /// Evidence-only reactive detection, and parameters count as unused bindings.
    pub strict: bool,
    pub runtime_version: String,
    /// Wrap component bodies in `$REGISTRY.execute`.
    pub registry_scoping: bool,
    pub extra_globals: Vec<String>,
    /// Symbol → module path overrides for auto-injected runtime imports.
    pub runtime_modules: HashMap<String, String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            unit_name: "anonymous".to_string(),
            debug: false,
            debug_phases: vec![],
            strict: false,
            runtime_version: String::new(),
            registry_scoping: false,
            extra_globals: vec![],
            runtime_modules: HashMap::new(),
        }
    }
}

impl CompileOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether debug events for `phase` should be recorded.
    pub fn debug_enabled(&self, phase: &str) -> bool {
        self.debug && (self.debug_phases.is_empty() || self.debug_phases.iter().any(|p| p == phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts = CompileOptions::from_json(r#"{"strict": true, "unitName": "Counter.weft"}"#).unwrap();
        assert!(opts.strict);
        assert_eq!(opts.unit_name, "Counter.weft");
        assert!(!opts.registry_scoping);
        assert!(opts.runtime_modules.is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(CompileOptions::from_json("{strict: yes}").is_err());
    }

    #[test]
    fn test_debug_phase_gating() {
        let mut opts = CompileOptions::default();
        assert!(!opts.debug_enabled("lex"));
        opts.debug = true;
        assert!(opts.debug_enabled("lex"));
        opts.debug_phases = vec!["emit".to_string()];
        assert!(!opts.debug_enabled("lex"));
        assert!(opts.debug_enabled("emit"));
    }
}
