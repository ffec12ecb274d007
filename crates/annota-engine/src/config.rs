//! Dispatch options
//!
//! Options can be built in code or loaded from a TOML file:
//!
//! ```toml
//! [members]
//! include_inherited = false
//! include_static = false
//! include_non_public = false
//!
//! [dispatch]
//! catch_panics = true
//! fail_fast = false
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::reflect::MemberFilter;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Behavior of a dispatch pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchSettings {
    /// Turn panics in accessors and strategy constructors into recorded
    /// failures. Panics in `Strategy::evaluate` are always caught.
    pub catch_panics: bool,
    /// Stop the pass after the first per-element error
    pub fail_fast: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            catch_panics: true,
            fail_fast: false,
        }
    }
}

/// Options for a [`DispatchEngine`](crate::DispatchEngine)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchOptions {
    /// Which declared elements are considered
    pub members: MemberFilter,
    /// Pass behavior
    pub dispatch: DispatchSettings,
}

impl DispatchOptions {
    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse options from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Render options as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Set the member filter
    pub fn with_members(mut self, members: MemberFilter) -> Self {
        self.members = members;
        self
    }

    /// Enable or disable fail-fast
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.dispatch.fail_fast = fail_fast;
        self
    }

    /// Enable or disable panic capture
    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.dispatch.catch_panics = catch_panics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DispatchOptions::default();
        assert_eq!(options.members, MemberFilter::declared_public());
        assert!(options.dispatch.catch_panics);
        assert!(!options.dispatch.fail_fast);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let options = DispatchOptions::from_toml_str("").unwrap();
        assert_eq!(options, DispatchOptions::default());
    }

    #[test]
    fn test_parse_partial() {
        let toml = r#"
[members]
include_inherited = true

[dispatch]
fail_fast = true
"#;
        let options = DispatchOptions::from_toml_str(toml).unwrap();
        assert!(options.members.include_inherited);
        assert!(!options.members.include_static);
        assert!(options.dispatch.fail_fast);
        assert!(options.dispatch.catch_panics);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let toml = r#"
[dispatch]
retry = 3
"#;
        let err = DispatchOptions::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let options = DispatchOptions::default()
            .with_members(MemberFilter::all())
            .with_fail_fast(true);
        let text = options.to_toml_string().unwrap();
        assert_eq!(DispatchOptions::from_toml_str(&text).unwrap(), options);
    }
}
