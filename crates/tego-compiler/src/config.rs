//! Compiler configuration (`tego.toml`)

use crate::error::{CompileError, CompileResult};
use crate::ir::PackageName;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Oldest class-file major version the backend emits (Java 1.1)
pub const MIN_CLASS_VERSION: u16 = 45;

/// Newest class-file major version the backend emits
pub const MAX_CLASS_VERSION: u16 = 69;

/// Settings for one compiler run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Internal package of the `Strategy`..`StrategyN` interfaces
    pub runtime_package: String,

    /// Package searched for global names that are not found elsewhere
    pub default_package: String,

    /// Class-file major version; 52 is Java 8
    pub class_version: u16,

    /// Structurally verify every emitted class
    pub verify: bool,

    /// Highest strategy arity with a runtime interface
    pub max_strategy_arity: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            runtime_package: "com/virtlink/tego/strategies".to_string(),
            default_package: "tego".to_string(),
            class_version: 52,
            verify: true,
            max_strategy_arity: 3,
        }
    }
}

impl CompilerConfig {
    /// Parse from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> CompileResult<Self> {
        let config: CompilerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> CompileResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that the values can be used
    pub fn validate(&self) -> CompileResult<()> {
        if !(MIN_CLASS_VERSION..=MAX_CLASS_VERSION).contains(&self.class_version) {
            return Err(CompileError::Config {
                message: format!(
                    "class_version {} is outside {}..={}",
                    self.class_version, MIN_CLASS_VERSION, MAX_CLASS_VERSION
                ),
            });
        }
        for (key, value) in [
            ("runtime_package", &self.runtime_package),
            ("default_package", &self.default_package),
        ] {
            if PackageName::new(value.as_str()).is_err() {
                return Err(CompileError::Config {
                    message: format!("{} `{}` is not a package name", key, value),
                });
            }
        }
        Ok(())
    }

    /// The default package as a [`PackageName`]
    pub fn default_package_name(&self) -> CompileResult<PackageName> {
        PackageName::new(self.default_package.as_str())
    }

    /// Internal name of the runtime interface for strategies of `arity`
    ///
    /// Arity 0 is `Strategy`, arity `n` is `Strategy{n}`.
    pub fn strategy_interface(&self, arity: usize) -> CompileResult<String> {
        if arity > self.max_strategy_arity {
            return Err(CompileError::unsupported(format!(
                "strategies with {} parameters (at most {} supported)",
                arity, self.max_strategy_arity
            )));
        }
        let simple = match arity {
            0 => "Strategy".to_string(),
            n => format!("Strategy{}", n),
        };
        if self.runtime_package.is_empty() {
            Ok(simple)
        } else {
            Ok(format!("{}/{}", self.runtime_package, simple))
        }
    }
}
