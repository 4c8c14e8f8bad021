//! Checker configuration: built-in defaults, an optional `irchecker.toml`,
//! then command-line overrides.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annotation::DEFAULT_PREFIX;
use crate::arch;
use crate::diagnostic::{Diagnostic, ErrorKind};

pub const CONFIG_FILE_NAME: &str = "irchecker.toml";

/// What the driver does after a test case fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop at the first failing test case.
    #[default]
    FailFast,
    /// Run every applicable test case and report all failures.
    KeepGoing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckConfig {
    pub prefix: String,
    /// Target architecture; `None` runs only architecture-independent cases.
    pub arch: Option<String>,
    pub debuggable: bool,
    pub policy: FailurePolicy,
    /// Extensions of annotated sources picked up when walking a directory.
    pub extensions: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            arch: None,
            debuggable: false,
            policy: FailurePolicy::FailFast,
            extensions: vec![".java".to_string(), ".smali".to_string()],
        }
    }
}

/// `irchecker.toml`. Every key is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    prefix: Option<String>,
    arch: Option<String>,
    debuggable: Option<bool>,
    policy: Option<FailurePolicy>,
    extensions: Option<Vec<String>>,
}

/// Command-line values that take precedence over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub prefix: Option<String>,
    pub arch: Option<String>,
    pub debuggable: bool,
    pub keep_going: bool,
}

impl CheckConfig {
    /// Load a configuration file on top of the defaults.
    pub fn load(path: &Path) -> Result<CheckConfig, Diagnostic> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Diagnostic::error(ErrorKind::Io, format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content).map_err(|d| d.in_file(&path.display().to_string()))
    }

    pub fn from_toml(content: &str) -> Result<CheckConfig, Diagnostic> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| {
            Diagnostic::error(ErrorKind::Config, format!("invalid configuration: {}", e.message()))
        })?;

        let mut config = CheckConfig::default();
        if let Some(prefix) = file.prefix {
            config.prefix = prefix;
        }
        if file.arch.is_some() {
            config.arch = file.arch;
        }
        if let Some(debuggable) = file.debuggable {
            config.debuggable = debuggable;
        }
        if let Some(policy) = file.policy {
            config.policy = policy;
        }
        if let Some(extensions) = file.extensions {
            config.extensions = extensions;
        }
        config.validate()?;
        Ok(config)
    }

    /// Find an `irchecker.toml` in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Defaults, then the nearest `irchecker.toml` above `start_dir`, then
    /// `overrides`.
    pub fn resolve(start_dir: &Path, overrides: Overrides) -> Result<CheckConfig, Diagnostic> {
        let mut config = match Self::find(start_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(&path)?
            }
            None => CheckConfig::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(prefix) = overrides.prefix {
            self.prefix = prefix;
        }
        if overrides.arch.is_some() {
            self.arch = overrides.arch;
        }
        self.debuggable |= overrides.debuggable;
        if overrides.keep_going {
            self.policy = FailurePolicy::KeepGoing;
        }
    }

    pub fn validate(&self) -> Result<(), Diagnostic> {
        if self.prefix.is_empty() {
            return Err(Diagnostic::error(ErrorKind::Config, "check prefix must not be empty"));
        }
        if let Some(name) = &self.arch {
            if !arch::is_known(name) {
                return Err(Diagnostic::error(
                    ErrorKind::Config,
                    format!("unknown architecture '{}'", name),
                )
                .with_help(format!("known architectures: {}", arch::ARCHITECTURES.join(", "))));
            }
        }
        if self.extensions.is_empty() {
            return Err(Diagnostic::error(ErrorKind::Config, "no source extensions configured"));
        }
        Ok(())
    }

    /// Whether `path` has one of the configured source extensions.
    pub fn is_source_file(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}
