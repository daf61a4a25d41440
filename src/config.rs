//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/navtree/navtree.toml`
//! 3. Local config: `<dir>/.navtree.toml` (working directory)
//! 4. Environment variables: `NAVTREE__*` (double underscore separates sections)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::FormSpec;

/// Node form configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormConfig {
    /// Options of the `type` single-option field
    pub type_options: Vec<String>,
    /// Type given to nodes added without one
    pub default_type: Option<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            type_options: vec!["page".into()],
            default_type: None,
        }
    }
}

/// Raw form config for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFormConfig {
    pub type_options: Option<Vec<String>>,
    pub default_type: Option<String>,
}

impl FormConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Base order is kept, new items are appended in overlay order
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["page"], &["link"])          // → ["page", "link"]
    /// merge_array(&["page", "link"], &["!page"]) // → ["link"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let removed: HashSet<&str> = overlay
            .iter()
            .filter_map(|item| item.strip_prefix('!'))
            .collect();
        let mut result: Vec<String> = Vec::new();
        let additions = overlay.iter().filter(|item| !item.starts_with('!'));
        for item in base.iter().chain(additions) {
            if !removed.contains(item.as_str()) && !result.contains(item) {
                result.push(item.clone());
            }
        }
        result
    }

    /// Overlay wins for scalars; `type_options` union-merges when specified.
    pub fn merge(&self, overlay: &RawFormConfig) -> Self {
        Self {
            type_options: overlay
                .type_options
                .as_ref()
                .map(|o| Self::merge_array(&self.type_options, o))
                .unwrap_or_else(|| self.type_options.clone()),
            default_type: overlay
                .default_type
                .clone()
                .or_else(|| self.default_type.clone()),
        }
    }

    /// Like `merge`, but a specified `type_options` REPLACES the base list.
    ///
    /// The compiled default is only an example; the global file sets the real baseline.
    pub fn apply_global(&self, global: &RawFormConfig) -> Self {
        Self {
            type_options: global
                .type_options
                .clone()
                .unwrap_or_else(|| self.type_options.clone()),
            default_type: global
                .default_type
                .clone()
                .or_else(|| self.default_type.clone()),
        }
    }

    pub fn form_spec(&self) -> FormSpec {
        FormSpec::navigation(self.type_options.clone())
    }
}

/// JSON output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON
    pub pretty: bool,
    /// Indent width when pretty-printing
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 2,
        }
    }
}

impl OutputConfig {
    pub fn indent(&self) -> Option<usize> {
        self.pretty.then_some(self.indent)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub pretty: Option<bool>,
    pub indent: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub value_file: Option<PathBuf>,
    pub form: RawFormConfig,
    pub output: RawOutputConfig,
}

/// Unified configuration for navtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Nav file used when a command gets no FILE argument
    pub value_file: Option<PathBuf>,
    pub form: FormConfig,
    pub output: OutputConfig,
}

/// Get the XDG config directory for navtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "navtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("navtree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".navtree.toml")
}

/// Expand environment variables and `~` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            value_file: overlay
                .value_file
                .clone()
                .or_else(|| self.value_file.clone()),
            form: self.form.merge(&overlay.form),
            output: OutputConfig {
                pretty: overlay.output.pretty.unwrap_or(self.output.pretty),
                indent: overlay.output.indent.unwrap_or(self.output.indent),
            },
        }
    }

    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            form: self.form.apply_global(&global.form),
            ..self.merge_with(global)
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(file) = &self.value_file {
            let expanded = expand_env_vars(file.to_string_lossy().as_ref());
            self.value_file = Some(PathBuf::from(expanded));
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!item` negation
    /// - Any → Env vars: REPLACE
    #[instrument(level = "debug")]
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.apply_global(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        Ok(current)
    }

    /// Apply NAVTREE__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("NAVTREE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("form.type_options")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("value_file") {
            settings.value_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get::<Vec<String>>("form.type_options") {
            settings.form.type_options = val;
        }
        if let Ok(val) = config.get_string("form.default_type") {
            settings.form.default_type = Some(val);
        }
        if let Ok(val) = config.get_bool("output.pretty") {
            settings.output.pretty = val;
        }
        if let Ok(val) = config.get_int("output.indent") {
            settings.output.indent = usize::try_from(val).map_err(|e| ApplicationError::Config {
                message: format!("output.indent: {}", e),
            })?;
        }

        Ok(settings)
    }

    /// Effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}
