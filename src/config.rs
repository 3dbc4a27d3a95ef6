use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default template naming rule, applied when a template reference is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum AutoRule {
    /// snake_case the action name (`showList` -> `show_list`)
    #[default]
    Snake = 1,
    /// Lowercase the action name (`showList` -> `showlist`)
    Lower = 2,
    /// Use the action name as routed
    Action = 3,
}

impl TryFrom<u8> for AutoRule {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(AutoRule::Snake),
            2 => Ok(AutoRule::Lower),
            3 => Ok(AutoRule::Action),
            other => Err(format!("auto_rule must be 1, 2 or 3 (got {})", other)),
        }
    }
}

impl From<AutoRule> for u8 {
    fn from(rule: AutoRule) -> Self {
        rule as u8
    }
}

impl fmt::Display for AutoRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// View driver configuration
///
/// Field names follow the keys used in `view.toml`:
///
/// ```toml
/// auto_rule = 1
/// view_dir_name = "view"
/// view_suffix = "html"
/// view_depr = "/"
/// tpl_cache = true
/// tpl_begin = "{{"
/// tpl_end = "}}"
///
/// [tpl_replace_string]
/// "__STATIC__" = "/static"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub auto_rule: AutoRule,

    #[serde(default = "default_view_dir_name")]
    pub view_dir_name: String,

    /// Deprecated. Accepted for compatibility, never consulted.
    #[serde(default)]
    pub view_path: String,

    #[serde(default = "default_view_suffix")]
    pub view_suffix: String,

    #[serde(default = "default_view_depr")]
    pub view_depr: String,

    #[serde(default = "default_tpl_cache")]
    pub tpl_cache: bool,

    #[serde(default = "default_tpl_begin")]
    pub tpl_begin: String,

    #[serde(default = "default_tpl_end")]
    pub tpl_end: String,

    /// Rendered-output cache lifetime in seconds
    #[serde(default = "default_cache_lifetime")]
    pub cache_lifetime: u64,

    /// Literal replacements applied to rendered output, in order
    #[serde(default)]
    pub tpl_replace_string: IndexMap<String, String>,
}

fn default_view_dir_name() -> String {
    "view".to_string()
}
fn default_view_suffix() -> String {
    "html".to_string()
}
fn default_view_depr() -> String {
    std::path::MAIN_SEPARATOR.to_string()
}
fn default_tpl_cache() -> bool {
    true
}
fn default_tpl_begin() -> String {
    "{{".to_string()
}
fn default_tpl_end() -> String {
    "}}".to_string()
}
fn default_cache_lifetime() -> u64 {
    3600
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            auto_rule: AutoRule::default(),
            view_dir_name: default_view_dir_name(),
            view_path: String::new(),
            view_suffix: default_view_suffix(),
            view_depr: default_view_depr(),
            tpl_cache: default_tpl_cache(),
            tpl_begin: default_tpl_begin(),
            tpl_end: default_tpl_end(),
            cache_lifetime: default_cache_lifetime(),
            tpl_replace_string: IndexMap::new(),
        }
    }
}

impl ViewConfig {
    /// Load `view.toml` from the current directory
    pub fn load() -> Result<Self> {
        Self::load_with_base_dir(".")
    }

    /// Load `view.toml` and the environment-specific `view.{env}.toml` from
    /// `base_dir`, then apply `RUSTF_VIEW_*` overrides
    pub fn load_with_base_dir<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();

        let base_path = base_dir.join("view.toml");
        let mut merged = if base_path.exists() {
            Self::load_toml_value(&base_path)?
        } else {
            toml::Value::try_from(ViewConfig::default())
                .map_err(|e| Error::config(format!("Failed to serialize defaults: {}", e)))?
        };

        let env_name = Self::detect_environment();
        let env_path = base_dir.join(format!("view.{}.toml", env_name));
        if env_path.exists() {
            log::debug!(
                "Loading environment-specific view config from: {}",
                env_path.display()
            );
            let env_value = Self::load_toml_value(&env_path)?;
            merged = serde_toml_merge::merge(merged, env_value).map_err(|e| {
                Error::config(format!("Failed to merge view configuration files: {}", e))
            })?;
        }

        let mut config = Self::from_toml_value(merged)?;
        config.apply_env_overrides()?;
        config.validate()?;

        log::info!(
            "View configuration loaded (environment: {}, view_dir_name: {})",
            env_name,
            config.view_dir_name
        );
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let value = Self::load_toml_value(path.as_ref())?;
        let config = Self::from_toml_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML source
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ViewConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse view config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn load_toml_value(path: &Path) -> Result<toml::Value> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}. Check TOML syntax.",
                path.display(),
                e
            ))
        })
    }

    fn from_toml_value(value: toml::Value) -> Result<Self> {
        // Round-trip through JSON so serde defaults apply to missing keys
        let json_value = serde_json::to_value(&value)
            .map_err(|e| Error::config(format!("Failed to convert configuration: {}", e)))?;
        serde_json::from_value(json_value)
            .map_err(|e| Error::config(format!("Failed to deserialize configuration: {}", e)))
    }

    /// Return a copy of this configuration with `overrides` applied on top
    ///
    /// Keys absent from `overrides` keep their current value. Keys present
    /// replace the current value whole, so passing `tpl_replace_string`
    /// swaps the entire replacement table.
    pub fn merged(&self, overrides: toml::Table) -> Result<Self> {
        let mut table = match toml::Value::try_from(self) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => return Err(Error::config("Configuration did not serialize to a table")),
            Err(e) => {
                return Err(Error::config(format!(
                    "Failed to serialize configuration: {}",
                    e
                )))
            }
        };
        for (key, value) in overrides {
            table.insert(key, value);
        }

        let config = Self::from_toml_value(toml::Value::Table(table))?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a single option by its configuration key
    pub fn get_value(&self, name: &str) -> Option<toml::Value> {
        match toml::Value::try_from(self).ok()? {
            toml::Value::Table(mut table) => table.remove(name),
            _ => None,
        }
    }

    /// Detect current environment name (`dev` or `prod`) from `RUSTF_ENV`
    pub fn detect_environment() -> &'static str {
        match env::var("RUSTF_ENV")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => "prod",
            _ => "dev",
        }
    }

    /// Apply `RUSTF_VIEW_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(rule) = env::var("RUSTF_VIEW_AUTO_RULE") {
            let value: u8 = rule
                .parse()
                .map_err(|_| Error::config("Invalid RUSTF_VIEW_AUTO_RULE value"))?;
            self.auto_rule = AutoRule::try_from(value).map_err(Error::config)?;
        }
        if let Ok(dir_name) = env::var("RUSTF_VIEW_DIR_NAME") {
            self.view_dir_name = dir_name;
        }
        if let Ok(suffix) = env::var("RUSTF_VIEW_SUFFIX") {
            self.view_suffix = suffix;
        }
        if let Ok(depr) = env::var("RUSTF_VIEW_DEPR") {
            self.view_depr = depr;
        }
        if let Ok(cache) = env::var("RUSTF_VIEW_TPL_CACHE") {
            self.tpl_cache = cache
                .parse()
                .map_err(|_| Error::config("Invalid RUSTF_VIEW_TPL_CACHE value"))?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.view_dir_name.trim().is_empty() {
            return Err(Error::config("view_dir_name cannot be empty"));
        }

        if self.suffix().is_empty() {
            return Err(Error::config("view_suffix cannot be empty"));
        }

        if self.view_depr.is_empty() {
            return Err(Error::config("view_depr cannot be empty"));
        }

        if self.tpl_begin.is_empty() || self.tpl_end.is_empty() {
            return Err(Error::config("tpl_begin and tpl_end cannot be empty"));
        }

        if self.tpl_begin == self.tpl_end {
            return Err(Error::config("tpl_begin and tpl_end must differ"));
        }

        if self.tpl_replace_string.keys().any(|key| key.is_empty()) {
            return Err(Error::config("tpl_replace_string keys cannot be empty"));
        }

        if !self.view_path.is_empty() {
            log::warn!(
                "view_path '{}' is deprecated and ignored; views are located by view_dir_name",
                self.view_path
            );
        }

        Ok(())
    }

    /// Template suffix without its leading dot
    pub fn suffix(&self) -> &str {
        self.view_suffix.trim_start_matches('.')
    }
}
