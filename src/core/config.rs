// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Configuration Module
//!
//! Configuration for the ToolHub site generator. Values come from, in order
//! of increasing precedence: built-in defaults, a TOML file, environment
//! variables sharing a prefix, and explicit overrides (typically CLI flags).
//! The result is validated before it is handed to the pipeline.
//!
//! ## Example
//!
//! ```rust,no_run
//! use toolhub::core::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_file("toolhub.toml")
//!     .with_env_prefix("TOOLHUB_")
//!     .with_override("site.base_url", "https://reviews.example.org")
//!     .build()
//!     .unwrap();
//!
//! assert!(config.output.redirect_stubs);
//! assert_eq!(config.site.tools_root, "tools");
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml::Value as TomlValue;

use crate::core::error::{Result, ToolHubError};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the `tools/` and `comparisons/` record folders.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Directory receiving the generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Optional directory of `.hbs` files overriding the built-in templates.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Public site settings used to build URLs and metadata.
    #[serde(default)]
    pub site: SiteConfig,

    /// Catalog loading settings.
    #[serde(default)]
    pub content: ContentConfig,

    /// Template rendering settings.
    #[serde(default)]
    pub template: TemplateConfig,

    /// Output generation settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Free-form user values.
    #[serde(default)]
    pub custom: HashMap<String, TomlValue>,
}

/// Public site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute base URL, used for canonical links and structured data.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Single path segment under which every tool page lives.
    #[serde(default = "default_tools_root")]
    pub tools_root: String,

    /// Site name, used as the review author and in hub titles.
    #[serde(default = "default_site_name")]
    pub name: String,
}

/// Catalog loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// Run the build-time integrity checks after loading.
    #[serde(default = "default_true")]
    pub validate: bool,

    /// Record file extensions that are loaded; others are skipped.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Template rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Fail on missing template variables instead of rendering them empty.
    #[serde(default)]
    pub strict_mode: bool,
}

/// Output generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Minify generated HTML.
    #[serde(default)]
    pub minify: bool,

    /// Emit redirect stubs for legacy tag URLs and the root `404.html`.
    #[serde(default = "default_true")]
    pub redirect_stubs: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tools_root: default_tools_root(),
            name: default_site_name(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            validate: true,
            extensions: default_extensions(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            minify: false,
            redirect_stubs: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
            template_dir: None,
            site: SiteConfig::default(),
            content: ContentConfig::default(),
            template: TemplateConfig::default(),
            output: OutputConfig::default(),
            custom: HashMap::new(),
        }
    }
}

/// Builds a validated [`Config`] from layered sources.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: Vec<(String, TomlValue)>,
}

impl ConfigBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the given TOML file before applying any other source.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Applies environment variables starting with `prefix`.
    ///
    /// `TOOLHUB_OUTPUT_DIR` maps to `output_dir`; a double underscore
    /// separates sections, so `TOOLHUB_SITE__BASE_URL` maps to
    /// `site.base_url`.
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Overrides a single key. Overrides are applied last, in call order.
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TomlValue>,
    {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Layers every source and validates the result.
    pub fn build(self) -> Result<Config> {
        let mut config = match &self.config_file {
            Some(path) => load_from_file(path)?,
            None => Config::default(),
        };

        if let Some(prefix) = &self.env_prefix {
            apply_env_overrides(&mut config, prefix)?;
        }

        for (key, value) in &self.overrides {
            apply_config_value(&mut config, key, value)?;
        }

        validate_config(&config)?;
        log::debug!("configuration resolved: {:?}", config);
        Ok(config)
    }
}

impl Config {
    /// Re-runs validation on a configuration assembled by hand.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }

    /// Reads a custom value, converting it to `T`.
    pub fn get_custom<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>> {
        self.custom
            .get(key)
            .map(|v| {
                TomlValue::try_into(v.clone()).map_err(|e| {
                    ToolHubError::configuration(
                        format!("Invalid custom config value: {}", e),
                        None,
                        None,
                    )
                })
            })
            .transpose()
    }
}

fn load_from_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        ToolHubError::configuration(
            "Failed to read config file",
            Some(path.to_path_buf()),
            Some(Box::new(e)),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        ToolHubError::configuration(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
            None,
        )
    })
}

fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<()> {
    let mut vars: Vec<(String, String)> = env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect();
    vars.sort();

    for (key, value) in vars {
        let stripped = key[prefix.len()..].trim_start_matches('_');
        if stripped.is_empty() {
            continue;
        }
        let config_key = stripped.to_lowercase().replace("__", ".");
        apply_config_value(config, &config_key, &TomlValue::String(value))?;
    }
    Ok(())
}

fn value_to_string(value: &TomlValue) -> String {
    match value {
        TomlValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.parse().map_err(|e| {
        ToolHubError::configuration(
            format!("Invalid {} value '{}': {}", key, value, e),
            None,
            None,
        )
    })
}

fn apply_config_value(
    config: &mut Config,
    key: &str,
    value: &TomlValue,
) -> Result<()> {
    let value_str = value_to_string(value);
    match key {
        "content_dir" => config.content_dir = PathBuf::from(value_str),
        "output_dir" => config.output_dir = PathBuf::from(value_str),
        "template_dir" => {
            config.template_dir = Some(PathBuf::from(value_str))
        }
        _ => {
            let Some((section, field)) = key.split_once('.') else {
                return Err(ToolHubError::configuration(
                    format!("Unknown configuration key: {}", key),
                    None,
                    None,
                ));
            };
            match (section, field) {
                ("site", "base_url") => config.site.base_url = value_str,
                ("site", "tools_root") => {
                    config.site.tools_root = value_str
                }
                ("site", "name") => config.site.name = value_str,
                ("content", "validate") => {
                    config.content.validate = parse_bool(key, &value_str)?
                }
                ("content", "extensions") => {
                    config.content.extensions = match value {
                        TomlValue::Array(items) => {
                            items.iter().map(value_to_string).collect()
                        }
                        _ => value_str
                            .split(',')
                            .map(|ext| ext.trim().to_string())
                            .filter(|ext| !ext.is_empty())
                            .collect(),
                    }
                }
                ("template", "strict_mode") => {
                    config.template.strict_mode =
                        parse_bool(key, &value_str)?
                }
                ("output", "minify") => {
                    config.output.minify = parse_bool(key, &value_str)?
                }
                ("output", "redirect_stubs") => {
                    config.output.redirect_stubs =
                        parse_bool(key, &value_str)?
                }
                ("custom", other) => {
                    _ = config.custom.insert(other.to_string(), value.clone());
                }
                ("site" | "content" | "template" | "output", _) => {
                    return Err(ToolHubError::configuration(
                        format!("Unknown configuration key: {}", key),
                        None,
                        None,
                    ));
                }
                _ => {
                    return Err(ToolHubError::configuration(
                        format!("Unknown configuration section: {}", section),
                        None,
                        None,
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    validate_dir(&config.content_dir, "content")?;

    if let Some(template_dir) = &config.template_dir {
        validate_dir(template_dir, "template")?;
    }

    if config.content.extensions.is_empty() {
        return Err(ToolHubError::configuration(
            "No content extensions specified",
            None,
            None,
        ));
    }

    let base_url = &config.site.base_url;
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        return Err(ToolHubError::configuration(
            format!("site.base_url must be an http(s) URL, got '{}'", base_url),
            None,
            None,
        ));
    }

    let root = config.site.tools_root.trim_matches('/');
    if root.is_empty() || root.contains('/') {
        return Err(ToolHubError::configuration(
            format!(
                "site.tools_root must be a single path segment, got '{}'",
                config.site.tools_root
            ),
            None,
            None,
        ));
    }

    Ok(())
}

fn validate_dir(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        return Err(ToolHubError::configuration(
            format!("{} directory does not exist: {}", name, path.display()),
            Some(path.to_path_buf()),
            None,
        ));
    }

    if !path.is_dir() {
        return Err(ToolHubError::configuration(
            format!("{} path is not a directory: {}", name, path.display()),
            Some(path.to_path_buf()),
            None,
        ));
    }

    Ok(())
}

fn default_true() -> bool {
    true
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_base_url() -> String {
    "https://example.com".to_string()
}

fn default_tools_root() -> String {
    "tools".to_string()
}

fn default_site_name() -> String {
    "ToolHub".to_string()
}

fn default_extensions() -> Vec<String> {
    ["toml", "yaml", "yml", "json"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}
