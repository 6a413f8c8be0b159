//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/boxtree/boxtree.toml`
//! 3. Local config: an explicit file given by the caller
//! 4. Environment variables: `BOXTREE_*` prefix, `__` between nested keys
//!    (e.g. `BOXTREE_RENDER__INDENT`)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::render::{Renderer, INDENT_UNIT};
use crate::error::BoxtreeError;

/// How a tree is laid out when rendered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// One line per node, indented by depth.
    #[default]
    Plain,
    /// Box-drawing branches.
    Tree,
}

impl FromStr for RenderStyle {
    type Err = BoxtreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(RenderStyle::Plain),
            "tree" => Ok(RenderStyle::Tree),
            other => Err(BoxtreeError::Config {
                message: format!("unknown render style: {other}"),
            }),
        }
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStyle::Plain => f.write_str("plain"),
            RenderStyle::Tree => f.write_str("tree"),
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// Indent unit repeated once per nesting level (default: one tab)
    pub indent: String,
    pub style: RenderStyle,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            indent: INDENT_UNIT.to_string(),
            style: RenderStyle::Plain,
        }
    }
}

/// Raw render settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderSettings {
    pub indent: Option<String>,
    pub style: Option<RenderStyle>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub render: RawRenderSettings,
}

/// Unified configuration for boxtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub render: RenderSettings,
}

/// Get the XDG config directory for boxtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "boxtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("boxtree.toml"))
}

/// Environment source for `BOXTREE_*` overrides.
pub fn env_source() -> Environment {
    Environment::with_prefix("BOXTREE")
        .prefix_separator("_")
        .separator("__")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, BoxtreeError> {
    let content = std::fs::read_to_string(path).map_err(|e| BoxtreeError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| BoxtreeError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> BoxtreeError {
    BoxtreeError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            render: RenderSettings {
                indent: overlay
                    .render
                    .indent
                    .clone()
                    .unwrap_or_else(|| self.render.indent.clone()),
                style: overlay.render.style.unwrap_or(self.render.style),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file that overrides the global one
    pub fn load(local: Option<&Path>) -> Result<Self, BoxtreeError> {
        let global = global_config_path();
        Self::load_layers(global.as_deref(), local, env_source())
    }

    /// Load settings from explicit layers. Missing files are skipped.
    #[instrument(level = "debug", skip(env))]
    pub fn load_layers(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Environment,
    ) -> Result<Self, BoxtreeError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, 3. local config
        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                debug!(path = %path.display(), "merging config file");
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current.apply_env_overrides(env)
    }

    /// Apply environment variables as explicit overrides.
    fn apply_env_overrides(mut self, env: Environment) -> Result<Self, BoxtreeError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("render.indent") {
            self.render.indent = val;
        }
        if let Ok(val) = config.get_string("render.style") {
            self.render.style = val.parse()?;
        }

        Ok(self)
    }

    /// Renderer configured from the `render` section.
    pub fn renderer(&self) -> Renderer {
        Renderer::from_settings(&self.render)
    }

    /// Serialize the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, BoxtreeError> {
        toml::to_string_pretty(self).map_err(|e| BoxtreeError::Config {
            message: format!("serialize settings: {e}"),
        })
    }
}

/// Holder of the current [`Settings`] snapshot.
///
/// Readers take an immutable `Arc` snapshot; writers swap in a whole new
/// value with [`SharedSettings::replace`], which only succeeds if the caller
/// still holds the current snapshot.
#[derive(Debug, Default)]
pub struct SharedSettings {
    current: Mutex<Arc<Settings>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: Mutex::new(Arc::new(settings)),
        }
    }

    pub fn snapshot(&self) -> Arc<Settings> {
        let guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Replace `old` with `new`. Returns `false` and leaves the settings
    /// untouched if `old` is no longer the current snapshot.
    pub fn replace(&self, old: &Arc<Settings>, new: Settings) -> bool {
        let mut guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if !Arc::ptr_eq(&*guard, old) {
            debug!("stale settings snapshot, replace rejected");
            return false;
        }
        *guard = Arc::new(new);
        true
    }
}
