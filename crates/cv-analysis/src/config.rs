//! YAML configuration with environment overrides.
//!
//! ```yaml
//! cvvar_path: run042/cvvar.root
//! tree_name: cvvar_tree
//! batch: true
//! opt_stat: false
//! srim:
//!   dir: /data/SRIMdata
//! render:
//!   theme: modern
//!   output: { dpi: 200 }
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use cv_render::RenderConfig;
use serde::Deserialize;

use crate::error::{AnalysisError, Result};
use crate::settings::Settings;
use crate::srim::SrimConfig;

/// Analysis file opened when none is named.
pub const DEFAULT_CVVAR_PATH: &str = "cvvar.root";
/// Event tree read when none is named.
pub const DEFAULT_TREE_NAME: &str = "cvvar_tree";

/// Overrides `cvvar_path`.
pub const ENV_FILE: &str = "CVVAR_FILE";
/// Overrides `tree_name`.
pub const ENV_TREE: &str = "CVVAR_TREE";

/// Everything a session needs: which file, which tree, where the SRIM tables
/// are, and how to draw.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analysis file.
    pub cvvar_path: PathBuf,
    /// Event tree inside it.
    pub tree_name: String,
    /// Initial batch toggle.
    pub batch: bool,
    /// Initial statistics-box toggle.
    pub opt_stat: bool,
    /// SRIM table locations.
    pub srim: SrimConfig,
    /// Raw `render:` section, merged over its theme by [`Self::render_config`].
    pub render: Option<serde_yaml_ng::Value>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            cvvar_path: DEFAULT_CVVAR_PATH.into(),
            tree_name: DEFAULT_TREE_NAME.into(),
            batch: settings.batch,
            opt_stat: settings.opt_stat,
            srim: SrimConfig::default(),
            render: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(yaml).map_err(|e| AnalysisError::Config(e.to_string()))
    }

    /// Read and parse a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|k| std::env::var_os(k));
        Ok(config)
    }

    /// Override fields from `CVVAR_*` variables, read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<OsString>) {
        if let Some(p) = var(ENV_FILE) {
            self.cvvar_path = p.into();
        }
        if let Some(t) = var(ENV_TREE) {
            self.tree_name = t.to_string_lossy().into_owned();
        }
        self.srim.apply_env(var);
    }

    /// Session toggles.
    pub fn settings(&self) -> Settings {
        Settings { batch: self.batch, opt_stat: self.opt_stat }
    }

    /// The `render:` section merged over its theme.
    pub fn render_config(&self) -> Result<RenderConfig> {
        Ok(cv_render::config::resolve_config_value(self.render.clone())?)
    }
}
