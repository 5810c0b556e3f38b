use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::color::{Color, Colormap};
use crate::theme::BuiltinTheme;

/// Top-level render configuration (YAML or programmatic).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub theme: String,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub colors: ColorsConfig,
    pub colormap: String,
    pub stats: StatsConfig,
    pub hist2d: Hist2DConfig,
    pub output: OutputConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        BuiltinTheme::Root.base_config()
    }
}

impl RenderConfig {
    pub fn colormap(&self) -> Colormap {
        Colormap::parse(&self.colormap)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        // TCanvas default of 700x500 pixels
        Self { width: 700.0, height: 500.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub size: f64,
    pub title_size: f64,
    pub label_size: f64,
    pub tick_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { size: 11.0, title_size: 14.0, label_size: 12.0, tick_size: 10.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
    pub line_width: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 8.0,
            minor_tick_length: 4.0,
            line_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: false, color: Color::hex("#CBD5E1"), alpha: 0.55 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub background: Color,
    pub frame: Color,
    pub text: Color,
    pub line: Color,
    pub fill: Color,
    pub marker: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: Color::hex("#ffffff"),
            frame: Color::hex("#000000"),
            text: Color::hex("#000000"),
            // kBlue+2 outline and kAzure-9 fill
            line: Color::hex("#000099"),
            fill: Color::hex("#99ccff"),
            marker: Color::hex("#000000"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Default for the statistics box; `SetOptStat` overrides it per save.
    pub show: bool,
    pub font_size: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { show: true, font_size: 10.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hist2DConfig {
    /// Upper bound on markers drawn per plot in `SCAT` mode.
    pub scatter_max_markers: usize,
    pub colorbar_width: f64,
}

impl Default for Hist2DConfig {
    fn default() -> Self {
        Self { scatter_max_markers: 20_000, colorbar_width: 16.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dpi: 144 }
    }
}

/// Resolve a RenderConfig from an optional YAML string.
/// Priority: user YAML overrides → theme base config.
pub fn resolve_config(user_yaml: Option<&str>) -> crate::Result<RenderConfig> {
    let user = match user_yaml {
        None => None,
        Some(yaml) => Some(
            serde_yaml_ng::from_str::<Value>(yaml)
                .map_err(|e| crate::RenderError::Config(e.to_string()))?,
        ),
    };
    resolve_config_value(user)
}

/// Like [`resolve_config`], for a `render:` section already parsed as part of
/// a larger document.
pub fn resolve_config_value(user: Option<Value>) -> crate::Result<RenderConfig> {
    let user = match user {
        None | Some(Value::Null) => return Ok(RenderConfig::default()),
        Some(v @ Value::Mapping(_)) => v,
        Some(other) => {
            return Err(crate::RenderError::Config(format!(
                "render configuration must be a mapping, got {other:?}"
            )));
        }
    };
    let theme = user.get("theme").and_then(Value::as_str).map(BuiltinTheme::parse);
    let base = theme.unwrap_or(BuiltinTheme::Root).base_config();
    let mut merged =
        serde_yaml_ng::to_value(&base).map_err(|e| crate::RenderError::Config(e.to_string()))?;
    merge(&mut merged, user);
    serde_yaml_ng::from_value(merged).map_err(|e| crate::RenderError::Config(e.to_string()))
}

/// Deep-merge `over` into `base`; mappings merge key by key, anything else
/// replaces.
fn merge(base: &mut Value, over: Value) {
    match (base, over) {
        (Value::Mapping(b), Value::Mapping(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}
