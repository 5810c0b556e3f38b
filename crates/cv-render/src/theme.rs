use crate::color::Color;
use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    /// Classic ROOT canvas look.
    Root,
    Modern,
    Minimal,
}

impl BuiltinTheme {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "modern" => Self::Modern,
            "minimal" => Self::Minimal,
            _ => Self::Root,
        }
    }

    pub fn base_config(self) -> RenderConfig {
        match self {
            Self::Root => root(),
            Self::Modern => modern(),
            Self::Minimal => minimal(),
        }
    }
}

fn root() -> RenderConfig {
    RenderConfig {
        theme: "root".into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        colors: ColorsConfig::default(),
        colormap: "bird".into(),
        stats: StatsConfig::default(),
        hist2d: Hist2DConfig::default(),
        output: OutputConfig::default(),
    }
}

fn modern() -> RenderConfig {
    RenderConfig {
        theme: "modern".into(),
        figure: FigureConfig { width: 640.0, height: 440.0 },
        font: FontConfig { size: 10.0, title_size: 13.0, label_size: 11.0, tick_size: 9.0 },
        grid: GridConfig { show: true, ..GridConfig::default() },
        colors: ColorsConfig {
            frame: Color::hex("#334155"),
            text: Color::hex("#111827"),
            line: Color::hex("#1D4ED8"),
            fill: Color::hex("#93C5FD"),
            marker: Color::hex("#111827"),
            ..ColorsConfig::default()
        },
        colormap: "viridis".into(),
        ..root()
    }
}

fn minimal() -> RenderConfig {
    RenderConfig {
        theme: "minimal".into(),
        figure: FigureConfig { width: 480.0, height: 340.0 },
        font: FontConfig { size: 9.0, title_size: 11.0, label_size: 10.0, tick_size: 8.0 },
        axes: AxesConfig {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 4.0,
            minor_tick_length: 2.0,
            line_width: 0.8,
        },
        stats: StatsConfig { show: false, ..StatsConfig::default() },
        colormap: "grayscale".into(),
        ..root()
    }
}
