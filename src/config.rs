use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DENSITY_THRESHOLDS: [f64; 8] = [100.0, 200.0, 300.0, 500.0, 1000.0, 2000.0, 10000.0, 20000.0];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Assumed advance per label character, in px. Band labels use a fixed
    /// metric rather than font measurement so placement is deterministic.
    pub label_font_width: f32,
    pub label_font_height: f32,
    pub margin_top: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    /// The chart never renders smaller than this, whatever the viewport.
    pub min_width: f32,
    pub min_height: f32,
    pub axis_offset_y: f32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            label_font_width: 5.0,
            label_font_height: 12.0,
            margin_top: 40.0,
            margin_left: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            min_width: 1200.0,
            min_height: 700.0,
            axis_offset_y: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoroplethConfig {
    pub padding: f32,
    /// Density cut points (people per km²); one more color than threshold.
    pub thresholds: Vec<f64>,
    pub legend_domain_max: f64,
    pub legend_rect_height: f32,
    pub legend_tick_size: f32,
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            padding: 30.0,
            thresholds: DENSITY_THRESHOLDS.to_vec(),
            legend_domain_max: 45000.0,
            legend_rect_height: 8.0,
            legend_tick_size: 13.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub stream: StreamConfig,
    pub choropleth: ChoroplethConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 700.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

// Partial mirror of `Config` for the on-disk file: every field optional so a
// config file can override a handful of values and inherit the rest.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    theme: Option<ThemeFile>,
    stream: Option<StreamConfigFile>,
    choropleth: Option<ChoroplethConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ThemeFile {
    font_family: Option<String>,
    font_size: Option<f32>,
    label_color: Option<String>,
    axis_color: Option<String>,
    grid_color: Option<String>,
    border_color: Option<String>,
    background: Option<String>,
    density_scheme: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StreamConfigFile {
    label_font_width: Option<f32>,
    label_font_height: Option<f32>,
    margin_top: Option<f32>,
    min_width: Option<f32>,
    min_height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChoroplethConfigFile {
    padding: Option<f32>,
    thresholds: Option<Vec<f64>>,
    legend_domain_max: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;

    if let Some(theme) = parsed.theme {
        if let Some(v) = theme.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = theme.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = theme.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = theme.axis_color {
            config.theme.axis_color = v;
        }
        if let Some(v) = theme.grid_color {
            config.theme.grid_color = v;
        }
        if let Some(v) = theme.border_color {
            config.theme.border_color = v;
        }
        if let Some(v) = theme.background {
            config.theme.background = v;
        }
        if let Some(v) = theme.density_scheme {
            if !v.is_empty() {
                config.theme.density_scheme = v;
            }
        }
    }

    if let Some(stream) = parsed.stream {
        if let Some(v) = stream.label_font_width {
            config.layout.stream.label_font_width = v;
        }
        if let Some(v) = stream.label_font_height {
            config.layout.stream.label_font_height = v;
        }
        if let Some(v) = stream.margin_top {
            config.layout.stream.margin_top = v;
        }
        if let Some(v) = stream.min_width {
            config.layout.stream.min_width = v;
        }
        if let Some(v) = stream.min_height {
            config.layout.stream.min_height = v;
        }
    }

    if let Some(choropleth) = parsed.choropleth {
        if let Some(v) = choropleth.padding {
            config.layout.choropleth.padding = v;
        }
        if let Some(v) = choropleth.thresholds {
            if !v.is_empty() {
                config.layout.choropleth.thresholds = v;
            }
        }
        if let Some(v) = choropleth.legend_domain_max {
            config.layout.choropleth.legend_domain_max = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }

    Ok(config)
}
