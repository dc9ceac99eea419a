use serde::{Deserialize, Serialize};

const OR_RD_9: [&str; 9] = [
    "#fff7ec", "#fee8c8", "#fdd49e", "#fdbb84", "#fc8d59", "#ef6548", "#d7301f", "#b30000",
    "#7f0000",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub label_color: String,
    pub axis_color: String,
    pub grid_color: String,
    pub border_color: String,
    pub border_width: f32,
    pub border_opacity: f32,
    pub background: String,
    pub density_scheme: Vec<String>,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 12.0,
            label_color: "#ffffff".to_string(),
            axis_color: "#333333".to_string(),
            grid_color: "#d0d0d0".to_string(),
            border_color: "#000000".to_string(),
            border_width: 0.5,
            border_opacity: 0.2,
            background: "#ffffff".to_string(),
            density_scheme: OR_RD_9.iter().map(|value| value.to_string()).collect(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

// Cubehelix constants from Green (2011), matching the d3 rainbow ramp.
const CH_A: f32 = -0.14861;
const CH_B: f32 = 1.78277;
const CH_C: f32 = -0.29227;
const CH_D: f32 = -0.90649;
const CH_E: f32 = 1.97294;

/// Cyclical rainbow ramp over `t` in [0, 1]; values outside wrap.
pub fn rainbow(t: f32) -> String {
    let t = t - t.floor();
    let ts = (t - 0.5).abs();
    cubehelix_hex(360.0 * t - 100.0, 1.5 - 1.5 * ts, 0.8 - 0.9 * ts)
}

fn cubehelix_hex(h: f32, s: f32, l: f32) -> String {
    let h = (h + 120.0).to_radians();
    let a = s * l * (1.0 - l);
    let cosh = h.cos();
    let sinh = h.sin();
    let r = 255.0 * (l + a * (CH_A * cosh + CH_B * sinh));
    let g = 255.0 * (l + a * (CH_C * cosh + CH_D * sinh));
    let b = 255.0 * (l + a * (CH_E * cosh));
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
