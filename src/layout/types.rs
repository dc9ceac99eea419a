use super::curve::PathCommand;
use super::label_placement::BandStep;

#[derive(Debug, Clone)]
pub struct StreamLayout {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub axis: StreamAxisLayout,
    pub bands: Vec<BandLayout>,
}

/// Top axis: one tick per reporting date, grid line down the full chart.
#[derive(Debug, Clone)]
pub struct StreamAxisLayout {
    pub y: f32,
    pub ticks: Vec<(String, f32)>,
    pub grid_length: f32,
}

#[derive(Debug, Clone)]
pub struct BandLayout {
    pub ticker: String,
    pub label: String,
    pub color: String,
    pub outline: Vec<PathCommand>,
    pub steps: Vec<BandStep>,
    /// Absent when no point inside the band can host the label; the
    /// renderer then emits no text for this band.
    pub label_anchor: Option<(f32, f32)>,
}

#[derive(Debug, Clone)]
pub struct ChoroplethLayout {
    pub width: f32,
    pub height: f32,
    pub regions: Vec<RegionLayout>,
    pub borders: Vec<Vec<PathCommand>>,
    pub legend: LegendLayout,
}

#[derive(Debug, Clone)]
pub struct RegionLayout {
    pub path: Vec<PathCommand>,
    pub color: String,
    pub title: String,
}

/// The color key strip: one cell per scheme color over its density extent,
/// ticks at the threshold cut points.
#[derive(Debug, Clone)]
pub struct LegendLayout {
    pub cells: Vec<LegendCell>,
    pub ticks: Vec<(String, f32)>,
    pub rect_height: f32,
    pub tick_size: f32,
}

#[derive(Debug, Clone)]
pub struct LegendCell {
    pub x: f32,
    pub width: f32,
    pub color: String,
}
