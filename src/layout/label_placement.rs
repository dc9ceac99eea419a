// In-band label placement for the stream graph. All functions here work
// with pure geometry, no SVG dependency.
//
// A band's outline is an irregular closed polygon; the label wants to sit
// inside it. Candidates are tried in a fixed order: the polygon's area
// centroid first, then the vertical midpoint of each step. The first
// candidate whose full text box lies inside the polygon wins; if none does,
// the band simply renders unlabeled.

/// One step of a band in screen space: the x position and the pixel y of
/// the band's two edges at that x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStep {
    pub x: f32,
    pub lower: f32,
    pub upper: f32,
}

/// Fixed per-character label metrics. Placement deliberately uses a flat
/// advance instead of font measurement so results are deterministic across
/// environments.
#[derive(Debug, Clone, Copy)]
pub struct LabelMetrics {
    pub font_width: f32,
    pub font_height: f32,
}

impl Default for LabelMetrics {
    fn default() -> Self {
        Self {
            font_width: 5.0,
            font_height: 12.0,
        }
    }
}

impl LabelMetrics {
    pub fn footprint(&self, text: &str) -> (f32, f32) {
        (
            text.chars().count() as f32 * self.font_width,
            self.font_height,
        )
    }
}

/// The band outline: upper edge walked forward, lower edge walked back.
/// Implicitly closed (last point connects to the first).
pub fn band_polygon(steps: &[BandStep]) -> Vec<(f32, f32)> {
    let mut polygon = Vec::with_capacity(steps.len() * 2);
    for step in steps {
        polygon.push((step.x, step.upper));
    }
    for step in steps.iter().rev() {
        polygon.push((step.x, step.lower));
    }
    polygon
}

/// Pick a center point for `text` inside the band, or `None` when no
/// candidate fits. Pure and total: degenerate bands (zero area, a single
/// step) and oversized labels all come back `None`.
pub fn place_band_label(
    steps: &[BandStep],
    text: &str,
    metrics: LabelMetrics,
) -> Option<(f32, f32)> {
    if text.is_empty() {
        return None;
    }
    let polygon = band_polygon(steps);
    if polygon.len() < 3 {
        return None;
    }
    let footprint = metrics.footprint(text);

    if let Some(center) = polygon_centroid(&polygon) {
        if label_fits(&polygon, center, footprint) {
            return Some(center);
        }
    }

    for step in steps {
        let midpoint = (step.x, (step.lower + step.upper) / 2.0);
        if label_fits(&polygon, midpoint, footprint) {
            return Some(midpoint);
        }
    }
    None
}

/// True when the label's box, centered at `center`, lies inside the
/// polygon: all four corners must pass the containment test.
pub fn label_fits(polygon: &[(f32, f32)], center: (f32, f32), footprint: (f32, f32)) -> bool {
    let (width, height) = footprint;
    let corners = [
        (center.0 - width / 2.0, center.1 - height / 2.0),
        (center.0 + width / 2.0, center.1 - height / 2.0),
        (center.0 + width / 2.0, center.1 + height / 2.0),
        (center.0 - width / 2.0, center.1 + height / 2.0),
    ];
    corners
        .iter()
        .all(|corner| polygon_contains(polygon, *corner))
}

/// Even-odd ray crossing. Boundary points resolve half-open: a point on
/// the outline counts as inside from exactly one side (bottom/left edges
/// in, top/right edges out for an axis-aligned box), so adjacent bands
/// never both claim a shared edge point.
pub fn polygon_contains(polygon: &[(f32, f32)], point: (f32, f32)) -> bool {
    let (x, y) = point;
    let mut inside = false;
    let mut prev = match polygon.last() {
        Some(last) => *last,
        None => return false,
    };
    for current in polygon {
        let (x1, y1) = *current;
        let (x0, y0) = prev;
        if (y1 > y) != (y0 > y) && x < (x0 - x1) * (y - y1) / (y0 - y1) + x1 {
            inside = !inside;
        }
        prev = *current;
    }
    inside
}

/// Area centroid of a closed polygon; `None` when the area is (numerically)
/// zero, in which case no center of mass is defined.
pub fn polygon_centroid(polygon: &[(f32, f32)]) -> Option<(f32, f32)> {
    if polygon.len() < 3 {
        return None;
    }
    let mut doubled_area = 0.0_f32;
    let mut cx = 0.0_f32;
    let mut cy = 0.0_f32;
    let mut prev = polygon[polygon.len() - 1];
    for current in polygon {
        let cross = prev.0 * current.1 - current.0 * prev.1;
        doubled_area += cross;
        cx += (prev.0 + current.0) * cross;
        cy += (prev.1 + current.1) * cross;
        prev = *current;
    }
    if doubled_area.abs() < f32::EPSILON {
        return None;
    }
    let k = doubled_area * 3.0;
    Some((cx / k, cy / k))
}
