use std::f64::consts::FRAC_PI_4;

use super::curve::PathCommand;
use super::scale::{SqrtScale, ThresholdScale};
use super::types::{ChoroplethLayout, LegendCell, LegendLayout, RegionLayout};
use crate::config::{LayoutConfig, RenderConfig};
use crate::ir::{DistrictTable, FeatureSet, GeoFeature};
use crate::theme::Theme;

pub fn compute_choropleth_layout(
    districts: &FeatureSet,
    states: &FeatureSet,
    population: &DistrictTable,
    theme: &Theme,
    config: &LayoutConfig,
    render: &RenderConfig,
) -> ChoroplethLayout {
    let choropleth = &config.choropleth;
    let width = render.width;
    let height = render.height;
    let pad = choropleth.padding as f64;

    // The projection is fitted to the district layer; the state overlay
    // shares it so the borders line up.
    let projection = Mercator::fit_extent(
        ((pad, pad), (width as f64 - pad, height as f64 - pad)),
        districts,
    );

    let thresholds = ThresholdScale::new(choropleth.thresholds.clone());
    let scheme = &theme.density_scheme;

    let mut regions = Vec::with_capacity(districts.features.len());
    for feature in &districts.features {
        let record = feature
            .census_code()
            .and_then(|code| population.get(code));
        let density = record.map(|r| r.density()).unwrap_or(0.0);
        let bucket = thresholds.bucket(density);
        let color = scheme
            .get(bucket)
            .or_else(|| scheme.last())
            .cloned()
            .unwrap_or_else(|| "#000000".to_string());
        regions.push(RegionLayout {
            path: feature_path(feature, &projection),
            color,
            title: region_title(feature, density, record.and_then(|r| r.total), record.and_then(|r| r.area)),
        });
    }

    let borders = states
        .features
        .iter()
        .map(|feature| feature_path(feature, &projection))
        .collect();

    ChoroplethLayout {
        width,
        height,
        regions,
        borders,
        legend: legend_layout(&thresholds, scheme, choropleth.legend_domain_max, width, choropleth),
    }
}

fn region_title(
    feature: &GeoFeature,
    density: f64,
    total: Option<u64>,
    area: Option<u64>,
) -> String {
    const MISSING: &str = "Data Not Available";
    let density_text = if density > 0.0 {
        format!("{:.2} km²", density)
    } else {
        MISSING.to_string()
    };
    let total_text = total
        .map(|t| t.to_string())
        .unwrap_or_else(|| MISSING.to_string());
    let area_text = area
        .map(|a| format!("{} km²", a))
        .unwrap_or_else(|| MISSING.to_string());
    format!(
        "Density: {}\nTotal: {}\nArea: {}\nDistrict: {}\nState: {}",
        density_text,
        total_text,
        area_text,
        feature.district_name().unwrap_or("Unknown"),
        feature.state_name().unwrap_or("Unknown"),
    )
}

fn feature_path(feature: &GeoFeature, projection: &Mercator) -> Vec<PathCommand> {
    let mut path = Vec::new();
    for polygon in &feature.polygons {
        for ring in polygon {
            let mut points = ring.iter().map(|point| projection.project(*point));
            let Some(first) = points.next() else {
                continue;
            };
            path.push(PathCommand::MoveTo(first));
            for point in points {
                path.push(PathCommand::LineTo(point));
            }
            path.push(PathCommand::Close);
        }
    }
    path
}

fn legend_layout(
    thresholds: &ThresholdScale,
    scheme: &[String],
    domain_max: f64,
    width: f32,
    config: &crate::config::ChoroplethConfig,
) -> LegendLayout {
    let x = SqrtScale::rounded((0.0, domain_max), (0.0, width as f64));
    let (domain_lo, domain_hi) = x.domain();

    let mut cells = Vec::with_capacity(thresholds.bucket_count());
    for bucket in 0..thresholds.bucket_count() {
        let (lo, hi) = thresholds.invert_extent(bucket);
        let lo = lo.unwrap_or(domain_lo);
        let hi = hi.unwrap_or(domain_hi);
        let x0 = x.scale(lo) as f32;
        let x1 = x.scale(hi) as f32;
        let color = scheme
            .get(bucket)
            .or_else(|| scheme.last())
            .cloned()
            .unwrap_or_else(|| "#000000".to_string());
        cells.push(LegendCell {
            x: x0,
            width: (x1 - x0).max(0.0),
            color,
        });
    }

    let ticks = thresholds
        .thresholds()
        .iter()
        .map(|value| (format_thousands(*value), x.scale(*value) as f32))
        .collect();

    LegendLayout {
        cells,
        ticks,
        rect_height: config.legend_rect_height,
        tick_size: config.legend_tick_size,
    }
}

// "20000" -> "20,000", matching the axis labels of the source chart.
fn format_thousands(value: f64) -> String {
    let raw = format!("{:.0}", value);
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}", sign, grouped)
}

/// Spherical Mercator with the y axis flipped for screen space, scaled and
/// translated so the fitted feature set fills a padded extent.
#[derive(Debug, Clone, Copy)]
struct Mercator {
    k: f64,
    tx: f64,
    ty: f64,
}

impl Mercator {
    fn raw(lon: f64, lat: f64) -> (f64, f64) {
        // Clamp latitude away from the poles where the projection blows up.
        let lat = lat.clamp(-89.9999, 89.9999);
        (
            lon.to_radians(),
            -((FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln()),
        )
    }

    fn fit_extent(extent: ((f64, f64), (f64, f64)), features: &FeatureSet) -> Self {
        let ((ex0, ey0), (ex1, ey1)) = extent;
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (lon, lat) in features.points() {
            let (x, y) = Self::raw(lon, lat);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if !min_x.is_finite() {
            return Self {
                k: 1.0,
                tx: 0.0,
                ty: 0.0,
            };
        }
        let dx = (max_x - min_x).max(f64::EPSILON);
        let dy = (max_y - min_y).max(f64::EPSILON);
        let k = ((ex1 - ex0) / dx).min((ey1 - ey0) / dy).max(0.0);
        Self {
            k,
            tx: ex0 + ((ex1 - ex0) - k * dx) / 2.0 - k * min_x,
            ty: ey0 + ((ey1 - ey0) - k * dy) / 2.0 - k * min_y,
        }
    }

    fn project(&self, point: (f64, f64)) -> (f32, f32) {
        let (x, y) = Self::raw(point.0, point.1);
        ((self.k * x + self.tx) as f32, (self.k * y + self.ty) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::DistrictRecord;

    fn square_feature(code: u32, lon0: f64, lat0: f64, size: f64) -> GeoFeature {
        GeoFeature {
            properties: serde_json::json!({
                "censuscode": code,
                "DISTRICT": format!("D{code}"),
                "ST_NM": "Teststate",
            }),
            polygons: vec![vec![vec![
                (lon0, lat0),
                (lon0 + size, lat0),
                (lon0 + size, lat0 + size),
                (lon0, lat0 + size),
                (lon0, lat0),
            ]]],
        }
    }

    fn dataset() -> (FeatureSet, FeatureSet, DistrictTable) {
        let districts = FeatureSet {
            features: vec![
                square_feature(1, 70.0, 10.0, 5.0),
                square_feature(2, 75.0, 10.0, 5.0),
                square_feature(3, 70.0, 15.0, 5.0),
            ],
        };
        let states = FeatureSet {
            features: vec![square_feature(99, 70.0, 10.0, 10.0)],
        };
        let mut population = DistrictTable::default();
        population.records.insert(
            1,
            DistrictRecord {
                code: 1,
                total: Some(50_000),
                area: Some(1000),
            },
        );
        population.records.insert(
            2,
            DistrictRecord {
                code: 2,
                total: Some(30_000_000),
                area: Some(1000),
            },
        );
        (districts, states, population)
    }

    fn defaults() -> (Theme, LayoutConfig, RenderConfig) {
        (Theme::classic(), LayoutConfig::default(), RenderConfig::default())
    }

    #[test]
    fn projected_regions_fit_the_padded_extent() {
        let (districts, states, population) = dataset();
        let (theme, config, render) = defaults();
        let layout =
            compute_choropleth_layout(&districts, &states, &population, &theme, &config, &render);
        let pad = config.choropleth.padding;
        for region in &layout.regions {
            for command in &region.path {
                let point = match command {
                    PathCommand::MoveTo(p) | PathCommand::LineTo(p) => *p,
                    _ => continue,
                };
                assert!(point.0 >= pad - 0.5 && point.0 <= layout.width - pad + 0.5);
                assert!(point.1 >= pad - 0.5 && point.1 <= layout.height - pad + 0.5);
            }
        }
    }

    #[test]
    fn density_buckets_pick_scheme_colors() {
        let (districts, states, population) = dataset();
        let (theme, config, render) = defaults();
        let layout =
            compute_choropleth_layout(&districts, &states, &population, &theme, &config, &render);
        // District 1: density 50 -> below every threshold, lightest color.
        assert_eq!(layout.regions[0].color, theme.density_scheme[0]);
        // District 2: density 30000 -> above the last cut, darkest color.
        assert_eq!(layout.regions[1].color, theme.density_scheme[8]);
        // District 3 has no census record: density 0, lightest color.
        assert_eq!(layout.regions[2].color, theme.density_scheme[0]);
    }

    #[test]
    fn titles_spell_out_missing_data() {
        let (districts, states, population) = dataset();
        let (theme, config, render) = defaults();
        let layout =
            compute_choropleth_layout(&districts, &states, &population, &theme, &config, &render);
        assert_eq!(
            layout.regions[0].title,
            "Density: 50.00 km²\nTotal: 50000\nArea: 1000 km²\nDistrict: D1\nState: Teststate"
        );
        assert!(layout.regions[2].title.contains("Density: Data Not Available"));
        assert!(layout.regions[2].title.contains("District: D3"));
    }

    #[test]
    fn legend_cells_tile_the_scale_left_to_right() {
        let (districts, states, population) = dataset();
        let (theme, config, render) = defaults();
        let layout =
            compute_choropleth_layout(&districts, &states, &population, &theme, &config, &render);
        let legend = &layout.legend;
        assert_eq!(legend.cells.len(), theme.density_scheme.len());
        assert_eq!(legend.cells[0].x, 0.0);
        for (a, b) in legend.cells.iter().zip(legend.cells.iter().skip(1)) {
            assert!((a.x + a.width - b.x).abs() < 1e-3);
        }
        let ticks: Vec<&str> = legend.ticks.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            ticks,
            vec!["100", "200", "300", "500", "1,000", "2,000", "10,000", "20,000"]
        );
    }

    #[test]
    fn state_borders_share_the_projection() {
        let (districts, states, population) = dataset();
        let (theme, config, render) = defaults();
        let layout =
            compute_choropleth_layout(&districts, &states, &population, &theme, &config, &render);
        assert_eq!(layout.borders.len(), 1);
        // The state square spans the same ground as the districts, so its
        // outline stays inside the same padded extent.
        for command in &layout.borders[0] {
            if let PathCommand::MoveTo(p) | PathCommand::LineTo(p) = command {
                assert!(p.0 >= config.choropleth.padding - 0.5);
                assert!(p.1 >= config.choropleth.padding - 0.5);
            }
        }
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(100.0), "100");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(20000.0), "20,000");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
    }
}
