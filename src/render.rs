use crate::config::LayoutConfig;
use crate::layout::{
    ChoroplethLayout, Layout, PathCommand, StreamLayout,
};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width();
    let height = layout.height();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    match layout {
        Layout::Stream(stream) => render_stream(&mut svg, stream, theme, config),
        Layout::Choropleth(choropleth) => render_choropleth(&mut svg, choropleth, theme),
    }

    svg.push_str("</svg>");
    svg
}

fn render_stream(svg: &mut String, layout: &StreamLayout, theme: &Theme, config: &LayoutConfig) {
    // Top axis: a grid line per reporting date with its label above.
    svg.push_str(&format!(
        "<g class=\"x axis\" transform=\"translate({:.2}, {:.2})\">",
        layout.margin_left, layout.axis.y
    ));
    for (label, x) in &layout.axis.ticks {
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"0\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
            layout.axis.grid_length, theme.grid_color
        ));
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"-4\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"10\" fill=\"{}\">{}</text>",
            theme.font_family,
            theme.axis_color,
            escape_xml(label)
        ));
    }
    svg.push_str("</g>");

    svg.push_str(&format!(
        "<g transform=\"translate({:.2}, {:.2})\">",
        layout.margin_left, layout.margin_top
    ));
    for band in &layout.bands {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\"><title>{}</title></path>",
            path_data(&band.outline),
            band.color,
            escape_xml(&band.label)
        ));
    }
    // Labels go above every band so no band paints over a neighbor's text.
    for band in &layout.bands {
        let Some((x, y)) = band.label_anchor else {
            continue;
        };
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" dy=\"0.32em\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            theme.font_family,
            config.stream.label_font_height,
            theme.label_color,
            escape_xml(&band.label)
        ));
    }
    svg.push_str("</g>");
}

fn render_choropleth(svg: &mut String, layout: &ChoroplethLayout, theme: &Theme) {
    svg.push_str("<g class=\"districts\">");
    for region in &layout.regions {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\"><title>{}</title></path>",
            path_data(&region.path),
            region.color,
            escape_xml(&region.title)
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"states\">");
    for border in &layout.borders {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\"/>",
            path_data(border),
            theme.border_color,
            theme.border_width,
            theme.border_opacity
        ));
    }
    svg.push_str("</g>");

    let legend = &layout.legend;
    svg.push_str("<g class=\"key\">");
    for cell in &legend.cells {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            cell.x, cell.width, legend.rect_height, cell.color
        ));
    }
    for (label, x) in &legend.ticks {
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"0\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\"/>",
            legend.tick_size, theme.axis_color
        ));
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{:.2}\" dy=\"0.71em\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"10\" fill=\"{}\">{}</text>",
            legend.tick_size + 2.0,
            theme.font_family,
            theme.axis_color,
            escape_xml(label)
        ));
    }
    svg.push_str("</g>");
}

fn path_data(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for command in commands {
        match command {
            PathCommand::MoveTo((x, y)) => {
                d.push_str(&format!("M {x:.2} {y:.2}"));
            }
            PathCommand::LineTo((x, y)) => {
                d.push_str(&format!(" L {x:.2} {y:.2}"));
            }
            PathCommand::CurveTo((x1, y1), (x2, y2), (x, y)) => {
                d.push_str(&format!(
                    " C {x1:.2} {y1:.2}, {x2:.2} {y2:.2}, {x:.2} {y:.2}"
                ));
            }
            PathCommand::Close => {
                d.push_str(" Z");
            }
        }
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path) -> Result<()> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::ir::{DistrictTable, FeatureSet, GeoFeature, PortfolioTable};
    use crate::layout::{compute_choropleth_layout, compute_stream_layout};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn stream_layout() -> Layout {
        let mut labels = BTreeMap::new();
        labels.insert("ACME".to_string(), "Acme & Sons".to_string());
        let table = PortfolioTable {
            dates: vec![
                NaiveDate::from_ymd_opt(2016, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2016, 5, 1).unwrap(),
            ],
            tickers: vec!["ACME".to_string()],
            labels,
            values: vec![vec![100.0], vec![120.0]],
        };
        Layout::Stream(compute_stream_layout(
            &table,
            &Theme::classic(),
            &LayoutConfig::default(),
            &RenderConfig::default(),
        ))
    }

    #[test]
    fn stream_svg_has_bands_axis_and_escaped_label() {
        let layout = stream_layout();
        let svg = render_svg(&layout, &Theme::classic(), &LayoutConfig::default());
        assert!(svg.contains("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("class=\"x axis\""));
        assert!(svg.contains("Apr 16"));
        // Ampersand in the company name must be escaped everywhere.
        assert!(svg.contains("Acme &amp; Sons"));
        assert!(!svg.contains("Acme & Sons"));
    }

    #[test]
    fn unplaced_labels_emit_no_text() {
        let table = PortfolioTable {
            dates: vec![
                NaiveDate::from_ymd_opt(2016, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2016, 5, 1).unwrap(),
            ],
            tickers: vec!["A".to_string(), "B".to_string()],
            labels: BTreeMap::new(),
            values: vec![vec![1000.0, 0.0], vec![1200.0, 0.0]],
        };
        let layout = Layout::Stream(compute_stream_layout(
            &table,
            &Theme::classic(),
            &LayoutConfig::default(),
            &RenderConfig::default(),
        ));
        let svg = render_svg(&layout, &Theme::classic(), &LayoutConfig::default());
        // Band B is empty at every step: its path exists, its label does not.
        let Layout::Stream(stream) = &layout else {
            unreachable!()
        };
        assert_eq!(stream.bands[1].label_anchor, None);
        assert!(svg.contains("<title>B</title>"));
        assert!(!svg.contains(">B</text>"));
    }

    #[test]
    fn choropleth_svg_has_regions_borders_and_key() {
        let districts = FeatureSet {
            features: vec![GeoFeature {
                properties: serde_json::json!({"censuscode": 1, "DISTRICT": "D1", "ST_NM": "S"}),
                polygons: vec![vec![vec![
                    (70.0, 10.0),
                    (75.0, 10.0),
                    (75.0, 15.0),
                    (70.0, 15.0),
                    (70.0, 10.0),
                ]]],
            }],
        };
        let layout = Layout::Choropleth(compute_choropleth_layout(
            &districts,
            &districts,
            &DistrictTable::default(),
            &Theme::classic(),
            &LayoutConfig::default(),
            &RenderConfig::default(),
        ));
        let svg = render_svg(&layout, &Theme::classic(), &LayoutConfig::default());
        assert!(svg.contains("class=\"districts\""));
        assert!(svg.contains("class=\"states\""));
        assert!(svg.contains("class=\"key\""));
        assert!(svg.contains("Data Not Available"));
        assert!(svg.contains("20,000"));
    }

    #[test]
    fn path_data_serializes_all_command_kinds() {
        let d = path_data(&[
            PathCommand::MoveTo((0.0, 1.0)),
            PathCommand::CurveTo((1.0, 1.0), (2.0, 2.0), (3.0, 1.5)),
            PathCommand::LineTo((4.0, 0.0)),
            PathCommand::Close,
        ]);
        assert_eq!(d, "M 0.00 1.00 C 1.00 1.00, 2.00 2.00, 3.00 1.50 L 4.00 0.00 Z");
    }
}
