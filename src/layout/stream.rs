use std::cmp::Ordering;

use super::curve::{join_monotone_x, monotone_x, PathCommand};
use super::label_placement::{place_band_label, BandStep, LabelMetrics};
use super::scale::LinearScale;
use super::stack::stack_wiggle;
use super::types::{BandLayout, StreamAxisLayout, StreamLayout};
use crate::config::{LayoutConfig, RenderConfig};
use crate::ir::PortfolioTable;
use crate::theme::{rainbow, Theme};
use chrono::NaiveDate;

pub fn compute_stream_layout(
    table: &PortfolioTable,
    _theme: &Theme,
    config: &LayoutConfig,
    render: &RenderConfig,
) -> StreamLayout {
    let stream = &config.stream;
    let width = render.width.max(stream.min_width);
    let height = render.height.max(stream.min_height);
    let plot_height = height - stream.margin_top - stream.margin_bottom;

    let days: Vec<f64> = table.dates.iter().map(|date| epoch_days(*date)).collect();
    let x = LinearScale::new(
        (
            days.first().copied().unwrap_or(0.0),
            days.last().copied().unwrap_or(0.0),
        ),
        (0.0, width as f64),
    );

    let stacked = stack_wiggle(&table.values);
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for series in &stacked {
        for (lower, upper) in series {
            lo = lo.min(*lower);
            hi = hi.max(*upper);
        }
    }
    if !lo.is_finite() {
        lo = 0.0;
        hi = 0.0;
    }
    let y = LinearScale::new((lo, hi), (plot_height as f64, 0.0));

    // Band color follows total volume rank: the heaviest holding gets the
    // first stop on the rainbow ramp.
    let volumes: Vec<f64> = (0..table.series_count()).map(|s| table.volume(s)).collect();
    let mut by_volume = volumes.clone();
    by_volume.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let metrics = LabelMetrics {
        font_width: stream.label_font_width,
        font_height: stream.label_font_height,
    };

    let no_extents: Vec<(f64, f64)> = Vec::new();
    let mut bands = Vec::with_capacity(table.series_count());
    for (series, ticker) in table.tickers.iter().enumerate() {
        let steps: Vec<BandStep> = stacked
            .get(series)
            .unwrap_or(&no_extents)
            .iter()
            .zip(&days)
            .map(|((lower, upper), day)| BandStep {
                x: x.scale(*day) as f32,
                lower: y.scale(*lower) as f32,
                upper: y.scale(*upper) as f32,
            })
            .collect();

        let rank = by_volume
            .iter()
            .position(|volume| *volume == volumes[series])
            .unwrap_or(series);
        let color = rainbow(rank as f32 / table.series_count().max(1) as f32);

        let label = table.label(ticker).to_string();
        let label_anchor = place_band_label(&steps, &label, metrics);

        bands.push(BandLayout {
            ticker: ticker.clone(),
            label,
            color,
            outline: band_outline(&steps),
            steps,
            label_anchor,
        });
    }

    let ticks = table
        .dates
        .iter()
        .zip(&days)
        .map(|(date, day)| (date.format("%b %y").to_string(), x.scale(*day) as f32))
        .collect();

    StreamLayout {
        width,
        height,
        margin_left: stream.margin_left,
        margin_top: stream.margin_top,
        axis: StreamAxisLayout {
            y: stream.axis_offset_y,
            ticks,
            grid_length: height,
        },
        bands,
    }
}

// Smooth upper edge forward, straight joint down, smooth lower edge back.
fn band_outline(steps: &[BandStep]) -> Vec<PathCommand> {
    let upper: Vec<(f32, f32)> = steps.iter().map(|step| (step.x, step.upper)).collect();
    let lower: Vec<(f32, f32)> = steps
        .iter()
        .rev()
        .map(|step| (step.x, step.lower))
        .collect();
    let mut outline = monotone_x(&upper);
    join_monotone_x(&mut outline, &lower);
    if !outline.is_empty() {
        outline.push(PathCommand::Close);
    }
    outline
}

fn epoch_days(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");
    date.signed_duration_since(epoch).num_days() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn table() -> PortfolioTable {
        let mut labels = BTreeMap::new();
        labels.insert("ACME".to_string(), "Acme Industries".to_string());
        labels.insert("ZEN".to_string(), "Zenith".to_string());
        PortfolioTable {
            dates: vec![
                NaiveDate::from_ymd_opt(2016, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2016, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2016, 6, 1).unwrap(),
            ],
            tickers: vec!["ACME".to_string(), "ZEN".to_string()],
            labels,
            values: vec![
                vec![100.0, 300.0],
                vec![150.0, 300.0],
                vec![50.0, 300.0],
            ],
        }
    }

    fn defaults() -> (Theme, LayoutConfig, RenderConfig) {
        (Theme::classic(), LayoutConfig::default(), RenderConfig::default())
    }

    #[test]
    fn bands_cover_every_ticker_in_key_order() {
        let (theme, config, render) = defaults();
        let layout = compute_stream_layout(&table(), &theme, &config, &render);
        assert_eq!(layout.bands.len(), 2);
        assert_eq!(layout.bands[0].ticker, "ACME");
        assert_eq!(layout.bands[0].label, "Acme Industries");
        assert_eq!(layout.bands[1].ticker, "ZEN");
    }

    #[test]
    fn steps_span_the_full_width_and_stay_stacked() {
        let (theme, config, render) = defaults();
        let layout = compute_stream_layout(&table(), &theme, &config, &render);
        for band in &layout.bands {
            assert_eq!(band.steps.len(), 3);
            assert_eq!(band.steps[0].x, 0.0);
            assert_eq!(band.steps[2].x, layout.width);
        }
        // Adjacent bands share an edge at every step (y is reversed, so
        // the upper band's lower edge equals the lower band's upper edge).
        for (a, b) in layout.bands.iter().zip(layout.bands.iter().skip(1)) {
            for (sa, sb) in a.steps.iter().zip(&b.steps) {
                assert!((sa.upper - sb.lower).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn viewport_is_clamped_to_the_minimum_size() {
        let (theme, config, mut render) = defaults();
        render.width = 300.0;
        render.height = 200.0;
        let layout = compute_stream_layout(&table(), &theme, &config, &render);
        assert_eq!(layout.width, config.stream.min_width);
        assert_eq!(layout.height, config.stream.min_height);
    }

    #[test]
    fn heavier_volume_takes_an_earlier_rainbow_stop() {
        let (theme, config, render) = defaults();
        let layout = compute_stream_layout(&table(), &theme, &config, &render);
        // ZEN's volume (900) outranks ACME's (300).
        assert_eq!(layout.bands[1].color, rainbow(0.0));
        assert_eq!(layout.bands[0].color, rainbow(0.5));
    }

    #[test]
    fn roomy_bands_get_label_anchors_inside_the_chart() {
        let (theme, config, render) = defaults();
        let layout = compute_stream_layout(&table(), &theme, &config, &render);
        // Both bands occupy hundreds of pixels; labels must land.
        for band in &layout.bands {
            let (x, y) = band.label_anchor.expect("label should place");
            assert!(x >= 0.0 && x <= layout.width);
            assert!(y >= 0.0 && y <= layout.height);
        }
    }

    #[test]
    fn axis_has_one_tick_per_date() {
        let (theme, config, render) = defaults();
        let layout = compute_stream_layout(&table(), &theme, &config, &render);
        let labels: Vec<&str> = layout
            .axis
            .ticks
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(labels, vec!["Apr 16", "May 16", "Jun 16"]);
        assert_eq!(layout.axis.grid_length, layout.height);
    }

    #[test]
    fn outline_closes_and_starts_at_the_first_upper_point() {
        let (theme, config, render) = defaults();
        let layout = compute_stream_layout(&table(), &theme, &config, &render);
        let band = &layout.bands[0];
        assert_eq!(
            band.outline.first(),
            Some(&PathCommand::MoveTo((band.steps[0].x, band.steps[0].upper)))
        );
        assert_eq!(band.outline.last(), Some(&PathCommand::Close));
    }
}
