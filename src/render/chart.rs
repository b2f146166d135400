// src/render/chart.rs

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::debug;

use super::ChartView;

pub const DEFAULT_SIZE: (u32, u32) = (800, 480);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("chart has no data points")]
    Empty,
    #[error("drawing chart failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Value axis bounds with a little headroom; never a zero-width range.
fn padded(lo: u32, hi: u32) -> (f64, f64) {
    let (lo, hi) = (f64::from(lo), f64::from(hi));
    let pad = ((hi - lo) * 0.05).max(1.0);
    ((lo - pad).max(0.0), hi + pad)
}

/// Draw `view` as an SVG document held in memory.
///
/// The x axis carries one slot per period; only the periods in
/// `view.ticks` are labelled.
pub fn to_svg(view: &ChartView, size: (u32, u32)) -> Result<String, ChartError> {
    let (lo, hi) = view.value_range().ok_or(ChartError::Empty)?;
    let (y_min, y_max) = padded(lo, hi);
    let n = view.periods.len();
    let x_range = -0.5f64..(n as f64 - 0.5);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&view.title, ("sans-serif", 18))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .x_desc(view.x_label)
            .y_desc(view.y_label)
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()
            .map_err(draw_err)?;

        for (i, series) in view.series.iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            let points: Vec<(f64, f64)> = series
                .values
                .iter()
                .enumerate()
                .map(|(x, v)| (x as f64, f64::from(*v)))
                .collect();

            chart
                .draw_series(LineSeries::new(
                    points.iter().copied(),
                    ShapeStyle::from(&color).stroke_width(2),
                ))
                .map_err(draw_err)?
                .label(series.region.column_name())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

            if points.len() == 1 {
                chart
                    .draw_series(points.iter().map(|p| Circle::new(*p, 3, color.filled())))
                    .map_err(draw_err)?;
            }
        }

        if view.series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(draw_err)?;
        }

        let tick_style = TextStyle::from(("sans-serif", 12).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        for tick in &view.ticks {
            let Some(x) = view.periods.iter().position(|p| p == tick) else {
                continue;
            };
            let (px, py) = chart.backend_coord(&(x as f64, y_min));
            root.draw(&Text::new(tick.to_string(), (px, py + 6), tick_style.clone()))
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
    }

    debug!(bytes = svg.len(), series = view.series.len(), "rendered chart");
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::render::render;
    use crate::testutil::sample_dataset;

    #[test]
    fn test_svg_labels_only_first_and_last_period() {
        let ds = sample_dataset();
        let dash = render(
            &ds,
            &"Q1 2000".parse().unwrap(),
            &"Q4 2002".parse().unwrap(),
            Region::Canada,
            &[],
        )
        .unwrap();
        let svg = to_svg(&dash.population, DEFAULT_SIZE).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Q1 2000"));
        assert!(svg.contains("Q4 2002"));
        assert!(!svg.contains("Q3 2001"));
        assert!(svg.contains("Population"));
        assert!(svg.contains("Time"));
    }

    #[test]
    fn test_svg_comparison_has_legend() {
        let ds = sample_dataset();
        let dash = render(
            &ds,
            &"Q1 2000".parse().unwrap(),
            &"Q1 2001".parse().unwrap(),
            Region::Canada,
            &[Region::Alberta, Region::Manitoba],
        )
        .unwrap();
        let svg = to_svg(&dash.comparison, DEFAULT_SIZE).unwrap();
        assert!(svg.contains("Alberta"));
        assert!(svg.contains("Manitoba"));
    }

    #[test]
    fn test_svg_single_point() {
        let ds = sample_dataset();
        let q = "Q2 2010".parse().unwrap();
        let dash = render(&ds, &q, &q, Region::Yukon, &[]).unwrap();
        let svg = to_svg(&dash.population, (400, 300)).unwrap();
        assert!(svg.contains("Q2 2010"));
    }

    #[test]
    fn test_empty_view() {
        let mut view = render(
            &sample_dataset(),
            &"Q1 2000".parse().unwrap(),
            &"Q1 2000".parse().unwrap(),
            Region::Canada,
            &[],
        )
        .unwrap()
        .population;
        view.series.clear();
        assert_eq!(to_svg(&view, DEFAULT_SIZE), Err(ChartError::Empty));
    }
}
