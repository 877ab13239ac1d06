//! Chart rendering boundary.
//!
//! The pipeline hands a chart renderer an x-series, labeled y-series and
//! axis captions; the default adapter rasterizes them with plotters.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub color: (u8, u8, u8),
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<f64>,
}

pub trait ChartRenderer {
    fn render(&self, path: &Path, spec: &ChartSpec, series: &[Series]) -> Result<()>;
}

/// Line color for a viewer colormap name. Unknown names fall back to grey,
/// matching the viewer's default for surplus channels.
pub fn color_for(name: &str) -> (u8, u8, u8) {
    match name {
        "blue" => (40, 80, 220),
        "red" => (220, 60, 50),
        "green" => (40, 170, 80),
        _ => (130, 130, 130),
    }
}

pub struct PlottersRenderer;

impl ChartRenderer for PlottersRenderer {
    fn render(&self, path: &Path, spec: &ChartSpec, series: &[Series]) -> Result<()> {
        let mut x_max = spec.x.iter().copied().fold(0.0f64, f64::max);
        if x_max <= 0.0 {
            x_max = 1.0;
        }
        let mut y_max = 0.0f64;
        for s in series {
            for v in &s.values {
                if v.is_finite() {
                    y_max = y_max.max(*v);
                }
            }
        }
        if y_max <= 0.0 {
            y_max = 1.0;
        }

        let root = BitMapBackend::new(path, (900, 600)).into_drawing_area();
        root.fill(&WHITE)
            .with_context(|| format!("failed to draw {}", path.display()))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(42)
            .y_label_area_size(58)
            .build_cartesian_2d(0.0..x_max * 1.02, 0.0..y_max * 1.05)?;
        chart
            .configure_mesh()
            .x_desc(&spec.x_label)
            .y_desc(&spec.y_label)
            .draw()?;

        for s in series {
            let color = RGBColor(s.color.0, s.color.1, s.color.2);
            let points: Vec<(f64, f64)> = spec
                .x
                .iter()
                .zip(&s.values)
                .filter(|(_, v)| v.is_finite())
                .map(|(x, v)| (*x, *v))
                .collect();
            chart
                .draw_series(LineSeries::new(points, &color))?
                .label(s.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
