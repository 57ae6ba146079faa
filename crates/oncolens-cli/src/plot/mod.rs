//! SVG figures
//!
//! Figures are sized in inches and rendered at a fixed 300 DPI. When figures are
//! not saved they are still rendered in memory, so every run exercises the same
//! drawing code.

use std::path::{Path, PathBuf};

use anyhow::Context;
use plotters::{coord::Shift, prelude::*};

use crate::util;

pub mod boxplot;
pub mod color;
pub mod heatmap;
pub mod histogram;
pub mod km;
pub mod scatter;

pub const DPI: u32 = 300;
const POINTS_PER_INCH: f64 = 72.0;

pub type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
pub type DrawResult<T> = Result<T, DrawingAreaErrorKind<std::io::Error>>;

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Figure {
    pub width_in: f64,
    pub height_in: f64,
}

impl Figure {
    #[must_use]
    pub const fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
        }
    }

    /// Pixel size at [`DPI`].
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn pixels(self) -> (u32, u32) {
        let dpi = f64::from(DPI);
        (
            (self.width_in * dpi).round() as u32,
            (self.height_in * dpi).round() as u32,
        )
    }

    /// Converts a typographic size in points to pixels.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn pt(self, points: f64) -> u32 {
        (points * f64::from(DPI) / POINTS_PER_INCH).round() as u32
    }

    #[must_use]
    pub fn font(self, points: f64) -> TextStyle<'static> {
        TextStyle::from(("sans-serif", self.pt(points)))
    }
}

/// Title and axis descriptions of a chart.
#[derive(Debug, Clone, Copy)]
pub struct Labels<'a> {
    pub title: &'a str,
    pub x: &'a str,
    pub y: &'a str,
}

/// Renders a figure into an SVG file.
pub fn render_to_file<F>(path: &Path, figure: Figure, draw: F) -> anyhow::Result<()>
where
    F: FnOnce(&Area<'_>) -> DrawResult<()>,
{
    util::create_parent_dir(path)?;
    let root = SVGBackend::new(path, figure.pixels()).into_drawing_area();
    root.fill(&WHITE)
        .and_then(|()| draw(&root))
        .and_then(|()| root.present())
        .with_context(|| format!("Failed to render figure: {}", path.display()))
}

/// Renders a figure into an in-memory SVG document.
pub fn render_to_string<F>(figure: Figure, draw: F) -> anyhow::Result<String>
where
    F: FnOnce(&Area<'_>) -> DrawResult<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, figure.pixels()).into_drawing_area();
        root.fill(&WHITE)
            .and_then(|()| draw(&root))
            .and_then(|()| root.present())
            .context("Failed to render figure")?;
    }
    Ok(svg)
}

/// Destination of the figures of one run.
#[derive(Debug, Clone)]
pub struct FigureWriter {
    output_dir: Option<PathBuf>,
}

impl FigureWriter {
    /// Figures are written under `output_dir` only when `save` is set.
    #[must_use]
    pub fn new(save: bool, output_dir: &Path) -> Self {
        Self {
            output_dir: save.then(|| output_dir.to_owned()),
        }
    }

    pub fn render<F>(&self, file_name: &str, figure: Figure, draw: F) -> anyhow::Result<()>
    where
        F: FnOnce(&Area<'_>) -> DrawResult<()>,
    {
        match &self.output_dir {
            Some(dir) => {
                let path = dir.join(file_name);
                render_to_file(&path, figure, draw)?;
                tracing::info!("Figure saved to: {}", path.display());
            }
            None => {
                let svg = render_to_string(figure, draw)?;
                tracing::debug!(figure = file_name, bytes = svg.len(), "rendered figure");
            }
        }
        Ok(())
    }
}

/// Widens a degenerate range and pads it by `pad` of its width on both sides.
#[must_use]
pub fn padded_range(min: f64, max: f64, pad: f64) -> std::ops::Range<f64> {
    if !(min.is_finite() && max.is_finite()) {
        return 0.0..1.0;
    }
    if (max - min).abs() < 1e-9 {
        return (min - 1.0)..(max + 1.0);
    }
    let margin = (max - min) * pad;
    (min - margin)..(max + margin)
}

/// Label of a categorical axis position, or an empty string between categories.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn category_label<S: AsRef<str>>(names: &[S], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    names
        .get(index as usize)
        .map(|name| name.as_ref().to_owned())
        .unwrap_or_default()
}
