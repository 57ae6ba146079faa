use plotters::prelude::*;

use super::{
    Area, DrawResult, Figure, Labels,
    color::{normalize, red_blue},
    padded_range,
};

const COLORBAR_STEPS: usize = 100;

/// A scatter point colored by a signed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Draws a scatter plot colored on a diverging scale centered at zero, with a colorbar.
pub fn draw_colored_scatter(
    area: &Area<'_>,
    figure: Figure,
    labels: &Labels<'_>,
    colorbar_label: &str,
    points: &[ColoredPoint],
) -> DrawResult<()> {
    let limit = points
        .iter()
        .map(|p| p.value.abs())
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
        .max(1e-9);
    let (x_min, x_max, y_min, y_max) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), p| (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
    );

    let (width, _) = area.dim_in_pixel();
    let (plot_area, bar_area) = area.split_horizontally(width.saturating_sub(figure.pt(90.0)));

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(labels.title, figure.font(14.0))
        .margin(figure.pt(10.0))
        .x_label_area_size(figure.pt(36.0))
        .y_label_area_size(figure.pt(48.0))
        .build_cartesian_2d(
            padded_range(x_min, x_max, 0.05),
            padded_range(y_min, y_max, 0.05),
        )?;
    chart
        .configure_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .label_style(figure.font(10.0))
        .axis_desc_style(figure.font(12.0))
        .draw()?;

    let radius = figure.pt(2.0);
    chart.draw_series(points.iter().map(|p| {
        let color = red_blue(normalize(p.value, -limit, limit));
        Circle::new((p.x, p.y), radius, color.mix(0.5).filled())
    }))?;

    draw_colorbar(&bar_area, figure, colorbar_label, -limit, limit)
}

#[expect(clippy::cast_precision_loss)]
fn draw_colorbar(
    area: &Area<'_>,
    figure: Figure,
    label: &str,
    min: f64,
    max: f64,
) -> DrawResult<()> {
    let mut bar = ChartBuilder::on(area)
        .margin_top(figure.pt(40.0))
        .margin_bottom(figure.pt(46.0))
        .margin_left(figure.pt(4.0))
        .right_y_label_area_size(figure.pt(56.0))
        .build_cartesian_2d(0.0..1.0, min..max)?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(label)
        .label_style(figure.font(9.0))
        .axis_desc_style(figure.font(11.0))
        .draw()?;

    let step = (max - min) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let lo = min + step * i as f64;
        let color = red_blue(normalize(lo + step / 2.0, min, max));
        Rectangle::new([(0.0, lo), (1.0, lo + step)], color.filled())
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::render_to_string;

    #[test]
    fn test_scatter_with_colorbar() {
        let points = [
            ColoredPoint {
                x: 1.0,
                y: 3.0,
                value: 2.0,
            },
            ColoredPoint {
                x: 4.0,
                y: 1.0,
                value: -3.0,
            },
            ColoredPoint {
                x: 2.0,
                y: 2.0,
                value: 0.0,
            },
        ];
        let labels = Labels {
            title: "Scatter Plot of Gene Expression (MCF7 vs. PR)",
            x: "log2(avg_MCF7_FPKM + 1)",
            y: "log2(avg_PR_FPKM + 1)",
        };
        let figure = Figure::new(8.0, 6.0);

        let svg = render_to_string(figure, |area| {
            draw_colored_scatter(area, figure, &labels, "logFC", &points)
        })
        .unwrap();

        assert!(svg.contains("Scatter Plot of Gene Expression (MCF7 vs. PR)"));
        assert!(svg.contains("logFC"));
        assert_eq!(svg.matches("<circle").count(), points.len());
    }
}
