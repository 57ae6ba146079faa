use oncolens_stats::{histogram::Histogram, kde::GaussianKde};
use plotters::prelude::*;

use super::{Area, DrawResult, Figure, Labels};

const KDE_POINTS: usize = 200;

/// Draws a count histogram, optionally with a density curve scaled to counts.
#[expect(clippy::cast_precision_loss)]
pub fn draw_histogram(
    area: &Area<'_>,
    figure: Figure,
    labels: &Labels<'_>,
    histogram: &Histogram,
    density: Option<&GaussianKde>,
    color: RGBColor,
) -> DrawResult<()> {
    let (x_range, bin_width) = match (histogram.bins.first(), histogram.bins.last()) {
        (Some(first), Some(last)) => (
            first.range.start..last.range.end,
            histogram.bin_width().unwrap_or(1.0),
        ),
        _ => (0.0..1.0, 1.0),
    };
    let y_max = (histogram.max_count() as f64 * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, figure.font(14.0))
        .margin(figure.pt(10.0))
        .x_label_area_size(figure.pt(36.0))
        .y_label_area_size(figure.pt(48.0))
        .build_cartesian_2d(x_range.clone(), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .label_style(figure.font(10.0))
        .axis_desc_style(figure.font(12.0))
        .draw()?;

    chart.draw_series(histogram.bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.range.start, 0.0), (bin.range.end, bin.count as f64)],
            color.mix(0.7).filled(),
        )
    }))?;
    chart.draw_series(histogram.bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.range.start, 0.0), (bin.range.end, bin.count as f64)],
            BLACK.mix(0.6).stroke_width(figure.pt(0.5).max(1)),
        )
    }))?;

    if let Some(kde) = density {
        let scale = histogram.total_count() as f64 * bin_width;
        let curve = kde
            .evaluate_grid(x_range.start, x_range.end, KDE_POINTS)
            .into_iter()
            .map(|(x, d)| (x, d * scale));
        chart.draw_series(LineSeries::new(
            curve,
            color.stroke_width(figure.pt(1.5)),
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::render_to_string;

    #[test]
    fn test_histogram_with_density() {
        let values = [3.0, 7.5, 12.0, 12.5, 20.0, 33.0, 41.0, 41.5, 60.0, 95.0];
        let histogram = Histogram::new(values, 20);
        let kde = GaussianKde::new(values);
        let labels = Labels {
            title: "Distribution of Overall Survival in Patients",
            x: "Overall Survival (Months)",
            y: "Patient Count",
        };
        let figure = Figure::new(8.0, 6.0);

        let svg = render_to_string(figure, |area| {
            draw_histogram(area, figure, &labels, &histogram, kde.as_ref(), RED)
        })
        .unwrap();

        assert!(svg.contains("Distribution of Overall Survival in Patients"));
        assert!(svg.contains("Patient Count"));
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn test_empty_histogram() {
        let histogram = Histogram::new(Vec::<f64>::new(), 50);
        let labels = Labels {
            title: "Empty",
            x: "x",
            y: "y",
        };
        let figure = Figure::new(4.0, 3.0);
        let svg = render_to_string(figure, |area| {
            draw_histogram(area, figure, &labels, &histogram, None, BLUE)
        })
        .unwrap();
        assert!(svg.contains("Empty"));
    }
}
