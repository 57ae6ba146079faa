use oncolens_stats::boxplot::BoxPlotSummary;
use plotters::prelude::*;

use super::{Area, DrawResult, Figure, Labels, category_label, color::SET2, padded_range};

const BOX_HALF_WIDTH: f64 = 0.3;
const CAP_HALF_WIDTH: f64 = 0.12;

/// Draws one Tukey box per group, groups left to right in the given order.
#[expect(clippy::cast_precision_loss)]
pub fn draw_boxplot(
    area: &Area<'_>,
    figure: Figure,
    labels: &Labels<'_>,
    groups: &[(String, BoxPlotSummary)],
) -> DrawResult<()> {
    let names = groups.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
    let (y_min, y_max) = groups
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, s)| {
            (lo.min(s.stats.min), hi.max(s.stats.max))
        });
    let x_range = -0.5..(groups.len().max(1) as f64 - 0.5);

    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, figure.font(14.0))
        .margin(figure.pt(10.0))
        .x_label_area_size(figure.pt(36.0))
        .y_label_area_size(figure.pt(48.0))
        .build_cartesian_2d(x_range, padded_range(y_min, y_max, 0.05))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len().max(1))
        .x_label_formatter(&|x: &f64| category_label(&names, *x))
        .x_desc(labels.x)
        .y_desc(labels.y)
        .label_style(figure.font(10.0))
        .axis_desc_style(figure.font(12.0))
        .draw()?;

    let line = BLACK.mix(0.8).stroke_width(figure.pt(1.0));
    for (i, (_, summary)) in groups.iter().enumerate() {
        let x = i as f64;
        let fill = SET2[i % SET2.len()];

        chart.draw_series([
            PathElement::new(vec![(x, summary.lower_whisker), (x, summary.q1)], line),
            PathElement::new(vec![(x, summary.q3), (x, summary.upper_whisker)], line),
            PathElement::new(
                vec![
                    (x - CAP_HALF_WIDTH, summary.lower_whisker),
                    (x + CAP_HALF_WIDTH, summary.lower_whisker),
                ],
                line,
            ),
            PathElement::new(
                vec![
                    (x - CAP_HALF_WIDTH, summary.upper_whisker),
                    (x + CAP_HALF_WIDTH, summary.upper_whisker),
                ],
                line,
            ),
        ])?;
        chart.draw_series([
            Rectangle::new(
                [(x - BOX_HALF_WIDTH, summary.q1), (x + BOX_HALF_WIDTH, summary.q3)],
                fill.filled(),
            ),
            Rectangle::new(
                [(x - BOX_HALF_WIDTH, summary.q1), (x + BOX_HALF_WIDTH, summary.q3)],
                line,
            ),
        ])?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (x - BOX_HALF_WIDTH, summary.median),
                (x + BOX_HALF_WIDTH, summary.median),
            ],
            BLACK.stroke_width(figure.pt(1.5)),
        )))?;
        chart.draw_series(
            summary
                .outliers
                .iter()
                .map(|&v| Circle::new((x, v), figure.pt(2.5), line)),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::render_to_string;

    #[test]
    fn test_boxplot_labels_groups() {
        let groups = vec![
            (
                "No Metastasis".to_owned(),
                BoxPlotSummary::new([10.0, 25.0, 31.0, 40.0, 52.0, 300.0]).unwrap(),
            ),
            (
                "Metastasis".to_owned(),
                BoxPlotSummary::new([2.0, 6.0, 9.5, 14.0]).unwrap(),
            ),
        ];
        let labels = Labels {
            title: "Survival by Metastasis Status",
            x: "Metastasis Status",
            y: "Overall Survival (Months)",
        };
        let figure = Figure::new(6.0, 6.0);

        let svg = render_to_string(figure, |area| draw_boxplot(area, figure, &labels, &groups))
            .unwrap();

        assert!(svg.contains("Survival by Metastasis Status"));
        assert!(svg.contains("No Metastasis"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_boxplot_without_groups() {
        let labels = Labels {
            title: "Survival by Metastasis Status",
            x: "Metastasis Status",
            y: "Overall Survival (Months)",
        };
        let figure = Figure::new(6.0, 6.0);
        let svg =
            render_to_string(figure, |area| draw_boxplot(area, figure, &labels, &[])).unwrap();
        assert!(svg.contains("Survival by Metastasis Status"));
    }
}
