use oncolens_stats::survival::KaplanMeierCurve;
use plotters::prelude::*;

use super::{Area, DrawResult, Figure, Labels, color::TAB10};

/// Overlays Kaplan-Meier step curves with shaded confidence bands on a shared axis.
pub fn draw_km_curves(
    area: &Area<'_>,
    figure: Figure,
    labels: &Labels<'_>,
    legend_title: &str,
    curves: &[(String, &KaplanMeierCurve)],
) -> DrawResult<()> {
    let max_time = curves
        .iter()
        .filter_map(|(_, curve)| curve.max_time)
        .fold(0.0, f64::max);
    let x_max = if max_time > 0.0 { max_time * 1.05 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, figure.font(14.0))
        .margin(figure.pt(10.0))
        .x_label_area_size(figure.pt(36.0))
        .y_label_area_size(figure.pt(48.0))
        .build_cartesian_2d(0.0..x_max, 0.0..1.05)?;

    chart
        .configure_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .label_style(figure.font(10.0))
        .axis_desc_style(figure.font(12.0))
        .draw()?;

    // Title entry of the legend; it has no marker of its own
    chart
        .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
        .label(legend_title);

    let marker_len = i32::try_from(figure.pt(20.0)).unwrap_or(i32::MAX);
    for (i, (name, curve)) in curves.iter().enumerate() {
        let color = TAB10[i % TAB10.len()];
        let steps = curve.step_points();

        let band = steps
            .iter()
            .map(|&(t, _, lower, _)| (t, lower))
            .chain(steps.iter().rev().map(|&(t, _, _, upper)| (t, upper)))
            .collect::<Vec<_>>();
        chart.draw_series(std::iter::once(Polygon::new(band, color.mix(0.25).filled())))?;

        let stroke = color.stroke_width(figure.pt(1.5));
        chart
            .draw_series(LineSeries::new(
                steps.iter().map(|&(t, s, _, _)| (t, s)),
                stroke,
            ))?
            .label(name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + marker_len, y)], stroke));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(figure.font(10.0))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.5))
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use oncolens_stats::survival::Observation;

    use super::*;
    use crate::plot::render_to_string;

    #[test]
    fn test_km_plot_has_one_curve_per_group() {
        let a = KaplanMeierCurve::from_observations(vec![
            Observation::new(2.0, true),
            Observation::new(3.0, false),
            Observation::new(4.0, true),
            Observation::new(5.0, true),
            Observation::new(6.0, false),
        ]);
        let b = KaplanMeierCurve::from_observations(vec![
            Observation::new(10.0, false),
            Observation::new(12.0, true),
        ]);
        let curves = vec![("Metastasis".to_owned(), &a), ("No Metastasis".to_owned(), &b)];
        let labels = Labels {
            title: "Kaplan-Meier Survival Curves by Metastasis Status",
            x: "Time (Months)",
            y: "Survival Probability",
        };
        let figure = Figure::new(8.0, 6.0);

        let svg = render_to_string(figure, |area| {
            draw_km_curves(area, figure, &labels, "Metastasis Status", &curves)
        })
        .unwrap();

        assert!(svg.contains("Kaplan-Meier Survival Curves by Metastasis Status"));
        assert!(svg.contains("No Metastasis"));
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn test_km_plot_without_curves() {
        let labels = Labels {
            title: "Kaplan-Meier Survival Curves by Metastasis Status",
            x: "Time (Months)",
            y: "Survival Probability",
        };
        let figure = Figure::new(8.0, 6.0);
        let svg = render_to_string(figure, |area| {
            draw_km_curves(area, figure, &labels, "Metastasis Status", &[])
        })
        .unwrap();
        assert!(svg.contains("Survival Probability"));
    }
}
