use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use super::{
    Area, DrawResult, Figure, Labels, category_label,
    color::{contrasting_text, normalize, viridis},
};

/// Matrix of values with labeled rows and columns.
///
/// Row 0 is drawn at the top. Missing cells are left blank.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapData {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl HeatmapData {
    fn value_range(&self) -> (f64, f64) {
        self.values
            .iter()
            .flatten()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// Draws an annotated heatmap on the viridis scale.
#[expect(clippy::cast_precision_loss)]
pub fn draw_heatmap(
    area: &Area<'_>,
    figure: Figure,
    labels: &Labels<'_>,
    data: &HeatmapData,
) -> DrawResult<()> {
    let rows = data.row_labels.len();
    let columns = data.column_labels.len();
    let (min, max) = data.value_range();

    // Rows are stacked top-down, so row i sits at y = rows - 1 - i
    let y_names = data.row_labels.iter().rev().collect::<Vec<_>>();

    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, figure.font(14.0))
        .margin(figure.pt(10.0))
        .x_label_area_size(figure.pt(36.0))
        .y_label_area_size(figure.pt(72.0))
        .build_cartesian_2d(
            -0.5..(columns.max(1) as f64 - 0.5),
            -0.5..(rows.max(1) as f64 - 0.5),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(columns.max(1))
        .y_labels(rows.max(1))
        .x_label_formatter(&|x: &f64| category_label(&data.column_labels, *x))
        .y_label_formatter(&|y: &f64| category_label(&y_names, *y))
        .x_desc(labels.x)
        .y_desc(labels.y)
        .x_label_style(figure.font(10.0))
        .y_label_style(figure.font(7.0))
        .axis_desc_style(figure.font(12.0))
        .draw()?;

    let annotation = figure.font(7.0).pos(Pos::new(HPos::Center, VPos::Center));
    for (i, row) in data.values.iter().take(rows).enumerate() {
        let y = (rows - 1 - i) as f64;
        for (j, value) in row.iter().enumerate() {
            let Some(value) = *value else {
                continue;
            };
            let x = j as f64;
            let color = viridis(normalize(value, min, max));
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                color.filled(),
            )))?;
            let mut text_style = annotation.clone();
            text_style.color = contrasting_text(color).to_backend_color();
            chart.draw_series(std::iter::once(Text::new(
                format!("{value:.2}"),
                (x, y),
                text_style,
            )))?;
        }
    }

    Ok(())
}
