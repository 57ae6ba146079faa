use oncolens_analysis::{clinical::MetastasisLabel, survival::SurvivalByGroup};
use oncolens_stats::{boxplot::BoxPlotSummary, histogram::Histogram, kde::GaussianKde};

use crate::plot::{
    Figure, FigureWriter, Labels, boxplot::draw_boxplot, color::SKY_BLUE, histogram::draw_histogram,
    km::draw_km_curves,
};

pub(super) fn render_histogram(
    writer: &FigureWriter,
    durations: &[f64],
    bins: usize,
) -> anyhow::Result<()> {
    let histogram = Histogram::new(durations.iter().copied(), bins);
    let kde = GaussianKde::new(durations.iter().copied());
    let labels = Labels {
        title: "Distribution of Overall Survival in Patients",
        x: "Overall Survival (Months)",
        y: "Patient Count",
    };
    let figure = Figure::new(8.0, 6.0);
    writer.render("survival_histogram.svg", figure, |area| {
        draw_histogram(area, figure, &labels, &histogram, kde.as_ref(), SKY_BLUE)
    })
}

pub(super) fn render_boxplot(
    writer: &FigureWriter,
    by_label: &[(MetastasisLabel, Vec<f64>)],
) -> anyhow::Result<()> {
    let groups = by_label
        .iter()
        .filter_map(|(label, values)| {
            BoxPlotSummary::new(values.iter().copied()).map(|summary| (label.to_string(), summary))
        })
        .collect::<Vec<_>>();
    let labels = Labels {
        title: "Survival by Metastasis Status",
        x: "Metastasis Status",
        y: "Overall Survival (Months)",
    };
    let figure = Figure::new(6.0, 6.0);
    writer.render("survival_boxplot.svg", figure, |area| {
        draw_boxplot(area, figure, &labels, &groups)
    })
}

pub(super) fn render_km_curves(
    writer: &FigureWriter,
    survival: &SurvivalByGroup<MetastasisLabel>,
) -> anyhow::Result<()> {
    let curves = survival
        .groups
        .iter()
        .map(|group| (group.label.to_string(), &group.stats.km_curve))
        .collect::<Vec<_>>();
    let labels = Labels {
        title: "Kaplan-Meier Survival Curves by Metastasis Status",
        x: "Time (Months)",
        y: "Survival Probability",
    };
    let figure = Figure::new(8.0, 6.0);
    writer.render("km_survival_curves.svg", figure, |area| {
        draw_km_curves(area, figure, &labels, "Metastasis Status", &curves)
    })
}
