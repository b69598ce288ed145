// Bar chart of the fitted feature weights.
use std::path::Path;

use plotters::prelude::*;

/// Draws a horizontal bar chart of feature weights and saves it as a PNG.
/// input: feature names with their weights, largest magnitude first
/// logic: split into names and values; pad the X range; one bar per weight,
/// drawn from zero so negative weights extend left
pub fn plot_weights(results: &[(String, f64)], path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
    let weights: Vec<f64> = results.iter().map(|(_, w)| *w).collect();
    let count = results.len();

    let min_x = weights.iter().cloned().fold(0.0_f64, f64::min);
    let max_x = weights.iter().cloned().fold(0.0_f64, f64::max);
    let pad = ((max_x - min_x) * 0.1).max(1e-3);
    let x_range = (min_x - pad)..(max_x + pad);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Feature Weights (standardized differentials)", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(200)
        .build_cartesian_2d(x_range, 0..count)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .y_labels(count)
        .y_label_formatter(&|idx| names.get(*idx).map(|n| n.to_string()).unwrap_or_default())
        .x_desc("Weight (red - blue)")
        .y_desc("Feature")
        .draw()?;

    chart.draw_series(weights.iter().enumerate().map(|(i, &w)| {
        let start = 0.0_f64.min(w);
        let end = 0.0_f64.max(w);
        let color = if w >= 0.0 { BLUE } else { RED };
        Rectangle::new([(start, i), (end, i + 1)], color.mix(0.5).filled())
    }))?;

    root.present()?;
    Ok(())
}
