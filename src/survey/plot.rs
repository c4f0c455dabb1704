// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Plot the areal sky densities of each iteration.

use std::path::Path;

use log::debug;
use plotters::prelude::*;
use thiserror::Error;

use super::IterationSummary;

/// The number of X pixels on the plot.
const X_PIXELS: u32 = 1600;
/// The number of Y pixels on the plot.
const Y_PIXELS: u32 = 900;

#[derive(Error, Debug)]
pub enum DrawError {
    #[error("There are no iterations to plot")]
    NoIterations,

    #[error("Error when drawing the chart: {0}")]
    Chart(String),

    #[error("Error from the plotters library: {0}")]
    Plotters(String),
}

/// Draw the areal sky density (filled points) and detectable areal sky
/// density (open points) against the iteration number, and save the plot
/// as a PNG.
pub fn plot_areal_densities(
    file: &Path,
    summaries: &[IterationSummary],
) -> Result<(), DrawError> {
    if summaries.is_empty() {
        return Err(DrawError::NoIterations);
    }
    debug!("Plotting areal sky densities to {}", file.display());

    let max_density = summaries
        .iter()
        .flat_map(|s| [s.areal_density, s.detectable_density])
        .filter(|d| d.is_finite())
        .fold(0.0_f64, f64::max);
    let y_max = if max_density > 0.0 {
        max_density * 1.1
    } else {
        1.0
    };

    let root = BitMapBackend::new(file, (X_PIXELS, Y_PIXELS)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| DrawError::Plotters(e.to_string()))?;
    let mut cc = ChartBuilder::on(&root)
        .caption("Areal sky density", ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0..summaries.len() + 1, 0.0..y_max)
        .map_err(|e| DrawError::Chart(e.to_string()))?;

    cc.configure_mesh()
        .x_desc("Iteration")
        .y_desc("Sources per square degree")
        .light_line_style(&WHITE)
        .draw()
        .map_err(|e| DrawError::Chart(e.to_string()))?;

    cc.draw_series(PointSeries::of_element(
        summaries
            .iter()
            .enumerate()
            .filter(|(_, s)| s.areal_density.is_finite())
            .map(|(i, s)| (i + 1, s.areal_density)),
        5,
        ShapeStyle::from(&BLUE).filled(),
        &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
    ))
    .map_err(|e| DrawError::Chart(e.to_string()))?
    .label("Modulation above cutoff")
    .legend(|(x, y)| Circle::new((x, y), 5, BLUE.filled()));

    cc.draw_series(PointSeries::of_element(
        summaries
            .iter()
            .enumerate()
            .filter(|(_, s)| s.detectable_density.is_finite())
            .map(|(i, s)| (i + 1, s.detectable_density)),
        5,
        ShapeStyle::from(&RED),
        &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
    ))
    .map_err(|e| DrawError::Chart(e.to_string()))?
    .label("Detectable variability")
    .legend(|(x, y)| Circle::new((x, y), 5, RED));

    cc.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| DrawError::Chart(e.to_string()))?;

    root.present()
        .map_err(|e| DrawError::Plotters(e.to_string()))?;
    Ok(())
}
