//! Exploratory data analysis: descriptive statistics and chart rendering.

mod charts;
mod summary;

pub use charts::{categorical_plot, correlation_heatmap, distribution_plot, time_series_plot};
pub use summary::numeric_summary;
