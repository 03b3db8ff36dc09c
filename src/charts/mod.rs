//! Charts module - Chart model and rendering

mod plotter;
mod renderer;
mod series;

pub use plotter::{ChartPlotter, HoverTooltip, FLU_COLOR, SEASON_COLOR};
pub use renderer::{RenderError, StaticChartRenderer};
pub use series::{format_count, nice_step, BarEntry, BarSeries, ValueAxis, FLU_TITLE, SEASON_TITLE};
