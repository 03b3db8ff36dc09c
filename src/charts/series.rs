//! Bar Series Module
//! Renderer-independent chart model: ordered bars, value axis and number format.

use crate::analysis::{AggregateResult, Bucket, SeasonalSummary};

/// Value axis headroom above the tallest bar.
pub const AXIS_HEADROOM: f64 = 1.15;
/// Approximate number of value-axis ticks.
pub const TARGET_TICKS: usize = 8;

pub const SEASON_TITLE: &str = "Total Absences by Season";
pub const FLU_TITLE: &str = "Absences: Flu Season vs Non-Flu Season";

/// One labelled bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry {
    pub label: String,
    pub value: f64,
}

/// An ordered set of bars with a title.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub title: String,
    pub bars: Vec<BarEntry>,
    /// Fraction of each category band left empty around the bar.
    pub padding: f64,
}

impl BarSeries {
    pub fn from_aggregate<B: Bucket>(title: &str, result: &AggregateResult<B>, padding: f64) -> Self {
        Self {
            title: title.to_string(),
            bars: result
                .iter()
                .map(|(bucket, value)| BarEntry {
                    label: bucket.label().to_string(),
                    value,
                })
                .collect(),
            padding,
        }
    }

    pub fn seasons(summary: &SeasonalSummary) -> Self {
        Self::from_aggregate(SEASON_TITLE, &summary.by_season, 0.15)
    }

    pub fn flu_seasons(summary: &SeasonalSummary) -> Self {
        Self::from_aggregate(FLU_TITLE, &summary.by_flu, 0.25)
    }

    /// Both charts of a summary, season chart first.
    pub fn for_summary(summary: &SeasonalSummary) -> [Self; 2] {
        [Self::seasons(summary), Self::flu_seasons(summary)]
    }

    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }

    pub fn value_axis(&self) -> ValueAxis {
        ValueAxis::for_max(self.max_value())
    }

    /// Bar width in category units (each band is 1.0 wide).
    pub fn bar_width(&self) -> f64 {
        1.0 - self.padding
    }

    /// Index of the bar drawn at `(x, y)` in category/value coordinates,
    /// where bar `i` is centred on `x = i`.
    pub fn bar_index_at(&self, x: f64, y: f64) -> Option<usize> {
        let idx = x.round();
        if idx < 0.0 || (x - idx).abs() > self.bar_width() / 2.0 {
            return None;
        }
        let idx = idx as usize;
        let bar = self.bars.get(idx)?;
        let (low, high) = if bar.value < 0.0 {
            (bar.value, 0.0)
        } else {
            (0.0, bar.value)
        };
        (low..=high).contains(&y).then_some(idx)
    }
}

/// Linear value axis starting at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAxis {
    /// Upper bound of the axis domain.
    pub max: f64,
    /// Distance between ticks.
    pub step: f64,
}

impl ValueAxis {
    /// Axis whose domain covers `max_value * AXIS_HEADROOM`, rounded up
    /// to a nice bound.
    pub fn for_max(max_value: f64) -> Self {
        let raw = max_value * AXIS_HEADROOM;
        if !(raw > 0.0) || !raw.is_finite() {
            return Self { max: 1.0, step: 0.2 };
        }

        let bound_step = nice_step(raw, 10);
        let max = (raw / bound_step).ceil() * bound_step;
        Self {
            max,
            step: nice_step(max, TARGET_TICKS),
        }
    }

    /// Tick values from zero up to the axis bound.
    pub fn ticks(&self) -> Vec<f64> {
        let count = (self.max / self.step + 1e-9).floor() as usize;
        (0..=count).map(|i| i as f64 * self.step).collect()
    }
}

/// A 1, 2 or 5 times power-of-ten step splitting `range` into about
/// `target_steps` parts.
pub fn nice_step(range: f64, target_steps: usize) -> f64 {
    if !(range > 0.0) || target_steps == 0 {
        return 1.0;
    }
    let raw_step = range / target_steps as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;

    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * magnitude
}

/// Format a count with thousands separators and at most three decimals.
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let rounded = (value * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}
