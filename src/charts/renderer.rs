//! Static Chart Renderer
//! Draws bar charts into PNG images with plotters.
//!
//! Layout (per chart):
//! 1. Title centered above the plot area
//! 2. Value axis on the left with thousands-separated ticks
//! 3. One bar per category, value printed above each bar
//! 4. Category axis along the bottom, in series order

use crate::analysis::SeasonalSummary;
use crate::charts::series::{format_count, BarSeries, ValueAxis};
use crate::config::ChartGeometry;
use image::{ImageFormat, RgbImage};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const SEASON_FILE: &str = "season_absences.png";
const FLU_FILE: &str = "flu_season_absences.png";

const SEASON_BAR: RGBColor = RGBColor(52, 152, 219);
const FLU_BAR: RGBColor = RGBColor(231, 76, 60);
const GRID: RGBColor = RGBColor(226, 232, 240);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Drawing(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn drawing_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(err.to_string())
}

/// Linear value coordinate whose key points are the ticks of a
/// [`ValueAxis`], so the PNG grid matches the interactive chart.
pub struct TickedValueCoord {
    inner: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedValueCoord {
    pub fn new(axis: &ValueAxis) -> Self {
        Self {
            inner: (0f64..axis.max).into(),
            ticks: axis.ticks(),
        }
    }
}

impl Ranged for TickedValueCoord {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> std::ops::Range<f64> {
        self.inner.range()
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a chart into a packed RGB buffer of `width * height * 3` bytes.
    pub fn render_rgb(
        series: &BarSeries,
        color: RGBColor,
        geometry: &ChartGeometry,
    ) -> Result<Vec<u8>, RenderError> {
        let (width, height) = (geometry.width, geometry.height);
        let mut buffer = vec![255u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing_error)?;

            let axis = series.value_axis();
            let n = series.bars.len().max(1) as u32;
            let labels: Vec<String> = series.bars.iter().map(|b| b.label.clone()).collect();
            let margin = geometry.margin;

            let mut chart = ChartBuilder::on(&root)
                .caption(&series.title, ("sans-serif", 18).into_font())
                .margin_top(margin.top / 4)
                .margin_right(margin.right)
                .x_label_area_size(margin.bottom)
                .y_label_area_size(margin.left)
                .build_cartesian_2d((0u32..n).into_segmented(), Self::value_coord(&axis))
                .map_err(drawing_error)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .light_line_style(TRANSPARENT)
                .bold_line_style(GRID)
                .y_label_formatter(&|v| format_count(*v))
                .x_label_formatter(&|v| match v {
                    SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                    _ => String::new(),
                })
                .y_desc("Absences")
                .label_style(("sans-serif", 12))
                .draw()
                .map_err(drawing_error)?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(color.filled())
                        .margin(Self::bar_margin(series, geometry))
                        .data(
                            series
                                .bars
                                .iter()
                                .enumerate()
                                .map(|(i, b)| (i as u32, b.value.max(0.0))),
                        ),
                )
                .map_err(drawing_error)?;

            let label_style = TextStyle::from(("sans-serif", 12).into_font())
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart
                .draw_series(series.bars.iter().enumerate().map(|(i, b)| {
                    Text::new(
                        format_count(b.value),
                        (SegmentValue::CenterOf(i as u32), b.value.max(0.0)),
                        label_style.clone(),
                    )
                }))
                .map_err(drawing_error)?;

            root.present().map_err(drawing_error)?;
        }

        Ok(buffer)
    }

    /// Render a chart as PNG bytes.
    pub fn render_png_bytes(
        series: &BarSeries,
        color: RGBColor,
        geometry: &ChartGeometry,
    ) -> Result<Vec<u8>, RenderError> {
        let buffer = Self::render_rgb(series, color, geometry)?;
        let image = RgbImage::from_raw(geometry.width, geometry.height, buffer).ok_or_else(|| {
            RenderError::Drawing("pixel buffer does not match chart size".to_string())
        })?;

        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Write both charts of a summary into `dir`, returning the file paths.
    pub fn export_summary(
        summary: &SeasonalSummary,
        geometry: &ChartGeometry,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let [seasons, flu] = BarSeries::for_summary(summary);
        let jobs = [(seasons, SEASON_BAR, SEASON_FILE), (flu, FLU_BAR, FLU_FILE)];

        let mut written = Vec::with_capacity(jobs.len());
        for (series, color, file_name) in jobs {
            let path = dir.join(file_name);
            let bytes = Self::render_png_bytes(&series, color, geometry)?;
            fs::write(&path, bytes).map_err(|source| RenderError::Io {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "chart exported");
            written.push(path);
        }

        Ok(written)
    }

    /// Value axis pinned to the ticks of `axis`, so the PNG shows the same
    /// tick values as the interactive chart.
    fn value_coord(axis: &ValueAxis) -> TickedValueCoord {
        TickedValueCoord::new(axis)
    }

    /// Pixels left empty on each side of a bar so that bar + gaps fill
    /// one category band.
    fn bar_margin(series: &BarSeries, geometry: &ChartGeometry) -> u32 {
        let n = series.bars.len().max(1) as f64;
        let band = geometry.plot_width() as f64 / n;
        (band * series.padding / 2.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AggregateResult, FluBucket, SeasonBucket};
    use plotters::coord::ranged1d::BoldPoints;

    fn summary() -> SeasonalSummary {
        let mut by_season = AggregateResult::default();
        by_season.add(SeasonBucket::Fall, 1200.0);
        by_season.add(SeasonBucket::Winter, 800.0);
        let mut by_flu = AggregateResult::default();
        by_flu.add(FluBucket::FluSeason, 2000.0);
        SeasonalSummary {
            by_season,
            by_flu,
            valid_records: 2,
        }
    }

    #[test]
    fn test_bar_margin_follows_padding() {
        let geometry = ChartGeometry::default();
        let [seasons, flu] = BarSeries::for_summary(&summary());

        // 472px plot area: 118px bands at 0.15, 236px bands at 0.25
        assert_eq!(StaticChartRenderer::bar_margin(&seasons, &geometry), 9);
        assert_eq!(StaticChartRenderer::bar_margin(&flu, &geometry), 30);
    }

    #[test]
    fn test_value_coord_uses_axis_ticks() {
        let axis = ValueAxis::for_max(1234.0);
        let ticks = axis.ticks();

        let coord = StaticChartRenderer::value_coord(&axis);

        assert_eq!(coord.range(), 0.0..1600.0);
        assert_eq!(coord.key_points(BoldPoints(ticks.len())), ticks);
        assert_eq!(ticks[1], 200.0);
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn test_render_png_bytes() {
        let geometry = ChartGeometry::default();
        let [seasons, _] = BarSeries::for_summary(&summary());

        let bytes = StaticChartRenderer::render_png_bytes(&seasons, SEASON_BAR, &geometry).unwrap();

        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn test_export_summary_writes_two_files() {
        let dir = tempfile::tempdir().unwrap();

        let written =
            StaticChartRenderer::export_summary(&summary(), &ChartGeometry::default(), dir.path())
                .unwrap();

        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
    }
}
