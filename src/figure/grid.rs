use std::path::{Path, PathBuf};

use plotters::chart::{ChartBuilder, ChartContext, SeriesLabelPosition};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::color::{line_style_for_visit, series_colour, LineStyle};
use crate::data::model::SeriesGroup;
use crate::error::{ConfigError, RenderError};

use super::{draw_err, light_line_count, tick_count, ImageFormat};

/// A4 canvas at 100 dpi, portrait.
const CANVAS: (u32, u32) = (827, 1169);
/// Height of the shared x-axis label band at the page bottom.
const X_LABEL_BAND: i32 = 26;
const MEAN_LINE_WIDTH: u32 = 3;
const BAND_ALPHA: f64 = 0.4;

// ---------------------------------------------------------------------------
// Axis specification
// ---------------------------------------------------------------------------

/// Per-panel axis limits and tick spacing; every field independently
/// optional. Major spacing draws a visible gridline per tick, minor
/// spacing subdivides it with light lines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisSpec {
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
    pub x_major: Option<f64>,
    pub x_minor: Option<f64>,
    pub y_major: Option<f64>,
    pub y_minor: Option<f64>,
}

// ---------------------------------------------------------------------------
// Grid figure builder
// ---------------------------------------------------------------------------

struct CellSeries {
    group: SeriesGroup,
    style: LineStyle,
}

struct GridCell {
    position: usize,
    entries: Vec<CellSeries>,
    axis: AxisSpec,
    log_scale: bool,
}

/// Multi-panel page figure over a fixed (rows x columns) grid.
///
/// Calls are recorded and replayed onto a backend in [`GridFigure::render`].
/// Revisiting a grid position overlays another series in the next line
/// style; visiting a new position resets the style counter. The first
/// panel seen in grid-row 0 / grid-column 0 positions is remembered, in
/// first-encounter order, for column titles and row labels.
pub struct GridFigure {
    rows: usize,
    cols: usize,
    x_label: String,
    cells: Vec<GridCell>,
    last_position: Option<usize>,
    visit_count: usize,
    first_row: Vec<usize>,
    first_col: Vec<usize>,
    column_titles: Vec<String>,
    row_labels: Vec<String>,
    legend: Option<Vec<String>>,
}

impl GridFigure {
    pub fn new(rows: usize, cols: usize, x_label: impl Into<String>) -> Self {
        GridFigure {
            rows,
            cols,
            x_label: x_label.into(),
            cells: Vec::new(),
            last_position: None,
            visit_count: 0,
            first_row: Vec::new(),
            first_col: Vec::new(),
            column_titles: Vec::new(),
            row_labels: Vec::new(),
            legend: None,
        }
    }

    /// Place a series group on the panel at `position` (0-based, row-major).
    ///
    /// The first visit creates the panel; revisits overlay further series.
    /// The line style follows the visit counter: `(visits - 1) mod 3` over
    /// solid, dashed, dotted. `log_scale` selects a logarithmic y axis for
    /// the whole panel (the last call wins, matching overlay order).
    pub fn add_series(
        &mut self,
        position: usize,
        group: SeriesGroup,
        log_scale: bool,
    ) -> Result<(), ConfigError> {
        if position >= self.rows * self.cols {
            return Err(ConfigError::PositionOutOfGrid {
                position,
                rows: self.rows,
                cols: self.cols,
            });
        }

        if self.last_position != Some(position) {
            self.visit_count = 1;
        } else {
            self.visit_count += 1;
        }
        self.last_position = Some(position);
        let style = line_style_for_visit(self.visit_count);

        if position < self.cols && !self.first_row.contains(&position) {
            self.first_row.push(position);
        }
        if position % self.cols == 0 && !self.first_col.contains(&position) {
            self.first_col.push(position);
        }

        match self.cells.iter_mut().find(|c| c.position == position) {
            Some(cell) => {
                cell.entries.push(CellSeries { group, style });
                cell.log_scale = log_scale;
            }
            None => self.cells.push(GridCell {
                position,
                entries: vec![CellSeries { group, style }],
                axis: AxisSpec::default(),
                log_scale,
            }),
        }
        Ok(())
    }

    /// Apply axis limits and tick spacing to the most-recently-visited
    /// panel only.
    pub fn set_axis(&mut self, axis: AxisSpec) -> Result<(), ConfigError> {
        let position = self.last_position.ok_or(ConfigError::NoActivePanel)?;
        let cell = self
            .cells
            .iter_mut()
            .find(|c| c.position == position)
            .ok_or(ConfigError::NoActivePanel)?;
        cell.axis = axis;
        Ok(())
    }

    /// Assign `titles[i]` to the i-th remembered first-row panel. The
    /// count must match the number of remembered panels.
    pub fn set_column_titles(&mut self, titles: Vec<String>) -> Result<(), ConfigError> {
        if titles.len() != self.first_row.len() {
            return Err(ConfigError::TitleCount {
                provided: titles.len(),
                expected: self.first_row.len(),
            });
        }
        self.column_titles = titles;
        Ok(())
    }

    /// Assign `labels[i]` to the i-th remembered first-column panel. The
    /// count must match the number of remembered panels.
    pub fn set_row_labels(&mut self, labels: Vec<String>) -> Result<(), ConfigError> {
        if labels.len() != self.first_col.len() {
            return Err(ConfigError::LabelCount {
                provided: labels.len(),
                expected: self.first_col.len(),
            });
        }
        self.row_labels = labels;
        Ok(())
    }

    /// Attach a legend naming the series of a group, drawn in the
    /// last-visited panel.
    pub fn add_legend(&mut self, labels: Vec<String>) {
        self.legend = Some(labels);
    }

    /// Number of panels placed so far.
    pub fn panel_count(&self) -> usize {
        self.cells.len()
    }

    /// Total mean/se pairs recorded at a position, across overlays.
    pub fn series_count(&self, position: usize) -> usize {
        self.cells
            .iter()
            .find(|c| c.position == position)
            .map(|c| c.entries.iter().map(|e| e.group.series_count()).sum())
            .unwrap_or(0)
    }

    /// Write one file per requested format, sharing the base name.
    pub fn render(&self, base: &Path, formats: &[ImageFormat]) -> Result<Vec<PathBuf>, RenderError> {
        let mut written = Vec::with_capacity(formats.len());
        for format in formats {
            let path = base.with_extension(format.extension());
            match format {
                ImageFormat::Svg => {
                    let root = SVGBackend::new(&path, CANVAS).into_drawing_area();
                    self.draw_on(&root)?;
                    root.present().map_err(draw_err)?;
                }
                ImageFormat::Png => {
                    let root = BitMapBackend::new(&path, CANVAS).into_drawing_area();
                    self.draw_on(&root)?;
                    root.present().map_err(draw_err)?;
                }
            }
            written.push(path);
        }
        Ok(written)
    }

    fn draw_on<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(draw_err)?;

        let (width, height) = root.dim_in_pixel();
        let (panel_band, label_band) = root.split_vertically(height as i32 - X_LABEL_BAND);
        let panels = panel_band
            .margin(6, 2, 8, 10)
            .split_evenly((self.rows, self.cols));

        for cell in &self.cells {
            self.draw_cell(cell, &panels[cell.position])?;
        }

        let label_style = TextStyle::from(("sans-serif", 13).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center));
        label_band
            .draw(&Text::new(
                self.x_label.clone(),
                (width as i32 / 2, X_LABEL_BAND / 2),
                label_style,
            ))
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_cell<DB: DrawingBackend>(
        &self,
        cell: &GridCell,
        panel: &DrawingArea<DB, Shift>,
    ) -> Result<(), RenderError> {
        let bottom_row = cell.position >= (self.rows.saturating_sub(1)) * self.cols;
        let first_col = cell.position % self.cols == 0;

        let title = self
            .first_row
            .iter()
            .position(|&p| p == cell.position)
            .and_then(|i| self.column_titles.get(i));
        let row_label = self
            .first_col
            .iter()
            .position(|&p| p == cell.position)
            .and_then(|i| self.row_labels.get(i));
        let legend = match &self.legend {
            Some(labels) if self.last_position == Some(cell.position) => Some(labels.as_slice()),
            _ => None,
        };

        let x_range = cell.axis.x_limits.unwrap_or_else(|| x_extent(cell));
        let mut y_range = cell
            .axis
            .y_limits
            .unwrap_or_else(|| y_extent(cell, cell.log_scale));
        if cell.log_scale {
            y_range = positive_range(y_range);
        }

        let mut builder = ChartBuilder::on(panel);
        builder
            .margin(4)
            .x_label_area_size(if bottom_row { 20 } else { 6 })
            .y_label_area_size(if first_col { 52 } else { 34 });
        if let Some(title) = title {
            builder.caption(title, ("sans-serif", 11));
        }

        if cell.log_scale {
            let mut chart = builder
                .build_cartesian_2d(x_range.0..x_range.1, (y_range.0..y_range.1).log_scale())
                .map_err(draw_err)?;
            draw_panel(&mut chart, cell, x_range, y_range, bottom_row, row_label, legend)
        } else {
            let mut chart = builder
                .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
                .map_err(draw_err)?;
            draw_panel(&mut chart, cell, x_range, y_range, bottom_row, row_label, legend)
        }
    }
}

// ---------------------------------------------------------------------------
// Panel drawing, shared between the linear and logarithmic y coordinate
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn draw_panel<'a, DB, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, Y>>,
    cell: &GridCell,
    x_range: (f64, f64),
    y_range: (f64, f64),
    bottom_row: bool,
    row_label: Option<&String>,
    legend: Option<&[String]>,
) -> Result<(), RenderError>
where
    DB: DrawingBackend + 'a,
    Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let hide_labels = |_: &f64| String::new();
    let scientific = |v: &f64| format!("{v:.0e}");

    {
        let mut mesh = chart.configure_mesh();
        mesh.bold_line_style(BLACK.mix(0.2))
            .light_line_style(BLACK.mix(0.08))
            .label_style(("sans-serif", 9))
            .axis_desc_style(("sans-serif", 9));

        if let Some(spacing) = cell.axis.x_major {
            mesh.x_labels(tick_count(x_range, spacing));
        }
        mesh.x_max_light_lines(light_line_count(cell.axis.x_major, cell.axis.x_minor));

        if cell.log_scale {
            mesh.y_label_formatter(&scientific);
            mesh.y_max_light_lines(0);
        } else {
            if let Some(spacing) = cell.axis.y_major {
                mesh.y_labels(tick_count(y_range, spacing));
            }
            mesh.y_max_light_lines(light_line_count(cell.axis.y_major, cell.axis.y_minor));
        }

        if !bottom_row {
            mesh.x_label_formatter(&hide_labels);
        }
        if let Some(label) = row_label {
            mesh.y_desc(label.as_str());
        }

        mesh.draw().map_err(draw_err)?;
    }

    // Band extents must stay inside the panel on a log axis.
    let band_floor = if cell.log_scale {
        Some(y_range.0)
    } else {
        None
    };

    for (entry_idx, entry) in cell.entries.iter().enumerate() {
        for (series_idx, series) in entry.group.series.iter().enumerate() {
            let colour = series_colour(series_idx);

            let mut band: Vec<(f64, f64)> = entry
                .group
                .key
                .iter()
                .zip(series.mean.iter().zip(&series.se))
                .map(|(&k, (&m, &se))| (k, m + se))
                .collect();
            band.extend(
                entry
                    .group
                    .key
                    .iter()
                    .zip(series.mean.iter().zip(&series.se))
                    .rev()
                    .map(|(&k, (&m, &se))| {
                        let lo = m - se;
                        (k, band_floor.map_or(lo, |floor| lo.max(floor)))
                    }),
            );
            chart
                .draw_series(std::iter::once(Polygon::new(band, colour.mix(BAND_ALPHA))))
                .map_err(draw_err)?;

            let points: Vec<(f64, f64)> = entry
                .group
                .key
                .iter()
                .zip(&series.mean)
                .map(|(&k, &m)| (k, m))
                .collect();
            let line_style = colour.stroke_width(MEAN_LINE_WIDTH);
            let anno = match entry.style {
                LineStyle::Solid => chart
                    .draw_series(LineSeries::new(points, line_style))
                    .map_err(draw_err)?,
                LineStyle::Dashed => chart
                    .draw_series(DashedLineSeries::new(points, 8, 5, line_style))
                    .map_err(draw_err)?,
                LineStyle::Dotted => chart
                    .draw_series(DashedLineSeries::new(points, 2, 4, line_style))
                    .map_err(draw_err)?,
            };

            if let Some(labels) = legend {
                if entry_idx == 0 {
                    if let Some(label) = labels.get(series_idx) {
                        anno.label(label.as_str()).legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 16, y)], colour.stroke_width(2))
                        });
                    }
                }
            }
        }
    }

    if legend.is_some() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .label_font(("sans-serif", 9))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(draw_err)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Data extents, used when a panel carries no explicit limits
// ---------------------------------------------------------------------------

fn x_extent(cell: &GridCell) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for entry in &cell.entries {
        for &k in &entry.group.key {
            lo = lo.min(k);
            hi = hi.max(k);
        }
    }
    pad_extent(lo, hi)
}

fn y_extent(cell: &GridCell, log_scale: bool) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for entry in &cell.entries {
        for series in &entry.group.series {
            for (&m, &se) in series.mean.iter().zip(&series.se) {
                lo = lo.min(m - se);
                hi = hi.max(m + se);
            }
        }
    }
    if log_scale {
        let hi = if hi.is_finite() && hi > 0.0 { hi * 1.1 } else { 1.0 };
        let lo = if lo.is_finite() && lo > 0.0 { lo / 1.1 } else { hi / 1e6 };
        (lo, hi)
    } else {
        pad_extent(lo, hi)
    }
}

/// A logarithmic axis cannot cross zero; pull a non-positive window onto
/// six decades below its ceiling.
fn positive_range((lo, hi): (f64, f64)) -> (f64, f64) {
    let hi = if hi > 0.0 { hi } else { 1.0 };
    let lo = if lo > 0.0 { lo } else { hi / 1e6 };
    (lo, hi)
}

fn pad_extent(lo: f64, hi: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * 0.05, hi + span * 0.05)
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Series;

    fn group(pairs: usize) -> SeriesGroup {
        SeriesGroup {
            key: vec![0.0, 1.0, 2.0],
            series: (0..pairs)
                .map(|i| Series {
                    name: format!("set{i}"),
                    mean: vec![1.0, 1.5, 2.0],
                    se: vec![0.1, 0.1, 0.1],
                })
                .collect(),
        }
    }

    #[test]
    fn repeated_positions_cycle_line_styles() {
        let mut fig = GridFigure::new(2, 2, "x");
        for _ in 0..4 {
            fig.add_series(0, group(1), false).unwrap();
        }
        let styles: Vec<LineStyle> = fig.cells[0].entries.iter().map(|e| e.style).collect();
        assert_eq!(
            styles,
            [
                LineStyle::Solid,
                LineStyle::Dashed,
                LineStyle::Dotted,
                LineStyle::Solid
            ]
        );
    }

    #[test]
    fn new_position_resets_the_style_counter() {
        let mut fig = GridFigure::new(2, 2, "x");
        fig.add_series(0, group(1), false).unwrap();
        fig.add_series(0, group(1), false).unwrap();
        fig.add_series(1, group(1), false).unwrap();
        fig.add_series(0, group(1), false).unwrap();

        assert_eq!(fig.cells[1].entries[0].style, LineStyle::Solid);
        // Returning to a previously visited position starts over as well.
        assert_eq!(fig.cells[0].entries[2].style, LineStyle::Solid);
    }

    #[test]
    fn records_one_panel_per_position_with_all_series() {
        let mut fig = GridFigure::new(2, 2, "x");
        fig.add_series(3, group(2), false).unwrap();
        fig.add_series(3, group(2), false).unwrap();
        assert_eq!(fig.panel_count(), 1);
        assert_eq!(fig.series_count(3), 4);
        assert_eq!(fig.series_count(0), 0);
    }

    #[test]
    fn rejects_positions_outside_the_grid() {
        let mut fig = GridFigure::new(2, 2, "x");
        assert!(matches!(
            fig.add_series(4, group(1), false),
            Err(ConfigError::PositionOutOfGrid { position: 4, .. })
        ));
    }

    #[test]
    fn remembers_first_row_and_column_panels_once() {
        let mut fig = GridFigure::new(2, 2, "x");
        fig.add_series(0, group(1), false).unwrap();
        fig.add_series(0, group(1), false).unwrap();
        fig.add_series(1, group(1), false).unwrap();
        fig.add_series(2, group(1), false).unwrap();
        fig.add_series(3, group(1), false).unwrap();

        assert_eq!(fig.first_row, [0, 1]);
        assert_eq!(fig.first_col, [0, 2]);
    }

    #[test]
    fn axis_spec_applies_to_most_recent_panel_only() {
        let mut fig = GridFigure::new(2, 2, "x");
        assert!(matches!(
            fig.set_axis(AxisSpec::default()),
            Err(ConfigError::NoActivePanel)
        ));

        fig.add_series(0, group(1), false).unwrap();
        fig.add_series(1, group(1), false).unwrap();
        let axis = AxisSpec {
            y_limits: Some((0.0, 3.0)),
            ..AxisSpec::default()
        };
        fig.set_axis(axis).unwrap();

        assert_eq!(fig.cells[0].axis, AxisSpec::default());
        assert_eq!(fig.cells[1].axis.y_limits, Some((0.0, 3.0)));
    }

    #[test]
    fn title_and_label_counts_must_match() {
        let mut fig = GridFigure::new(2, 2, "x");
        fig.add_series(0, group(1), false).unwrap();
        fig.add_series(1, group(1), false).unwrap();
        fig.add_series(2, group(1), false).unwrap();

        assert!(matches!(
            fig.set_column_titles(vec!["a".into()]),
            Err(ConfigError::TitleCount {
                provided: 1,
                expected: 2
            })
        ));
        fig.set_column_titles(vec!["a".into(), "b".into()]).unwrap();

        assert!(matches!(
            fig.set_row_labels(vec!["a".into(), "b".into(), "c".into()]),
            Err(ConfigError::LabelCount {
                provided: 3,
                expected: 2
            })
        ));
        fig.set_row_labels(vec!["r0".into(), "r1".into()]).unwrap();
    }

    #[test]
    fn log_extent_stays_positive() {
        let cell = GridCell {
            position: 0,
            entries: vec![CellSeries {
                group: SeriesGroup {
                    key: vec![0.0, 1.0],
                    series: vec![Series {
                        name: "s".into(),
                        mean: vec![10.0, 100.0],
                        se: vec![20.0, 5.0],
                    }],
                },
                style: LineStyle::Solid,
            }],
            axis: AxisSpec::default(),
            log_scale: true,
        };
        let (lo, hi) = y_extent(&cell, true);
        assert!(lo > 0.0);
        assert!(hi > lo);
    }
}
