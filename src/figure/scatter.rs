use std::path::{Path, PathBuf};

use plotters::chart::{ChartBuilder, ChartContext, SeriesLabelPosition};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::color::generate_palette;
use crate::data::model::Table;
use crate::error::{RenderError, SchemaError};

use super::marker::{marker, marker_for_row, MarkerShape};
use super::{draw_err, light_line_count, tick_count, ImageFormat};

const CANVAS: (u32, u32) = (600, 600);
const MARKER_SIZE: i32 = 5;
const ERROR_BAR_ALPHA: f64 = 0.5;

// ---------------------------------------------------------------------------
// Scatter figure builder
// ---------------------------------------------------------------------------

struct ScatterPoint {
    x: f64,
    y: f64,
    x_err: f64,
    y_err: f64,
    label: String,
    shape: MarkerShape,
    colour: RGBColor,
}

struct GuideSpec {
    x_limits: (f64, f64),
    y_limits: (f64, f64),
    major_spacing: (f64, f64),
    minor_spacing: (f64, f64),
}

/// Single-panel figure of labelled points with error bars, plus reference
/// guide lines. Like [`super::GridFigure`], calls are recorded and
/// replayed in `render`.
pub struct ScatterFigure {
    x_label: String,
    y_label: String,
    points: Vec<ScatterPoint>,
    guides: Option<GuideSpec>,
    legend: bool,
}

impl ScatterFigure {
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        ScatterFigure {
            x_label: x_label.into(),
            y_label: y_label.into(),
            points: Vec::new(),
            guides: None,
            legend: false,
        }
    }

    /// One labelled point per table row. Columns 1 to 4 by position are
    /// (x, x-err, y, y-err); the label comes from the named column.
    /// Marker shapes are assigned by row order and wrap past the palette
    /// end; colours come from an evenly-spaced hue ramp over the rows.
    pub fn plot_points(&mut self, table: &Table, label_column: &str) -> Result<(), SchemaError> {
        let label_idx = table.column_index(label_column)?;
        if table.column_count() < 5 {
            return Err(SchemaError::TooFewColumns {
                columns: table.column_count(),
                expected: 5,
            });
        }

        let colours = generate_palette(table.row_count());
        for (row, cells) in table.rows().iter().enumerate() {
            let numeric = |col: usize| -> Result<f64, SchemaError> {
                cells[col].as_f64().ok_or_else(|| SchemaError::NonNumeric {
                    column: table.columns()[col].clone(),
                    row,
                    value: cells[col].to_string(),
                })
            };
            self.points.push(ScatterPoint {
                x: numeric(1)?,
                x_err: numeric(2)?,
                y: numeric(3)?,
                y_err: numeric(4)?,
                label: cells[label_idx].to_string(),
                shape: marker_for_row(row),
                colour: colours[row],
            });
        }
        Ok(())
    }

    /// Record a dashed diagonal across the given corners, dotted zero
    /// lines, and the axis limits and tick spacing.
    pub fn set_reference_guides(
        &mut self,
        x_limits: (f64, f64),
        y_limits: (f64, f64),
        major_spacing: (f64, f64),
        minor_spacing: (f64, f64),
    ) {
        self.guides = Some(GuideSpec {
            x_limits,
            y_limits,
            major_spacing,
            minor_spacing,
        });
    }

    pub fn add_legend(&mut self) {
        self.legend = true;
    }

    /// Number of recorded points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Write one file per requested format, sharing the base name.
    pub fn render(&self, base: &Path, formats: &[ImageFormat]) -> Result<Vec<PathBuf>, RenderError> {
        let mut written = Vec::with_capacity(formats.len());
        for format in formats {
            let path = base.with_extension(format.extension());
            // The per-point markers are type-erased `DynElement`s (see
            // `figure/marker.rs`), and plotters can only draw those through a
            // `'static` backend, which in turn needs the backend's path borrow
            // to be `'static`. Promote the path to a `'static` borrow so the
            // dynamic marker elements type-check; the backend is dropped at the
            // end of each iteration and the process reclaims the path on exit.
            let path_ref: &'static Path = Box::leak(path.clone().into_boxed_path());
            match format {
                ImageFormat::Svg => {
                    let root = SVGBackend::new(path_ref, CANVAS).into_drawing_area();
                    self.draw_on(&root)?;
                    root.present().map_err(draw_err)?;
                }
                ImageFormat::Png => {
                    let root = BitMapBackend::new(path_ref, CANVAS).into_drawing_area();
                    self.draw_on(&root)?;
                    root.present().map_err(draw_err)?;
                }
            }
            written.push(path);
        }
        Ok(written)
    }

    fn draw_on<DB: DrawingBackend + 'static>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(draw_err)?;

        let x_range = self
            .guides
            .as_ref()
            .map(|g| g.x_limits)
            .unwrap_or_else(|| self.data_extent(|p| (p.x, p.x_err)));
        let y_range = self
            .guides
            .as_ref()
            .map(|g| g.y_limits)
            .unwrap_or_else(|| self.data_extent(|p| (p.y, p.y_err)));

        let mut chart = ChartBuilder::on(root)
            .margin(14)
            .x_label_area_size(36)
            .y_label_area_size(46)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
            .map_err(draw_err)?;

        self.draw_mesh(&mut chart, x_range, y_range)?;
        self.draw_guides(&mut chart, x_range, y_range)?;
        self.draw_points(&mut chart)?;

        if self.legend {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK.mix(0.4))
                .label_font(("sans-serif", 9))
                .position(SeriesLabelPosition::UpperLeft)
                .draw()
                .map_err(draw_err)?;
        }

        Ok(())
    }

    fn draw_mesh<'a, DB: DrawingBackend + 'a>(
        &self,
        chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
        x_range: (f64, f64),
        y_range: (f64, f64),
    ) -> Result<(), RenderError> {
        let mut mesh = chart.configure_mesh();
        mesh.bold_line_style(BLACK.mix(0.15))
            .light_line_style(BLACK.mix(0.06))
            .label_style(("sans-serif", 10))
            .axis_desc_style(("sans-serif", 11))
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str());

        if let Some(guides) = &self.guides {
            mesh.x_labels(tick_count(x_range, guides.major_spacing.0));
            mesh.y_labels(tick_count(y_range, guides.major_spacing.1));
            mesh.x_max_light_lines(light_line_count(
                Some(guides.major_spacing.0),
                Some(guides.minor_spacing.0),
            ));
            mesh.y_max_light_lines(light_line_count(
                Some(guides.major_spacing.1),
                Some(guides.minor_spacing.1),
            ));
        }

        mesh.draw().map_err(draw_err)?;
        Ok(())
    }

    fn draw_guides<'a, DB: DrawingBackend + 'a>(
        &self,
        chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
        x_range: (f64, f64),
        y_range: (f64, f64),
    ) -> Result<(), RenderError> {
        if self.guides.is_none() {
            return Ok(());
        }
        let guide_style = BLACK.mix(0.3).stroke_width(1);

        // Diagonal across the configured corners.
        chart
            .draw_series(DashedLineSeries::new(
                vec![(x_range.0, y_range.0), (x_range.1, y_range.1)],
                8,
                6,
                guide_style,
            ))
            .map_err(draw_err)?;
        // Dotted zero lines, clipped away when 0 is out of range.
        chart
            .draw_series(DashedLineSeries::new(
                vec![(x_range.0, 0.0), (x_range.1, 0.0)],
                2,
                4,
                guide_style,
            ))
            .map_err(draw_err)?;
        chart
            .draw_series(DashedLineSeries::new(
                vec![(0.0, y_range.0), (0.0, y_range.1)],
                2,
                4,
                guide_style,
            ))
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_points<'a, DB: DrawingBackend + 'a + 'static>(
        &self,
        chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    ) -> Result<(), RenderError> {
        for point in &self.points {
            let bar_style = point.colour.mix(ERROR_BAR_ALPHA).stroke_width(1);
            chart
                .draw_series(std::iter::once(ErrorBar::new_vertical(
                    point.x,
                    point.y - point.y_err,
                    point.y,
                    point.y + point.y_err,
                    bar_style,
                    0,
                )))
                .map_err(draw_err)?;
            chart
                .draw_series(std::iter::once(ErrorBar::new_horizontal(
                    point.y,
                    point.x - point.x_err,
                    point.x,
                    point.x + point.x_err,
                    bar_style,
                    0,
                )))
                .map_err(draw_err)?;

            let anno = chart
                .draw_series(std::iter::once(marker(
                    point.shape,
                    (point.x, point.y),
                    MARKER_SIZE,
                    point.colour.filled(),
                )))
                .map_err(draw_err)?;
            if self.legend {
                let shape = point.shape;
                let colour = point.colour;
                anno.label(point.label.as_str()).legend(move |(x, y)| {
                    marker(shape, (x + 8, y), MARKER_SIZE, colour.filled())
                });
            }
        }
        Ok(())
    }

    fn data_extent(&self, accessor: impl Fn(&ScatterPoint) -> (f64, f64)) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for point in &self.points {
            let (value, err) = accessor(point);
            lo = lo.min(value - err);
            hi = hi.max(value + err);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return (0.0, 1.0);
        }
        let span = (hi - lo).max(f64::EPSILON);
        (lo - span * 0.05, hi + span * 0.05)
    }
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    fn merged_table(rows: usize) -> Table {
        let columns = vec![
            "molecule".to_string(),
            "DOPC_mean".to_string(),
            "DOPC_se".to_string(),
            "MIX_mean".to_string(),
            "MIX_se".to_string(),
            "Name".to_string(),
        ];
        let rows = (0..rows)
            .map(|i| {
                vec![
                    Cell::Text(format!("mol{i}")),
                    Cell::Number(i as f64 * 0.5 - 3.0),
                    Cell::Number(0.2),
                    Cell::Number(i as f64 * 0.4 - 3.0),
                    Cell::Number(0.3),
                    Cell::Text(format!("Molecule {i}")),
                ]
            })
            .collect();
        Table::new(columns, rows)
    }

    #[test]
    fn one_point_per_row_with_positional_columns() {
        let mut fig = ScatterFigure::new("x", "y");
        fig.plot_points(&merged_table(3), "Name").unwrap();
        assert_eq!(fig.point_count(), 3);
        assert_eq!(fig.points[0].x, -3.0);
        assert_eq!(fig.points[0].x_err, 0.2);
        assert_eq!(fig.points[0].y, -3.0);
        assert_eq!(fig.points[0].y_err, 0.3);
        assert_eq!(fig.points[2].label, "Molecule 2");
    }

    #[test]
    fn markers_wrap_past_the_palette() {
        let mut fig = ScatterFigure::new("x", "y");
        fig.plot_points(&merged_table(15), "Name").unwrap();
        assert_eq!(fig.points[13].shape, fig.points[0].shape);
        assert_eq!(fig.points[14].shape, fig.points[1].shape);
        assert_ne!(fig.points[0].shape, fig.points[1].shape);
    }

    #[test]
    fn rejects_missing_label_column() {
        let mut fig = ScatterFigure::new("x", "y");
        assert!(matches!(
            fig.plot_points(&merged_table(2), "Label"),
            Err(SchemaError::MissingColumn(_))
        ));
    }

    #[test]
    fn rejects_tables_without_value_pairs() {
        let narrow = Table::new(
            vec!["molecule".to_string(), "Name".to_string()],
            vec![vec![
                Cell::Text("h2o".to_string()),
                Cell::Text("Water".to_string()),
            ]],
        );
        let mut fig = ScatterFigure::new("x", "y");
        assert!(matches!(
            fig.plot_points(&narrow, "Name"),
            Err(SchemaError::TooFewColumns {
                columns: 2,
                expected: 5
            })
        ));
    }
}
