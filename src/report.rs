use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use log::{debug, info};

use crate::config::RunConfig;
use crate::data::filter::{retain_non_negative_positions, select_columns};
use crate::data::loader::{load_molecules, load_sorted_table, load_table};
use crate::data::model::{Cell, SeriesGroup, Table};
use crate::error::{ConfigError, SchemaError};
use crate::figure::{AxisSpec, GridFigure, ImageFormat, ScatterFigure};

// ---------------------------------------------------------------------------
// Catalog of inputs
// ---------------------------------------------------------------------------

pub const MOLECULES_FILE: &str = "molecules.csv";
pub const LOGP_FILE: &str = "ba-Summary--logP--Hummer_Method.dat";

const X_AXIS_LABEL: &str = "Distance from bilayer centre [nm]";
const PROFILE_COLUMNS: [&str; 5] = ["position", "DOPC_mean", "DOPC_se", "MIX_mean", "MIX_se"];
const LOGP_COLUMNS: [&str; 5] = ["molecule", "DOPC_mean", "DOPC_se", "MIX_mean", "MIX_se"];
const HBOND_SUBCLASSES: [&str; 3] = ["totals", "lipids", "waters"];
const COMPOSITION_LABELS: [&str; 2] = ["DOPC", "MIX"];

/// One grid column: a result category and its column-title text.
pub struct GridMetric {
    pub key: &'static str,
    pub title: &'static str,
}

pub const GRID_METRICS: [GridMetric; 4] = [
    GridMetric {
        key: "pmf",
        title: "Free energy \u{394}G [kcal/mol]",
    },
    GridMetric {
        key: "diffusion",
        title: "Local diffusion [1e-5 cm^2/s]",
    },
    GridMetric {
        key: "resistance",
        title: "Local resistance [1e6 s/cm^2]",
    },
    GridMetric {
        key: "hbonds",
        title: "Hydrogen bonds per frame",
    },
];

// ---------------------------------------------------------------------------
// Per-molecule axis windows
// ---------------------------------------------------------------------------

/// Shared x window of every positional profile.
const PROFILE_X_LIMITS: (f64, f64) = (0.0, 2.7);

/// Per-molecule y windows for the free-energy column:
/// (code, min, max, major spacing, minor spacing).
const FREE_ENERGY_LIMITS: [(&str, f64, f64, f64, f64); 13] = [
    ("nh3", 0.0, 6.0, 2.0, 1.0),
    ("h2o", 0.0, 9.0, 3.0, 1.5),
    ("ch3f", -0.8, 0.8, 0.8, 0.4),
    ("co2", -1.2, 0.6, 0.6, 0.4),
    ("c3h8", -4.0, 2.0, 2.0, 1.0),
    ("c2h6o", -2.0, 4.0, 2.0, 1.0),
    ("ch4n2o", 0.0, 12.0, 4.0, 2.0),
    ("c3h8o", -2.0, 4.0, 2.0, 1.0),
    ("c2h5no2", 0.0, 9.0, 3.0, 1.5),
    ("c6h6o", -4.0, 2.0, 2.0, 1.0),
    ("c7h6o2", -4.0, 2.0, 2.0, 1.0),
    ("c9h6o2", -4.0, 2.0, 2.0, 1.0),
    ("c8h9no2", -3.0, 6.0, 3.0, 1.5),
];

/// Per-molecule decade windows for the log-scaled resistance column.
const RESISTANCE_LIMITS: [(&str, f64, f64); 13] = [
    ("nh3", 1e-6, 1e6),
    ("h2o", 1e-6, 1e6),
    ("ch3f", 1e-2, 1e2),
    ("co2", 1e-2, 1e2),
    ("c3h8", 1e-4, 1e4),
    ("c2h6o", 1e-4, 1e4),
    ("ch4n2o", 1e-12, 1e12),
    ("c3h8o", 1e-3, 1e3),
    ("c2h5no2", 1e-6, 1e6),
    ("c6h6o", 1e-3, 1e3),
    ("c7h6o2", 1e-3, 1e3),
    ("c9h6o2", 1e-2, 1e2),
    ("c8h9no2", 1e-6, 1e6),
];

fn profile_axis(
    y_limits: Option<(f64, f64)>,
    y_major: Option<f64>,
    y_minor: Option<f64>,
) -> AxisSpec {
    AxisSpec {
        x_limits: Some(PROFILE_X_LIMITS),
        x_major: Some(0.5),
        x_minor: Some(0.1),
        y_limits,
        y_major,
        y_minor,
    }
}

fn free_energy_axis(code: &str) -> Result<AxisSpec, ConfigError> {
    FREE_ENERGY_LIMITS
        .iter()
        .find(|entry| entry.0 == code)
        .map(|&(_, lo, hi, major, minor)| {
            profile_axis(Some((lo, hi)), Some(major), Some(minor))
        })
        .ok_or_else(|| ConfigError::UnknownMolecule(code.to_string()))
}

fn resistance_axis(code: &str) -> Result<AxisSpec, ConfigError> {
    RESISTANCE_LIMITS
        .iter()
        .find(|entry| entry.0 == code)
        .map(|&(_, lo, hi)| profile_axis(Some((lo, hi)), None, None))
        .ok_or_else(|| ConfigError::UnknownMolecule(code.to_string()))
}

// ---------------------------------------------------------------------------
// Grid figure: molecules (rows) x metrics (columns)
// ---------------------------------------------------------------------------

/// Render the full results grid to `all_results.*`, one file per format.
pub fn plot_grid_figure(config: &RunConfig, formats: &[ImageFormat]) -> Result<()> {
    let molecules_path = config.source_data.join(MOLECULES_FILE);
    let molecules = load_molecules(&molecules_path)?;
    ensure!(
        !molecules.is_empty(),
        "no molecules listed in {}",
        molecules_path.display()
    );

    let cols = GRID_METRICS.len();
    let mut figure = GridFigure::new(molecules.len(), cols, X_AXIS_LABEL);

    for (col, metric) in GRID_METRICS.iter().enumerate() {
        info!("plotting {}", metric.key);
        for (row, molecule) in molecules.iter().enumerate() {
            debug!("molecule {}", molecule.code);
            let position = row * cols + col;

            match metric.key {
                "hbonds" => {
                    for subclass in HBOND_SUBCLASSES {
                        let path = config
                            .source_data
                            .join(metric.key)
                            .join(subclass)
                            .join(format!(
                                "ba-Summary--hbonds--{subclass}--vmd--{}.dat",
                                molecule.code
                            ));
                        let group = load_profile(&path)?;
                        figure.add_series(position, group, false)?;
                        figure.set_axis(profile_axis(Some((0.0, 1.6)), Some(0.4), Some(0.2)))?;
                    }
                }
                "resistance" => {
                    let group = load_profile(&summary_path(config, metric.key, &molecule.code))?;
                    figure.add_series(position, group, true)?;
                    figure.set_axis(resistance_axis(&molecule.code)?)?;
                }
                "diffusion" => {
                    let group = load_profile(&summary_path(config, metric.key, &molecule.code))?;
                    figure.add_series(position, group, false)?;
                    figure.set_axis(profile_axis(Some((0.0, 3.0)), Some(1.0), Some(0.5)))?;
                }
                _ => {
                    let group = load_profile(&summary_path(config, metric.key, &molecule.code))?;
                    figure.add_series(position, group, false)?;
                    figure.set_axis(free_energy_axis(&molecule.code)?)?;
                }
            }
        }
    }

    figure.add_legend(COMPOSITION_LABELS.iter().map(|s| s.to_string()).collect());
    figure.set_column_titles(GRID_METRICS.iter().map(|m| m.title.to_string()).collect())?;
    figure.set_row_labels(molecules.iter().map(|m| grid_row_label(&m.name)).collect())?;

    let base = config.figures.join("all_results");
    for path in figure.render(&base, formats)? {
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn summary_path(config: &RunConfig, metric: &str, code: &str) -> PathBuf {
    config
        .source_data
        .join(metric)
        .join(format!("ba-Summary--{metric}--{code}.dat"))
}

/// Tab-separated summary file -> non-negative positions -> the DOPC/MIX
/// mean/se columns, as a plottable series group.
fn load_profile(path: &Path) -> Result<SeriesGroup> {
    let table = load_table(path, b'\t')?;
    let positive = retain_non_negative_positions(&table)
        .with_context(|| format!("filtering positions in {}", path.display()))?;
    let picked = select_columns(&positive, &PROFILE_COLUMNS)
        .with_context(|| format!("selecting summary columns in {}", path.display()))?;
    SeriesGroup::from_table(&picked)
        .with_context(|| format!("reading mean/se pairs from {}", path.display()))
}

// ---------------------------------------------------------------------------
// Partition-coefficient scatter figure
// ---------------------------------------------------------------------------

/// Render the logP comparison scatter to `logP.*`, one file per format.
pub fn plot_logp_figure(config: &RunConfig, formats: &[ImageFormat]) -> Result<()> {
    info!("plotting logP");

    let molecules = load_sorted_table(
        &config.source_data.join(MOLECULES_FILE),
        b',',
        "MolWeight",
    )?;
    let summary = load_table(&config.source_data.join(LOGP_FILE), b'\t')?;
    let picked = select_columns(&summary, &LOGP_COLUMNS)
        .with_context(|| format!("selecting logP columns in {LOGP_FILE}"))?;

    let mut merged = picked.inner_join(&molecules, "molecule", "Type")?;
    merged.sort_by_numeric("MolWeight")?;
    let merged = clean_display_names(&merged, "Name")?;

    let mut figure = ScatterFigure::new("logP DOPC", "logP DOPC:DOPE (1:3)");
    figure.set_reference_guides((-7.0, 2.0), (-7.0, 2.0), (1.0, 1.0), (0.5, 0.5));
    figure.plot_points(&merged, "Name")?;
    figure.add_legend();

    let base = config.figures.join("logP");
    for path in figure.render(&base, formats)? {
        info!("wrote {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Display-name cleanup
// ---------------------------------------------------------------------------

/// Molecule names carry literal `\n` markers for the multi-line labels of
/// the page figure; single-line contexts flatten them.
fn grid_row_label(name: &str) -> String {
    name.replace("\\n", " ")
}

fn scatter_display_name(name: &str) -> String {
    name.replace("\\n", " ").replace("- ", "")
}

fn clean_display_names(table: &Table, column: &str) -> Result<Table, SchemaError> {
    let idx = table.column_index(column)?;
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if let Cell::Text(name) = &row[idx] {
                row[idx] = Cell::Text(scatter_display_name(name));
            }
            row
        })
        .collect();
    Ok(Table::new(table.columns().to_vec(), rows))
}

// ---------------------------------------------------------------------------
