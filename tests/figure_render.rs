use std::fs;
use std::path::Path;

use tempfile::TempDir;

use permeafig::config::RunConfig;
use permeafig::data::model::{Cell, Series, SeriesGroup, Table};
use permeafig::figure::{AxisSpec, GridFigure, ImageFormat, ScatterFigure};
use permeafig::report;

const SVG_ONLY: [ImageFormat; 1] = [ImageFormat::Svg];

fn group() -> SeriesGroup {
    SeriesGroup {
        key: vec![0.0, 0.5, 1.0, 1.5],
        series: vec![
            Series {
                name: "DOPC".to_string(),
                mean: vec![1.0, 1.2, 1.6, 1.4],
                se: vec![0.1, 0.1, 0.2, 0.1],
            },
            Series {
                name: "MIX".to_string(),
                mean: vec![0.8, 1.0, 1.3, 1.2],
                se: vec![0.1, 0.1, 0.1, 0.1],
            },
        ],
    }
}

fn assert_non_empty(path: &Path) {
    let meta = fs::metadata(path).unwrap_or_else(|_| panic!("missing {}", path.display()));
    assert!(meta.len() > 0, "{} is empty", path.display());
}

#[test]
fn grid_figure_writes_one_file_per_format() {
    let dir = TempDir::new().unwrap();
    let mut fig = GridFigure::new(2, 2, "Distance [nm]");

    for position in 0..4 {
        fig.add_series(position, group(), false).unwrap();
        fig.set_axis(AxisSpec {
            x_limits: Some((0.0, 1.5)),
            y_limits: Some((0.0, 2.0)),
            x_major: Some(0.5),
            x_minor: Some(0.1),
            y_major: Some(0.5),
            y_minor: Some(0.25),
        })
        .unwrap();
    }
    // Overlay a second pass on the last panel; a log-scaled panel too.
    fig.add_series(3, group(), false).unwrap();
    fig.add_series(2, group(), true).unwrap();

    fig.set_column_titles(vec!["left".to_string(), "right".to_string()])
        .unwrap();
    fig.set_row_labels(vec!["top".to_string(), "bottom".to_string()])
        .unwrap();
    fig.add_legend(vec!["DOPC".to_string(), "MIX".to_string()]);

    let written = fig
        .render(&dir.path().join("grid_smoke"), &SVG_ONLY)
        .unwrap();
    assert_eq!(written.len(), 1);
    assert_non_empty(&written[0]);
    assert_eq!(written[0].extension().unwrap(), "svg");
}

#[test]
fn scatter_figure_writes_guides_points_and_legend() {
    let dir = TempDir::new().unwrap();
    let mut fig = ScatterFigure::new("logP DOPC", "logP MIX");
    fig.set_reference_guides((-7.0, 2.0), (-7.0, 2.0), (1.0, 1.0), (0.5, 0.5));

    let table = Table::new(
        vec![
            "molecule".to_string(),
            "DOPC_mean".to_string(),
            "DOPC_se".to_string(),
            "MIX_mean".to_string(),
            "MIX_se".to_string(),
            "Name".to_string(),
        ],
        vec![
            vec![
                Cell::Text("h2o".to_string()),
                Cell::Number(-4.0),
                Cell::Number(0.2),
                Cell::Number(-4.5),
                Cell::Number(0.3),
                Cell::Text("Water".to_string()),
            ],
            vec![
                Cell::Text("co2".to_string()),
                Cell::Number(-1.0),
                Cell::Number(0.1),
                Cell::Number(-0.8),
                Cell::Number(0.2),
                Cell::Text("Carbon dioxide".to_string()),
            ],
        ],
    );
    fig.plot_points(&table, "Name").unwrap();
    fig.add_legend();

    let written = fig
        .render(&dir.path().join("logp_smoke"), &SVG_ONLY)
        .unwrap();
    assert_non_empty(&written[0]);
}

// ---------------------------------------------------------------------------
// End-to-end through the orchestration layer
// ---------------------------------------------------------------------------

const PROFILE: &str = "\
# position\tDOPC_mean\tDOPC_se\tMIX_mean\tMIX_se
-0.5\t0.4\t0.05\t0.5\t0.05
0.0\t1.0\t0.10\t0.9\t0.10
0.5\t1.3\t0.10\t1.2\t0.10
1.0\t1.1\t0.10\t1.0\t0.10
";

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn seed_source_data(source: &Path) {
    write(
        &source.join(report::MOLECULES_FILE),
        "# Type,Name,MolWeight\nco2,Carbon\\ndioxide,44.01\nh2o,Water,18.02\n",
    );

    for metric in ["pmf", "diffusion", "resistance"] {
        for code in ["h2o", "co2"] {
            write(
                &source
                    .join(metric)
                    .join(format!("ba-Summary--{metric}--{code}.dat")),
                PROFILE,
            );
        }
    }
    for subclass in ["totals", "lipids", "waters"] {
        for code in ["h2o", "co2"] {
            write(
                &source.join("hbonds").join(subclass).join(format!(
                    "ba-Summary--hbonds--{subclass}--vmd--{code}.dat"
                )),
                PROFILE,
            );
        }
    }

    write(
        &source.join(report::LOGP_FILE),
        "# molecule\tDOPC_mean\tDOPC_se\tMIX_mean\tMIX_se\n\
         h2o\t-4.0\t0.2\t-4.5\t0.3\n\
         co2\t-1.0\t0.1\t-0.8\t0.2\n",
    );
}

#[test]
fn grid_report_renders_the_full_page() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig::new(dir.path().join("source_data"), dir.path().join("figures"));
    seed_source_data(&config.source_data);
    config.ensure_figures_dir().unwrap();

    report::plot_grid_figure(&config, &SVG_ONLY).unwrap();
    assert_non_empty(&config.figures.join("all_results.svg"));
}

#[test]
fn logp_report_renders_the_scatter() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig::new(dir.path().join("source_data"), dir.path().join("figures"));
    seed_source_data(&config.source_data);
    config.ensure_figures_dir().unwrap();

    report::plot_logp_figure(&config, &SVG_ONLY).unwrap();
    assert_non_empty(&config.figures.join("logP.svg"));
}

#[test]
fn a_missing_summary_file_aborts_the_grid_run() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig::new(dir.path().join("source_data"), dir.path().join("figures"));
    seed_source_data(&config.source_data);
    config.ensure_figures_dir().unwrap();
    fs::remove_file(
        config
            .source_data
            .join("diffusion")
            .join("ba-Summary--diffusion--h2o.dat"),
    )
    .unwrap();

    assert!(report::plot_grid_figure(&config, &SVG_ONLY).is_err());
    // No partial artifact is left behind for the failed figure.
    assert!(!config.figures.join("all_results.svg").exists());
}
