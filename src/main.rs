use anyhow::Context;
use log::info;

use permeafig::config::RunConfig;
use permeafig::figure::DEFAULT_FORMATS;
use permeafig::report;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = RunConfig::from_working_dir().context("resolving run directories")?;
    config
        .ensure_figures_dir()
        .with_context(|| format!("creating {}", config.figures.display()))?;

    report::plot_grid_figure(&config, &DEFAULT_FORMATS)?;
    report::plot_logp_figure(&config, &DEFAULT_FORMATS)?;

    info!("figures written to {}", config.figures.display());
    Ok(())
}
