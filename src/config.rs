use std::io;
use std::path::PathBuf;

/// Default name of the input directory under the working directory.
pub const SOURCE_DATA_DIR: &str = "source_data";
/// Default name of the output directory under the working directory.
pub const FIGURES_DIR: &str = "figures";

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// The directories a figure run reads from and writes to, threaded
/// explicitly into the orchestration layer.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Where the summary tables and the molecules file live.
    pub source_data: PathBuf,
    /// Where the rendered artifacts go; created on demand.
    pub figures: PathBuf,
}

impl RunConfig {
    pub fn new(source_data: impl Into<PathBuf>, figures: impl Into<PathBuf>) -> Self {
        RunConfig {
            source_data: source_data.into(),
            figures: figures.into(),
        }
    }

    /// Resolve both directories relative to the current working directory.
    pub fn from_working_dir() -> io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(RunConfig::new(
            cwd.join(SOURCE_DATA_DIR),
            cwd.join(FIGURES_DIR),
        ))
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_figures_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.figures)
    }
}
