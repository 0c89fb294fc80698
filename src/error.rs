use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// A summary or molecule file could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("sort column '{column}' not present in '{}'", path.display())]
    SortColumn { path: PathBuf, column: String },

    #[error("molecule table '{}' is unusable", path.display())]
    Molecules {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
}

/// A table does not have the shape an operation expects.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("column '{0}' not present in table")]
    MissingColumn(String),

    #[error("column '{column}' row {row} is not numeric: '{value}'")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("expected a key column followed by mean/se pairs, got {columns} columns")]
    UnpairedSeries { columns: usize },

    #[error("table has {columns} columns, at least {expected} required")]
    TooFewColumns { columns: usize, expected: usize },
}

/// A figure was driven with inputs its layout cannot satisfy.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no axis limits configured for molecule '{0}'")]
    UnknownMolecule(String),

    #[error("grid position {position} outside a {rows}x{cols} layout")]
    PositionOutOfGrid {
        position: usize,
        rows: usize,
        cols: usize,
    },

    #[error("no panel has been placed yet")]
    NoActivePanel,

    #[error("{provided} column titles provided for {expected} first-row panels")]
    TitleCount { provided: usize, expected: usize },

    #[error("{provided} row labels provided for {expected} first-column panels")]
    LabelCount { provided: usize, expected: usize },
}

/// Writing a figure to disk failed.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Backend(String),
}
