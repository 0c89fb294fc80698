use std::path::Path;

use crate::error::LoadError;

use super::model::{Cell, MoleculeSet, Table};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a delimited text file into a [`Table`].
///
/// The first header field may carry a leading `#` comment marker (with or
/// without following whitespace); it is stripped from that field only.
pub fn load_table(path: &Path, delimiter: u8) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let mut columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    if let Some(first) = columns.first_mut() {
        *first = strip_comment_marker(first).to_string();
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(record.iter().map(Cell::parse).collect());
    }

    Ok(Table::new(columns, rows))
}

/// Load a table, then stable-sort its rows ascending by the numeric value
/// of `sort_column`.
pub fn load_sorted_table(
    path: &Path,
    delimiter: u8,
    sort_column: &str,
) -> Result<Table, LoadError> {
    let mut table = load_table(path, delimiter)?;
    table
        .sort_by_numeric(sort_column)
        .map_err(|_| LoadError::SortColumn {
            path: path.to_path_buf(),
            column: sort_column.to_string(),
        })?;
    Ok(table)
}

/// Load the comma-separated molecule properties file, sorted by molecular
/// weight, as typed records.
pub fn load_molecules(path: &Path) -> Result<MoleculeSet, LoadError> {
    let table = load_sorted_table(path, b',', "MolWeight")?;
    MoleculeSet::from_table(&table).map_err(|source| LoadError::Molecules {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Header normalisation
// ---------------------------------------------------------------------------

/// Strip a leading comment marker and any following whitespace from a
/// header field. Idempotent: stripping twice equals stripping once.
pub fn strip_comment_marker(name: &str) -> &str {
    name.trim_start_matches('#').trim_start()
}

// ---------------------------------------------------------------------------
