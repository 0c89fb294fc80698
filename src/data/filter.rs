use crate::error::SchemaError;

use super::model::Table;

/// Name of the profile key column used by the positional filter.
pub const POSITION_COLUMN: &str = "position";

// ---------------------------------------------------------------------------
// Row/column filters – non-mutating, return a new table
// ---------------------------------------------------------------------------

/// Reduce a table to exactly the requested columns, in the requested order.
pub fn select_columns(table: &Table, names: &[&str]) -> Result<Table, SchemaError> {
    let indices = names
        .iter()
        .map(|name| table.column_index(name))
        .collect::<Result<Vec<_>, _>>()?;

    let columns = names.iter().map(|n| n.to_string()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Ok(Table::new(columns, rows))
}

/// Retain the rows whose `position` column is numeric and >= 0.0.
/// Applying the filter twice yields the same table as applying it once.
pub fn retain_non_negative_positions(table: &Table) -> Result<Table, SchemaError> {
    let idx = table.column_index(POSITION_COLUMN)?;
    let rows = table
        .rows()
        .iter()
        .filter(|row| matches!(row[idx].as_f64(), Some(v) if v >= 0.0))
        .cloned()
        .collect();
    Ok(Table::new(table.columns().to_vec(), rows))
}

// ---------------------------------------------------------------------------
