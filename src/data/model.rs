use std::fmt;

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Cell – a single table value
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell. Values are parsed on load: anything that
/// reads as a float becomes a number, blanks stay empty, the rest is text.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Equality used for join keys: numbers compare by value, text by
    /// content, empty matches nothing.
    pub fn key_eq(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a == b,
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Empty => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – named columns over ordered rows
// ---------------------------------------------------------------------------

/// An ordered sequence of named columns plus an ordered sequence of rows.
/// The schema is implicit; callers address columns by name or position.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }

    pub fn column_index(&self, name: &str) -> Result<usize, SchemaError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    }

    /// Stable ascending sort by the numeric value of the named column.
    /// Rows whose cell is not numeric sort last; re-sorting a sorted table
    /// leaves it unchanged.
    pub fn sort_by_numeric(&mut self, column: &str) -> Result<(), SchemaError> {
        let idx = self.column_index(column)?;
        self.rows.sort_by(|a, b| {
            let ka = a[idx].as_f64().unwrap_or(f64::INFINITY);
            let kb = b[idx].as_f64().unwrap_or(f64::INFINITY);
            ka.total_cmp(&kb)
        });
        Ok(())
    }

    /// Row-order-preserving inner join on key-equal cells. The joined table
    /// carries every column of both sides, left first.
    pub fn inner_join(
        &self,
        other: &Table,
        left_key: &str,
        right_key: &str,
    ) -> Result<Table, SchemaError> {
        let left_idx = self.column_index(left_key)?;
        let right_idx = other.column_index(right_key)?;

        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());

        let mut rows = Vec::new();
        for left_row in &self.rows {
            for right_row in &other.rows {
                if left_row[left_idx].key_eq(&right_row[right_idx]) {
                    let mut joined = left_row.clone();
                    joined.extend(right_row.iter().cloned());
                    rows.push(joined);
                }
            }
        }
        Ok(Table::new(columns, rows))
    }
}

// ---------------------------------------------------------------------------
// Molecule – one row of the molecules table
// ---------------------------------------------------------------------------

/// Molecular properties consumed by the figure layout.
#[derive(Debug, Clone)]
pub struct Molecule {
    /// Short type code, e.g. `h2o`; keys the summary file names and the
    /// axis-limit tables.
    pub code: String,
    /// Display name; may carry literal `\n` markers from the source file.
    pub name: String,
    pub weight: f64,
}

/// The molecule records in canonical order: ascending molecular weight,
/// stable for ties. Grid rows correspond to this ordering.
#[derive(Debug, Clone)]
pub struct MoleculeSet {
    molecules: Vec<Molecule>,
}

impl MoleculeSet {
    /// Build typed records from an already weight-sorted table with
    /// `Type`, `Name` and `MolWeight` columns.
    pub fn from_table(table: &Table) -> Result<Self, SchemaError> {
        let code_idx = table.column_index("Type")?;
        let name_idx = table.column_index("Name")?;
        let weight_idx = table.column_index("MolWeight")?;

        let mut molecules = Vec::with_capacity(table.row_count());
        for (row, cells) in table.rows().iter().enumerate() {
            let weight =
                cells[weight_idx]
                    .as_f64()
                    .ok_or_else(|| SchemaError::NonNumeric {
                        column: "MolWeight".to_string(),
                        row,
                        value: cells[weight_idx].to_string(),
                    })?;
            molecules.push(Molecule {
                code: cells[code_idx].to_string(),
                name: cells[name_idx].to_string(),
                weight,
            });
        }
        Ok(MoleculeSet { molecules })
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Molecule> {
        self.molecules.iter()
    }
}

// ---------------------------------------------------------------------------
// SeriesGroup – a table read as key + mean/se pairs
// ---------------------------------------------------------------------------

/// One mean curve with its standard errors, named after the mean column
/// with the `_mean` suffix stripped.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub mean: Vec<f64>,
    pub se: Vec<f64>,
}

/// A table interpreted as one key column followed by N (mean, se) column
/// pairs. Construction fails unless the column count is odd and every
/// consumed cell is numeric.
#[derive(Debug, Clone)]
pub struct SeriesGroup {
    pub key: Vec<f64>,
    pub series: Vec<Series>,
}

impl SeriesGroup {
    pub fn from_table(table: &Table) -> Result<Self, SchemaError> {
        let columns = table.column_count();
        if columns < 3 || columns % 2 == 0 {
            return Err(SchemaError::UnpairedSeries { columns });
        }

        let key = numeric_column(table, 0)?;
        let pair_count = (columns - 1) / 2;
        let mut series = Vec::with_capacity(pair_count);
        for pair in 0..pair_count {
            let mean_idx = 1 + pair * 2;
            let mean_column = &table.columns()[mean_idx];
            let name = mean_column
                .strip_suffix("_mean")
                .unwrap_or(mean_column)
                .to_string();
            series.push(Series {
                name,
                mean: numeric_column(table, mean_idx)?,
                se: numeric_column(table, mean_idx + 1)?,
            });
        }
        Ok(SeriesGroup { key, series })
    }

    /// Number of mean/se pairs in the group.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

fn numeric_column(table: &Table, idx: usize) -> Result<Vec<f64>, SchemaError> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells[idx].as_f64().ok_or_else(|| SchemaError::NonNumeric {
                column: table.columns()[idx].clone(),
                row,
                value: cells[idx].to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::parse(v)).collect()
    }

    #[test]
    fn cell_parsing() {
        assert_eq!(Cell::parse("1.5"), Cell::Number(1.5));
        assert_eq!(Cell::parse(" -2 "), Cell::Number(-2.0));
        assert_eq!(Cell::parse("h2o"), Cell::Text("h2o".to_string()));
        assert_eq!(Cell::parse("  "), Cell::Empty);
    }

    #[test]
    fn sort_is_stable_and_idempotent() {
        let columns = vec!["Type".to_string(), "MolWeight".to_string()];
        let rows = vec![
            cells(&["b", "44"]),
            cells(&["a", "18"]),
            cells(&["tie1", "44"]),
            cells(&["tie2", "44"]),
        ];
        let mut table = Table::new(columns, rows);
        table.sort_by_numeric("MolWeight").unwrap();

        let order: Vec<String> = table.rows().iter().map(|r| r[0].to_string()).collect();
        assert_eq!(order, ["a", "b", "tie1", "tie2"]);

        let before = order.clone();
        table.sort_by_numeric("MolWeight").unwrap();
        let after: Vec<String> = table.rows().iter().map(|r| r[0].to_string()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn sort_rejects_missing_column() {
        let mut table = Table::new(vec!["a".to_string()], vec![cells(&["1"])]);
        assert!(matches!(
            table.sort_by_numeric("weight"),
            Err(SchemaError::MissingColumn(_))
        ));
    }

    #[test]
    fn inner_join_preserves_left_order() {
        let left = Table::new(
            vec!["molecule".to_string(), "value".to_string()],
            vec![
                cells(&["co2", "1"]),
                cells(&["h2o", "2"]),
                cells(&["xx", "3"]),
            ],
        );
        let right = Table::new(
            vec!["Type".to_string(), "Name".to_string()],
            vec![cells(&["h2o", "Water"]), cells(&["co2", "CarbonDioxide"])],
        );
        let joined = left.inner_join(&right, "molecule", "Type").unwrap();
        assert_eq!(joined.row_count(), 2);
        assert_eq!(joined.column_count(), 4);
        assert_eq!(joined.cell(0, 0).to_string(), "co2");
        assert_eq!(joined.cell(0, 3).to_string(), "CarbonDioxide");
        assert_eq!(joined.cell(1, 3).to_string(), "Water");
    }

    #[test]
    fn series_group_splits_pairs() {
        let table = Table::new(
            vec![
                "position".to_string(),
                "DOPC_mean".to_string(),
                "DOPC_se".to_string(),
                "MIX_mean".to_string(),
                "MIX_se".to_string(),
            ],
            vec![
                cells(&["0", "1", "0.1", "2", "0.2"]),
                cells(&["1", "1.5", "0.1", "2.5", "0.2"]),
            ],
        );
        let group = SeriesGroup::from_table(&table).unwrap();
        assert_eq!(group.series_count(), 2);
        assert_eq!(group.series[0].name, "DOPC");
        assert_eq!(group.series[1].name, "MIX");
        // Error band at the first key position spans mean ± se.
        let lo = group.series[0].mean[0] - group.series[0].se[0];
        let hi = group.series[0].mean[0] + group.series[0].se[0];
        assert!((lo - 0.9).abs() < 1e-12);
        assert!((hi - 1.1).abs() < 1e-12);
    }

    #[test]
    fn series_group_rejects_even_column_count() {
        let table = Table::new(
            vec![
                "position".to_string(),
                "DOPC_mean".to_string(),
                "DOPC_se".to_string(),
                "stray".to_string(),
            ],
            vec![cells(&["0", "1", "0.1", "9"])],
        );
        assert!(matches!(
            SeriesGroup::from_table(&table),
            Err(SchemaError::UnpairedSeries { columns: 4 })
        ));
    }

    #[test]
    fn series_group_rejects_text_cells() {
        let table = Table::new(
            vec![
                "position".to_string(),
                "DOPC_mean".to_string(),
                "DOPC_se".to_string(),
            ],
            vec![cells(&["0", "oops", "0.1"])],
        );
        assert!(matches!(
            SeriesGroup::from_table(&table),
            Err(SchemaError::NonNumeric { row: 0, .. })
        ));
    }

    #[test]
    fn molecule_set_from_sorted_table() {
        let table = Table::new(
            vec![
                "Type".to_string(),
                "Name".to_string(),
                "MolWeight".to_string(),
            ],
            vec![
                cells(&["h2o", "Water", "18"]),
                cells(&["co2", "CarbonDioxide", "44"]),
            ],
        );
        let set = MoleculeSet::from_table(&table).unwrap();
        let codes: Vec<&str> = set.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, ["h2o", "co2"]);
    }
}
