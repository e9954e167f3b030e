//! In-memory ledger grid.
//!
//! The grid is loaded from an existing ledger (CSV, or a workbook's first
//! sheet), updated in memory, and saved back in full as CSV.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use calamine::{open_workbook_auto, Data, Reader};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{LedgerSink, Result};
use crate::error::LedgerError;

/// Content of a ledger cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(Decimal),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Sparse grid of cells addressed with 1-based (row, column).
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: BTreeMap<(u32, u32), CellValue>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ledger by file extension: `.csv`, or `.xlsx`/`.xlsm`/`.xls`/`.ods`.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let grid = match extension.as_str() {
            "csv" => Self::load_csv(path)?,
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Self::load_workbook(path)?,
            _ => return Err(LedgerError::UnsupportedFormat(path.to_path_buf())),
        };

        info!("Loaded ledger {} with {} cells", path.display(), grid.len());
        Ok(grid)
    }

    fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut grid = Self::new();
        for (r, record) in reader.records().enumerate() {
            let record = record?;
            for (c, field) in record.iter().enumerate() {
                grid.set_parsed(r as u32 + 1, c as u32 + 1, field);
            }
        }
        Ok(grid)
    }

    fn load_workbook(path: &Path) -> Result<Self> {
        let load_error = |reason: String| LedgerError::Load {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| load_error(e.to_string()))?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| load_error("workbook has no sheets".to_string()))?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| load_error(format!("sheet '{}': {}", sheet_name, e)))?;

        debug!("Reading sheet '{}' of {}", sheet_name, path.display());

        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut grid = Self::new();
        for (r, c, cell) in range.used_cells() {
            let row = start_row + r as u32 + 1;
            let column = start_col + c as u32 + 1;
            match cell {
                Data::Float(f) => grid.set_number(row, column, f64_to_decimal(*f)),
                Data::Int(i) => grid.set_number(row, column, Decimal::from(*i)),
                Data::Empty => {}
                other => grid.set_parsed(row, column, &other.to_string()),
            }
        }
        Ok(grid)
    }

    /// Write the whole grid as CSV, from row 1 / column 1 to the last used cell.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;

        let (rows, columns) = self.extent();
        for row in 1..=rows {
            let record: Vec<String> = (1..=columns)
                .map(|column| {
                    self.get(row, column)
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush().map_err(csv::Error::from)?;

        info!("Saved ledger {} ({} rows x {} columns)", path.display(), rows, columns);
        Ok(())
    }

    pub fn get(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.cells.get(&(row, column))
    }

    /// Numeric content of a cell, if it holds a number.
    pub fn number(&self, row: u32, column: u32) -> Option<Decimal> {
        match self.get(row, column)? {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    pub fn set_number(&mut self, row: u32, column: u32, value: Decimal) {
        self.cells.insert((row, column), CellValue::Number(value));
    }

    pub fn set_text(&mut self, row: u32, column: u32, value: impl Into<String>) {
        self.cells.insert((row, column), CellValue::Text(value.into()));
    }

    fn set_parsed(&mut self, row: u32, column: u32, field: &str) {
        if field.is_empty() {
            return;
        }
        match Decimal::from_str(field.trim()) {
            Ok(n) => self.set_number(row, column, n),
            Err(_) => self.set_text(row, column, field),
        }
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Last used row and column.
    pub fn extent(&self) -> (u32, u32) {
        self.cells.keys().fold((0, 0), |(rows, columns), &(r, c)| {
            (rows.max(r), columns.max(c))
        })
    }
}

impl LedgerSink for Grid {
    fn set_cell(&mut self, row: u32, column: u32, value: Decimal) -> Result<()> {
        self.set_number(row, column, value);
        Ok(())
    }
}

/// Convert a spreadsheet float through its shortest decimal representation.
fn f64_to_decimal(f: f64) -> Decimal {
    format!("{f}")
        .parse::<Decimal>()
        .unwrap_or_else(|_| Decimal::try_from(f).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new();
        assert!(grid.is_empty());

        grid.set_cell(3, 2, dec!(7.30)).unwrap();
        grid.set_text(1, 1, "Anno");

        assert_eq!(grid.number(3, 2), Some(dec!(7.30)));
        assert_eq!(grid.number(1, 1), None);
        assert_eq!(grid.extent(), (3, 2));
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");

        let mut grid = Grid::new();
        grid.set_text(1, 1, "Voce, anno 2007");
        grid.set_number(5, 9, dec!(21.00));
        grid.set_number(6, 20, dec!(0));
        grid.save(&path).unwrap();

        let loaded = Grid::load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.get(1, 1), Some(&CellValue::Text("Voce, anno 2007".to_string())));
        assert_eq!(loaded.number(5, 9), Some(dec!(21.00)));
        assert_eq!(loaded.number(6, 20), Some(dec!(0)));
        assert_eq!(loaded.extent(), (6, 20));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Grid::load(Path::new("ledger.txt")).unwrap_err();
        assert!(matches!(err, LedgerError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_workbook() {
        let err = Grid::load(Path::new("does-not-exist.xlsx")).unwrap_err();
        assert!(matches!(err, LedgerError::Load { .. }));
    }

    #[test]
    fn test_f64_to_decimal() {
        assert_eq!(f64_to_decimal(7.3), dec!(7.3));
        assert_eq!(f64_to_decimal(1850.0), dec!(1850));
    }
}
