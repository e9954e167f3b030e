//! Ledger placement.
//!
//! The ledger is a spreadsheet with one block of rows per year. Each block
//! holds one row per tracked pay element, followed by spacing rows kept empty
//! for the printed layout. Months run across the columns.

mod grid;

pub use grid::{CellValue, Grid};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::LedgerError;
use crate::models::payslip::PayslipRecord;
use crate::models::profile::Profile;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// A writable ledger, addressed with 1-based rows and columns.
pub trait LedgerSink {
    /// Write a value into a cell, replacing its content.
    fn set_cell(&mut self, row: u32, column: u32, value: Decimal) -> Result<()>;
}

/// Position of the year blocks in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLayout {
    /// Row of the first element of the first year block.
    pub base_row: u32,
    /// Column preceding January.
    pub base_column: u32,
    /// Year of the first block.
    pub first_year: i32,
    /// Spacing rows after each block.
    pub block_spacing: u32,
}

impl LedgerLayout {
    /// Rows taken by one year: tracked elements plus spacing.
    pub fn elements_per_block(&self, profile: &Profile) -> u32 {
        profile.tracked.len() as u32 + self.block_spacing
    }

    /// Cell of a tracked element for a given year and month.
    pub fn cell(
        &self,
        profile: &Profile,
        year: i32,
        month: u32,
        element_index: u32,
    ) -> Result<(u32, u32)> {
        let (row, column) = cell_for(
            year,
            month,
            element_index,
            self.first_year,
            self.elements_per_block(profile),
        )?;
        Ok((self.base_row + row, self.base_column + column))
    }
}

/// Offsets of a cell from the ledger origin, before the base offsets.
///
/// `row = (year - first_year) * elements_per_block + element_index` and
/// `column = month` (January = 1).
pub fn cell_for(
    year: i32,
    month: u32,
    element_index: u32,
    first_year: i32,
    elements_per_block: u32,
) -> Result<(u32, u32)> {
    let block = u32::try_from(year - first_year)
        .map_err(|_| LedgerError::YearOutOfRange { year, first_year })?;
    Ok((block * elements_per_block + element_index, month))
}

/// Write every tracked element of a finalized record into the ledger.
///
/// Elements absent from the record are written as zero so populated years
/// have no gaps. Returns the number of cells written.
pub fn place_record(
    record: &PayslipRecord,
    profile: &Profile,
    layout: &LedgerLayout,
    sink: &mut dyn LedgerSink,
) -> Result<usize> {
    let period = record.period();
    let values = record.tracked_values(profile);

    for (index, (name, value)) in values.iter().enumerate() {
        let (row, column) = layout.cell(profile, period.year, period.month_number(), index as u32)?;
        trace!("{} {} -> ({}, {}) = {}", period, name, row, column, value);
        sink.set_cell(row, column, *value)?;
    }

    Ok(values.len())
}
