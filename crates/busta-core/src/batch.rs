//! Batch bookkeeping: per-document outcomes and the serial ledger update.
//!
//! Documents are read and extracted independently, in any order and on any
//! thread. A failure only excludes its own document. Once every document is
//! done, [`BatchReport::apply`] merges records of the same period, computes
//! their derivates and writes them into the ledger on the calling thread.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{PayrollError, Result};
use crate::ledger::{place_record, LedgerLayout, LedgerSink};
use crate::models::payslip::PayslipRecord;
use crate::models::period::PayPeriod;
use crate::models::profile::Profile;
use crate::models::tickets::TicketValuePolicy;
use crate::payslip::{ExtractionResult, PayslipParser};
use crate::source::TextSource;

/// Read one document and extract its payslip record.
pub fn extract_document(
    path: &Path,
    source: &dyn TextSource,
    parser: &dyn PayslipParser,
) -> Result<ExtractionResult> {
    debug!("Reading {} with {} source", path.display(), source.backend_name());
    let text = source.read_text(path)?;
    Ok(parser.parse(&text)?)
}

/// A successfully extracted document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub path: PathBuf,
    pub record: PayslipRecord,
    pub warnings: Vec<String>,
}

/// A document excluded from the ledger.
#[derive(Debug, Clone)]
pub struct FailedDocument {
    pub path: PathBuf,
    pub error: String,
}

/// Outcomes of a batch, in completion order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub extracted: Vec<ExtractedDocument>,
    pub failed: Vec<FailedDocument>,
}

/// What [`BatchReport::apply`] wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplySummary {
    /// Periods written, in ledger order.
    pub periods: Vec<PayPeriod>,
    /// Cells written.
    pub cells: usize,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one document.
    pub fn record(&mut self, path: PathBuf, outcome: Result<ExtractionResult>) {
        match outcome {
            Ok(result) => {
                info!("Extracted {} from {}", result.record.period(), path.display());
                self.extracted.push(ExtractedDocument {
                    path,
                    record: result.record,
                    warnings: result.warnings,
                });
            }
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                self.failed.push(FailedDocument {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.extracted.len() + self.failed.len()
    }

    /// Merge, finalize and place every extracted record.
    ///
    /// Records for the same period are summed before derivates are computed,
    /// so each period gets its derivates exactly once. A record that cannot be
    /// placed moves its documents to `failed`.
    pub fn apply(
        &mut self,
        profile: &Profile,
        policy: &TicketValuePolicy,
        layout: &LedgerLayout,
        sink: &mut dyn LedgerSink,
    ) -> Result<ApplySummary> {
        let mut merged: BTreeMap<PayPeriod, (PayslipRecord, Vec<PathBuf>)> = BTreeMap::new();
        let mut unplaced: Vec<PathBuf> = Vec::new();
        let mut mismatched: Vec<FailedDocument> = Vec::new();

        for doc in &self.extracted {
            let period = doc.record.period();
            match merged.get_mut(&period) {
                Some((record, paths)) => {
                    debug!("Merging {} into {}", doc.path.display(), period);
                    match record.merge(doc.record.clone()) {
                        Ok(()) => paths.push(doc.path.clone()),
                        Err(other) => {
                            debug_assert!(false, "{} filed under {}", other.period(), period);
                            warn!(
                                "Cannot merge {} ({}) into {}",
                                doc.path.display(),
                                other.period(),
                                period
                            );
                            mismatched.push(FailedDocument {
                                path: doc.path.clone(),
                                error: format!("period {} does not match {}", other.period(), period),
                            });
                        }
                    }
                }
                None => {
                    merged.insert(period, (doc.record.clone(), vec![doc.path.clone()]));
                }
            }
        }

        for failure in mismatched {
            unplaced.push(failure.path.clone());
            self.failed.push(failure);
        }

        let mut summary = ApplySummary::default();

        for (period, (mut record, paths)) in merged {
            record.compute_derivates(profile, policy);
            match place_record(&record, profile, layout, sink) {
                Ok(cells) => {
                    summary.periods.push(period);
                    summary.cells += cells;
                }
                Err(e) => {
                    let e = PayrollError::from(e);
                    warn!("Cannot place {}: {}", period, e);
                    for path in paths {
                        self.failed.push(FailedDocument {
                            path: path.clone(),
                            error: e.to_string(),
                        });
                        unplaced.push(path);
                    }
                }
            }
        }

        self.extracted.retain(|doc| !unplaced.contains(&doc.path));

        info!(
            "Placed {} periods ({} cells) in the ledger",
            summary.periods.len(),
            summary.cells
        );
        Ok(summary)
    }
}
