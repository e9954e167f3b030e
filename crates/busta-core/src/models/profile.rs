//! Pay-element profiles.
//!
//! A profile describes which pay elements a role tracks: the ordered list of
//! names written to the ledger, the codes scanned in the payslip text, and
//! which of those codes feed the holiday and ticket derivates.

use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, Result};

/// Name of the derived element summing all holiday codes.
pub const HOLIDAYS: &str = "holidays";
/// Name of the derived element holding the ticket value.
pub const TICKETS: &str = "tickets";
/// Name of the attendance figure from the leave summary.
pub const ATTENDANCES: &str = "attendances";
/// Name of the vacancies figure from the leave summary.
pub const VACANCIES: &str = "vacancies";

/// Tracked pay elements and code classification for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Profile name (for diagnostics and config files).
    pub name: String,

    /// Element names in ledger row order.
    pub tracked: Vec<String>,

    /// Pay-element codes scanned in the payslip text.
    pub codes: Vec<String>,

    /// Codes summed into `holidays`.
    pub holiday_codes: Vec<String>,

    /// Ticket codes in priority order; the first one present is used.
    pub ticket_codes: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::standard()
    }
}

impl Profile {
    /// The profile of the standard yearly ledger.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            tracked: strings(&[
                ATTENDANCES, VACANCIES, TICKETS, "0131", HOLIDAYS, "0421", "0457",
            ]),
            codes: strings(&[
                "0131", "0200", "0202", "0203", "0205", "0206", "0207", "0210", "0293", "0299",
                "0352", "0353", "0366", "0421", "0457",
            ]),
            holiday_codes: strings(&[
                "0200", "0202", "0203", "0205", "0206", "0207", "0210", "0352", "0353", "0366",
            ]),
            ticket_codes: strings(&["0293", "0299"]),
        }
    }

    /// Whether `code` is read with the ticket extraction shape.
    pub fn is_ticket_code(&self, code: &str) -> bool {
        self.ticket_codes.iter().any(|c| c == code)
    }

    /// Whether `code` contributes to `holidays`.
    pub fn is_holiday_code(&self, code: &str) -> bool {
        self.holiday_codes.iter().any(|c| c == code)
    }

    /// Check the profile is internally consistent.
    pub fn validate(&self) -> Result<()> {
        if self.tracked.is_empty() {
            return Err(PayrollError::Config(format!(
                "profile '{}' tracks no elements",
                self.name
            )));
        }

        for code in self.holiday_codes.iter().chain(&self.ticket_codes) {
            if !self.codes.contains(code) {
                return Err(PayrollError::Config(format!(
                    "profile '{}': code {} is classified but not scanned",
                    self.name, code
                )));
            }
        }

        if let Some(code) = self.ticket_codes.iter().find(|c| self.is_holiday_code(c)) {
            return Err(PayrollError::Config(format!(
                "profile '{}': code {} is both a holiday and a ticket code",
                self.name, code
            )));
        }

        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
