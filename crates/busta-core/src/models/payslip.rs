//! Payslip record: accumulated pay elements for one pay period.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::period::PayPeriod;
use super::profile::{Profile, HOLIDAYS, TICKETS};
use super::tickets::TicketValuePolicy;

/// Round an amount to cents, halves away from zero.
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Pay elements found in one payslip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayslipRecord {
    period: PayPeriod,
    elements: HashMap<String, Decimal>,
}

impl PayslipRecord {
    /// Create an empty record for a period.
    pub fn new(period: PayPeriod) -> Self {
        Self {
            period,
            elements: HashMap::new(),
        }
    }

    pub fn period(&self) -> PayPeriod {
        self.period
    }

    /// All accumulated elements, codes and derived names alike.
    pub fn elements(&self) -> &HashMap<String, Decimal> {
        &self.elements
    }

    /// Whether an element has been recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    /// Add `value` to the element, creating it if absent.
    pub fn accumulate(&mut self, name: impl Into<String>, value: Decimal) {
        *self.elements.entry(name.into()).or_insert(Decimal::ZERO) += value;
    }

    /// Add every element of another record for the same period.
    ///
    /// Returns the other record back when the periods differ.
    pub fn merge(&mut self, other: PayslipRecord) -> std::result::Result<(), PayslipRecord> {
        if other.period != self.period {
            return Err(other);
        }
        for (name, value) in other.elements {
            self.accumulate(name, value);
        }
        Ok(())
    }

    /// Accumulated value of an element; absent elements are zero.
    pub fn value_of(&self, name: &str) -> Decimal {
        self.elements.get(name).copied().unwrap_or(Decimal::ZERO)
    }

    /// Compute `holidays` and `tickets` from the accumulated codes.
    ///
    /// Precondition: call exactly once per record, after extraction. Repeated
    /// calls are not guarded and recompute from whatever the record holds at
    /// that point, derived names included.
    ///
    /// `tickets` uses the first code of `profile.ticket_codes` present in the
    /// record and stays absent when none is.
    pub fn compute_derivates(&mut self, profile: &Profile, policy: &TicketValuePolicy) {
        let holidays: Decimal = profile
            .holiday_codes
            .iter()
            .map(|code| self.value_of(code))
            .sum();
        self.elements.insert(HOLIDAYS.to_string(), holidays);

        let ticket_count = profile
            .ticket_codes
            .iter()
            .find_map(|code| self.elements.get(code).copied());

        if let Some(count) = ticket_count {
            let unit = policy.unit_value(self.period);
            self.elements.insert(TICKETS.to_string(), count * unit);
        }

        trace!(
            "Derivates for {}: holidays={}, tickets={:?}",
            self.period,
            holidays,
            self.elements.get(TICKETS)
        );
    }

    /// Values of the profile's tracked elements, in ledger order.
    pub fn tracked_values(&self, profile: &Profile) -> Vec<(String, Decimal)> {
        profile
            .tracked
            .iter()
            .map(|name| (name.clone(), round_amount(self.value_of(name))))
            .collect()
    }
}
