//! Meal-ticket unit value by pay period.
//!
//! The payslip only carries the number of tickets; their monetary value is a
//! policy that changed over time. The policy is a step function over pay
//! periods: each band starts at a period (inclusive) and lasts until the next
//! band starts. Periods before the first band are worth nothing.

use chrono::Month;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::period::PayPeriod;

/// A band of the ticket policy, effective from `from` (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketBand {
    /// First period the band applies to.
    pub from: PayPeriod,
    /// Value of a single ticket.
    pub unit_value: Decimal,
}

impl TicketBand {
    pub fn new(from: PayPeriod, unit_value: Decimal) -> Self {
        Self { from, unit_value }
    }
}

/// Step function from pay period to ticket unit value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketValuePolicy {
    /// Bands in any order; lookups use the latest band not after the period.
    pub bands: Vec<TicketBand>,
}

impl Default for TicketValuePolicy {
    fn default() -> Self {
        Self {
            bands: vec![
                TicketBand::new(PayPeriod::new(2012, Month::October), Decimal::new(730, 2)),
                TicketBand::new(PayPeriod::new(2023, Month::October), Decimal::new(1050, 2)),
            ],
        }
    }
}

impl TicketValuePolicy {
    pub fn new(bands: Vec<TicketBand>) -> Self {
        Self { bands }
    }

    /// Add a band, e.g. a new agreement effective from a given month.
    pub fn with_band(mut self, band: TicketBand) -> Self {
        self.bands.push(band);
        self
    }

    /// Unit value of a ticket for the given period.
    pub fn unit_value(&self, period: PayPeriod) -> Decimal {
        self.bands
            .iter()
            .filter(|band| band.from <= period)
            .max_by_key(|band| band.from)
            .map(|band| band.unit_value)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Unit value of a ticket under the default policy.
pub fn ticket_unit_value(year: i32, month: Month) -> Decimal {
    TicketValuePolicy::default().unit_value(PayPeriod::new(year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ticket_unit_value(2023, Month::September), dec!(7.30));
        assert_eq!(ticket_unit_value(2023, Month::October), dec!(10.50));
        assert_eq!(ticket_unit_value(2024, Month::January), dec!(10.50));

        assert_eq!(ticket_unit_value(2011, Month::December), dec!(0.00));
        assert_eq!(ticket_unit_value(2012, Month::September), dec!(0.00));
        assert_eq!(ticket_unit_value(2012, Month::October), dec!(7.30));
    }

    #[test]
    fn test_middle_of_band() {
        assert_eq!(ticket_unit_value(2018, Month::June), dec!(7.30));
        assert_eq!(ticket_unit_value(2007, Month::January), dec!(0));
    }

    #[test]
    fn test_new_band_extends_policy() {
        let policy = TicketValuePolicy::default().with_band(TicketBand::new(
            PayPeriod::new(2026, Month::March),
            dec!(12.00),
        ));

        assert_eq!(policy.unit_value(PayPeriod::new(2026, Month::February)), dec!(10.50));
        assert_eq!(policy.unit_value(PayPeriod::new(2026, Month::March)), dec!(12.00));
    }

    #[test]
    fn test_band_order_does_not_matter() {
        let policy = TicketValuePolicy::new(vec![
            TicketBand::new(PayPeriod::new(2023, Month::October), dec!(10.50)),
            TicketBand::new(PayPeriod::new(2012, Month::October), dec!(7.30)),
        ]);

        assert_eq!(policy.unit_value(PayPeriod::new(2015, Month::May)), dec!(7.30));
        assert_eq!(policy.unit_value(PayPeriod::new(2025, Month::May)), dec!(10.50));
    }

    #[test]
    fn test_empty_policy_is_zero() {
        let policy = TicketValuePolicy::new(Vec::new());
        assert_eq!(policy.unit_value(PayPeriod::new(2025, Month::May)), Decimal::ZERO);
    }
}
