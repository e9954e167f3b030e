//! Data models: pay periods, payslip records, profiles, policies and configuration.

pub mod config;
pub mod payslip;
pub mod period;
pub mod profile;
pub mod tickets;

pub use config::PayrollConfig;
pub use payslip::PayslipRecord;
pub use period::PayPeriod;
pub use profile::Profile;
pub use tickets::{ticket_unit_value, TicketBand, TicketValuePolicy};
