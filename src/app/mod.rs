//! Application boundary: port traits and outbound events.
//!
//! The scheduler in [`crate::scheduler`] holds the business rules; every
//! interaction with hardware, storage or time happens through the **port
//! traits** defined in [`ports`], keeping the core fully testable without
//! real peripherals.

pub mod events;
pub mod ports;
