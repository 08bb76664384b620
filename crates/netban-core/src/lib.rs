//! Core types and errors for the netban resolution and policy engine.
//!
//! This crate provides the foundational types used across the netban
//! workspace:
//!
//! - **Types**: whois and GeoIP records, channel configuration, resolution
//!   outcomes
//! - **Errors**: the full resolution/policy error taxonomy with
//!   [`NetbanError`]

mod error;
pub mod types;

pub use error::{NetbanError, Result};
pub use types::*;
