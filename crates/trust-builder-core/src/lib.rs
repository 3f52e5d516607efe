//! Trust Builder Core Library
//!
//! Establishes and removes a trust relationship between a managed device and
//! a gateway, both exposing REST management APIs:
//! - Remote API client for the two management endpoints
//! - Existence probes over remote collections
//! - Establishment and teardown sequencers
//! - Orchestration driver selecting one of them

pub mod api;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod establish;
pub mod probes;
pub mod teardown;
pub mod tracing_init;
pub mod usage;

pub use api::{ApiResponse, ManagementApi, RestClient, Target};
pub use driver::{Mode, Outcome, TrustSettings};
pub use endpoint::{Credentials, Endpoint, Scheme};
pub use error::{Error, Result};

#[cfg(test)]
mod test_helpers;
