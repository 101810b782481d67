//! Shared types for the NovaFund crowdfunding client.
//!
//! This crate holds the pieces every other crate in the workspace needs:
//! the unified [`enum@Error`] type, the [`NetworkId`] network identity, the
//! funding-progress math used by the display layer, and small time helpers.

pub mod error;
pub mod network;
pub mod progress;
pub mod time;

pub use error::{Error, Result};
pub use network::NetworkId;
pub use progress::funding_progress;
