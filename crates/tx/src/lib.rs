//! Transaction building and assembly for the NovaFund client.
//!
//! This crate is the pure half of the donation pipeline: it turns validated
//! inputs into unsigned [`stellar_xdr::curr::TransactionEnvelope`] values
//! and merges simulation results back into them. Nothing here touches the
//! network, increments a sequence number, or holds state; callers supply
//! the freshly loaded sequence and own the envelope lifecycle.
//!
//! # Pipeline position
//!
//! ```text
//! amounts ─▶ operations ─▶ build_envelope ─▶ (simulate) ─▶ assemble ─▶ (sign)
//! ```
//!
//! Payments skip the simulate/assemble steps; only contract invocations
//! need footprint and resource data before signing.

pub mod amount;
pub mod assemble;
pub mod builder;
pub mod error;
pub mod hash;
pub mod operations;

pub use amount::{parse_lumens, LumenAmount, STROOPS_PER_LUMEN};
pub use assemble::assemble;
pub use builder::build_envelope;
pub use error::TxError;
pub use hash::{attach_signature, envelope_payload_hash};
