//! Donation orchestration and campaign polling for the NovaFund client.
//!
//! This crate owns the hard part of the client: driving a donation's two
//! dependent transactions (a native payment, then a contract call
//! recording the donation) through build, simulate, assemble, sign and
//! submit, correctly under partial failure.
//!
//! # Architecture
//!
//! The flow is an explicit state machine ([`machine`]): a pure transition
//! function over tagged enums, with every network-bound side effect
//! expressed as a command the async driver ([`DonationOrchestrator`])
//! interprets against three injected capabilities:
//!
//! - [`LedgerGateway`]: account loads and envelope submission
//! - [`CallSimulator`]: non-committing contract dry-runs
//! - [`EnvelopeSigner`]: the external signer boundary
//!
//! Tests exercise every transition with fake capabilities; the production
//! wiring ([`NetworkGateway`], [`LocalSigner`]) talks to Horizon and a
//! Soroban RPC server.
//!
//! Alongside the orchestrator, the [`CampaignWatcher`] polls the
//! campaign's aggregate state (`get_state`) on a fixed interval for the
//! display layer, sharing the same read-only capabilities.

pub mod campaign;
pub mod config;
pub mod gateway;
pub mod machine;
pub mod orchestrator;
pub mod signer;
pub mod watcher;

pub use campaign::{CampaignPhase, CampaignState};
pub use config::AppConfig;
pub use gateway::{CallSimulator, GatewayError, LedgerGateway, NetworkGateway};
pub use machine::{Command, DonateEvent, DonationPhase, FailureKind};
pub use orchestrator::{DonationError, DonationOrchestrator, DonationReceipt};
pub use signer::{EnvelopeSigner, LocalSigner, SignerError};
pub use watcher::{CampaignWatcher, WatcherCommand, WatcherHandle};
