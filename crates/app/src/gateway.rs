//! Capability traits for the orchestrator's network-bound steps, and the
//! production implementation wiring Horizon and Soroban RPC together.
//!
//! The orchestrator never talks to a concrete client; it sees only these
//! traits, so tests can substitute fakes and count calls.

use async_trait::async_trait;
use stellar_xdr::curr::TransactionEnvelope;
use thiserror::Error;

use novafund_horizon::{Account, HorizonClient, HorizonError};
use novafund_rpc::{RpcError, SimulationResult, SorobanRpcClient, SubmissionOutcome};

/// Errors crossing the gateway boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The address has never been funded.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Connectivity fault. Retryable, but submissions must be rebuilt
    /// with a fresh sequence number first.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote answered with something unusable.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<HorizonError> for GatewayError {
    fn from(err: HorizonError) -> Self {
        match err {
            HorizonError::AccountNotFound(addr) => GatewayError::AccountNotFound(addr),
            HorizonError::Transport(e) => GatewayError::Transport(e.to_string()),
            HorizonError::InvalidResponse(msg) => GatewayError::Protocol(msg),
        }
    }
}

impl From<RpcError> for GatewayError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Transport(e) => GatewayError::Transport(e.to_string()),
            RpcError::Rpc { code, message } => {
                GatewayError::Protocol(format!("RPC error {code}: {message}"))
            }
            RpcError::InvalidResponse(msg) => GatewayError::Protocol(msg),
            RpcError::Xdr(e) => GatewayError::Protocol(format!("XDR error: {e}")),
        }
    }
}

/// Ledger access: account state reads and envelope submission.
///
/// Implementations must be stateless per call and safe for concurrent
/// independent calls: a donation session and the campaign poller share
/// one instance.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Loads the current state of an account.
    async fn load_account(&self, address: &str) -> Result<Account, GatewayError>;

    /// Submits a signed envelope to the network.
    async fn submit(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SubmissionOutcome, GatewayError>;
}

/// Non-committing contract dry-runs.
#[async_trait]
pub trait CallSimulator: Send + Sync {
    /// Simulates an unsigned envelope against current ledger state.
    async fn simulate(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulationResult, GatewayError>;
}

/// The production gateway: Horizon for account reads, Soroban RPC for
/// submission and simulation.
#[derive(Debug, Clone)]
pub struct NetworkGateway {
    horizon: HorizonClient,
    rpc: SorobanRpcClient,
}

impl NetworkGateway {
    /// Wires a gateway from the two concrete clients.
    pub fn new(horizon: HorizonClient, rpc: SorobanRpcClient) -> Self {
        Self { horizon, rpc }
    }
}

#[async_trait]
impl LedgerGateway for NetworkGateway {
    async fn load_account(&self, address: &str) -> Result<Account, GatewayError> {
        Ok(self.horizon.load_account(address).await?)
    }

    async fn submit(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SubmissionOutcome, GatewayError> {
        Ok(self.rpc.send_transaction(envelope).await?)
    }
}

#[async_trait]
impl CallSimulator for NetworkGateway {
    async fn simulate(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulationResult, GatewayError> {
        Ok(self.rpc.simulate_transaction(envelope).await?)
    }
}
