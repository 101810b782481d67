//! Background campaign-state polling.
//!
//! The watcher is a cancellable periodic task that fetches the campaign
//! snapshot on a fixed interval and publishes it over a watch channel.
//! It is best-effort by design: a failed fetch is logged and the last
//! published snapshot stands. Polling continues whether or not a wallet
//! is connected: read-only simulation just needs *some* funded source
//! account, so a well-known fallback address is used until a wallet
//! address is set.
//!
//! The task is driven by commands over an mpsc channel ([`WatcherHandle`])
//! and shuts down cleanly on [`WatcherCommand::Shutdown`] or when every
//! handle is dropped; no periodic task outlives its owner.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use novafund_common::{Error, Result};
use novafund_rpc::SimulationResult;
use novafund_tx::{build_envelope, operations};

use crate::campaign::CampaignState;
use crate::config::{CampaignSettings, DonationSettings};
use crate::gateway::{CallSimulator, LedgerGateway};

/// Commands accepted by the watcher task.
#[derive(Debug, Clone)]
pub enum WatcherCommand {
    /// Fetch now, outside the regular cadence.
    Refresh,
    /// Use this address as the simulation source from now on (a wallet
    /// connected).
    SetSource(String),
    /// Stop the task.
    Shutdown,
}

/// Handle for sending commands to a spawned watcher.
#[derive(Debug, Clone)]
pub struct WatcherHandle {
    tx: mpsc::Sender<WatcherCommand>,
}

impl WatcherHandle {
    /// Requests an immediate fetch.
    pub async fn refresh(&self) {
        let _ = self.tx.send(WatcherCommand::Refresh).await;
    }

    /// Switches the simulation source account.
    pub async fn set_source(&self, address: String) {
        let _ = self.tx.send(WatcherCommand::SetSource(address)).await;
    }

    /// Stops the watcher task.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(WatcherCommand::Shutdown).await;
    }

    /// Returns the raw command sender (used to wire the orchestrator's
    /// success refresh).
    pub fn sender(&self) -> mpsc::Sender<WatcherCommand> {
        self.tx.clone()
    }
}

/// Periodically reads the campaign's aggregate state.
pub struct CampaignWatcher<G, S> {
    gateway: Arc<G>,
    simulator: Arc<S>,
    campaign: CampaignSettings,
    donation: DonationSettings,
    source: Option<String>,
}

impl<G, S> CampaignWatcher<G, S>
where
    G: LedgerGateway + 'static,
    S: CallSimulator + 'static,
{
    /// Creates a watcher.
    pub fn new(
        gateway: Arc<G>,
        simulator: Arc<S>,
        campaign: CampaignSettings,
        donation: DonationSettings,
    ) -> Self {
        Self {
            gateway,
            simulator,
            campaign,
            donation,
            source: None,
        }
    }

    /// Uses `address` as the simulation source from the start.
    pub fn with_source(mut self, address: impl Into<String>) -> Self {
        self.source = Some(address.into());
        self
    }

    /// Fetches one snapshot using the current source account.
    pub async fn fetch(&self) -> Result<CampaignState> {
        fetch_campaign_state(
            self.gateway.as_ref(),
            self.simulator.as_ref(),
            &self.campaign,
            &self.donation,
            self.source.as_deref(),
        )
        .await
    }

    /// Spawns the polling task.
    ///
    /// Returns the command handle, a receiver of the latest snapshot
    /// (`None` until the first successful fetch), and the task's join
    /// handle. The first fetch happens immediately.
    pub fn spawn(
        mut self,
    ) -> (
        WatcherHandle,
        watch::Receiver<Option<CampaignState>>,
        JoinHandle<()>,
    ) {
        let (cmd_tx, mut cmd_rx) = mpsc::channel(16);
        let (state_tx, state_rx) = watch::channel(None);
        let handle = WatcherHandle { tx: cmd_tx };

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.campaign.poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.poll_once(&state_tx).await,
                    command = cmd_rx.recv() => match command {
                        Some(WatcherCommand::Refresh) => self.poll_once(&state_tx).await,
                        Some(WatcherCommand::SetSource(address)) => {
                            debug!(%address, "campaign watcher source changed");
                            self.source = Some(address);
                        }
                        Some(WatcherCommand::Shutdown) | None => break,
                    },
                }
            }
            debug!("campaign watcher stopped");
        });

        (handle, state_rx, task)
    }

    async fn poll_once(&self, state_tx: &watch::Sender<Option<CampaignState>>) {
        match self.fetch().await {
            Ok(state) => {
                debug!(raised = %state.raised, target = %state.target, "campaign state");
                state_tx.send_replace(Some(state));
            }
            // Soft failure: keep the last snapshot on display.
            Err(e) => warn!(error = %e, "campaign state fetch failed, keeping last snapshot"),
        }
    }
}

/// Reads the campaign state once via a read-only `get_state` simulation.
///
/// `source` defaults to the configured fallback address when no wallet
/// is connected.
pub async fn fetch_campaign_state<G, S>(
    gateway: &G,
    simulator: &S,
    campaign: &CampaignSettings,
    donation: &DonationSettings,
    source: Option<&str>,
) -> Result<CampaignState>
where
    G: LedgerGateway + ?Sized,
    S: CallSimulator + ?Sized,
{
    let source = source.unwrap_or(&campaign.fallback_source);
    let account = gateway
        .load_account(source)
        .await
        .map_err(|e| Error::OperationFailed(e.to_string()))?;

    let op = operations::get_state_invocation(&campaign.contract_id)
        .map_err(|e| Error::OperationFailed(e.to_string()))?;
    let envelope = build_envelope(
        source,
        account.sequence + 1,
        op,
        donation.base_fee,
        donation.tx_timeout_secs,
    )
    .map_err(|e| Error::OperationFailed(e.to_string()))?;

    match simulator
        .simulate(&envelope)
        .await
        .map_err(|e| Error::OperationFailed(e.to_string()))?
    {
        SimulationResult::Success(success) => {
            let value = success
                .return_value
                .ok_or_else(|| Error::InvalidData("get_state returned no value".to_string()))?;
            CampaignState::from_return_value(&value)
        }
        SimulationResult::Failure { diagnostic } => Err(Error::OperationFailed(format!(
            "get_state simulation failed: {diagnostic}"
        ))),
    }
}
