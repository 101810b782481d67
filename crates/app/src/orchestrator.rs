//! The donation orchestrator: the async driver of the state machine.
//!
//! [`DonationOrchestrator::donate`] runs one session end to end. The
//! machine in [`crate::machine`] decides what happens next; this module
//! executes the commands (loading accounts, requesting signatures,
//! simulating, assembling, submitting) against the injected
//! capabilities, and feeds the outcomes back as events.
//!
//! One session runs at a time: a `donate` call while another session is
//! live fails immediately with `SessionInFlight` and leaves the live
//! session untouched. Every phase change updates a status line published
//! over a watch channel; that string is the only progress signal the
//! display layer gets.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use stellar_xdr::curr::TransactionEnvelope;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use novafund_common::NetworkId;
use novafund_rpc::{SimulationResult, SimulationSuccess};
use novafund_tx::amount::LumenAmount;
use novafund_tx::{assemble, build_envelope, operations, parse_lumens};

use crate::config::{CampaignSettings, DonationSettings};
use crate::gateway::{CallSimulator, GatewayError, LedgerGateway};
use crate::machine::{advance, Command, DonateEvent, DonationPhase, FailureKind};
use crate::signer::EnvelopeSigner;
use crate::watcher::WatcherCommand;

/// Proof that a donation completed: both legs were accepted by the
/// network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationReceipt {
    /// Hash of the payment transaction.
    pub payment_hash: String,
    /// Hash of the record transaction, the identifier reported on
    /// success.
    pub record_hash: String,
}

/// A failed donation session.
///
/// `partial` distinguishes "nothing happened" from "funds moved but the
/// donation record was not written"; the message patterns differ so the
/// user understands the payment already committed.
#[derive(Debug)]
pub struct DonationError {
    /// What went wrong.
    pub kind: FailureKind,
    /// Whether the payment leg already committed.
    pub partial: bool,
    /// Human-readable detail from the failing step.
    pub message: String,
}

impl DonationError {
    fn total(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            partial: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for DonationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.partial {
            write!(
                f,
                "Payment sent, but the donation was not recorded ({}): {}",
                self.kind, self.message
            )
        } else {
            write!(f, "Failed ({}): {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for DonationError {}

/// Ephemeral state of one donation session.
///
/// Constructed fresh per `donate` call and dropped at the terminal
/// state; nothing survives a session.
struct SessionContext {
    donor: String,
    amount: LumenAmount,
    /// The envelope the next command operates on.
    envelope: Option<TransactionEnvelope>,
    simulation: Option<SimulationSuccess>,
    payment_hash: Option<String>,
    record_hash: Option<String>,
    /// Detail string for the eventual failure report.
    detail: String,
}

impl SessionContext {
    fn new(donor: &str, amount: LumenAmount) -> Self {
        Self {
            donor: donor.to_string(),
            amount,
            envelope: None,
            simulation: None,
            payment_hash: None,
            record_hash: None,
            detail: String::new(),
        }
    }

    fn fail(&mut self, detail: impl fmt::Display) {
        self.detail = detail.to_string();
    }
}

/// Drives donation sessions against injected capabilities.
pub struct DonationOrchestrator<G, S, W> {
    gateway: Arc<G>,
    simulator: Arc<S>,
    signer: Arc<W>,
    network: NetworkId,
    campaign: CampaignSettings,
    donation: DonationSettings,
    status: watch::Sender<String>,
    in_flight: Mutex<bool>,
    refresh: Option<mpsc::Sender<WatcherCommand>>,
}

impl<G, S, W> DonationOrchestrator<G, S, W>
where
    G: LedgerGateway,
    S: CallSimulator,
    W: EnvelopeSigner,
{
    /// Creates an orchestrator.
    pub fn new(
        gateway: Arc<G>,
        simulator: Arc<S>,
        signer: Arc<W>,
        network: NetworkId,
        campaign: CampaignSettings,
        donation: DonationSettings,
    ) -> Self {
        let (status, _) = watch::channel(String::new());
        Self {
            gateway,
            simulator,
            signer,
            network,
            campaign,
            donation,
            status,
            in_flight: Mutex::new(false),
            refresh: None,
        }
    }

    /// Attaches a campaign-watcher command channel; on success the
    /// orchestrator requests exactly one state refresh through it.
    pub fn with_refresh(mut self, refresh: mpsc::Sender<WatcherCommand>) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Returns a receiver for the session status line.
    pub fn status_feed(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    /// Runs one donation session to its terminal state.
    ///
    /// `amount` is a decimal lumen string. Input validation happens
    /// before any network call; a malformed or non-positive amount fails
    /// `InvalidInput` without touching the ledger, signer, or simulator.
    pub async fn donate(
        &self,
        donor: &str,
        amount: &str,
    ) -> Result<DonationReceipt, DonationError> {
        let _session = self.acquire_session()?;

        let amount = parse_lumens(amount)
            .map_err(|e| DonationError::total(FailureKind::InvalidInput, e.to_string()))?;
        operations::account_id(donor)
            .map_err(|e| DonationError::total(FailureKind::InvalidInput, e.to_string()))?;

        info!(donor, stroops = amount.stroops, "starting donation session");
        let mut ctx = SessionContext::new(donor, amount);

        let (mut phase, mut command) = advance(&DonationPhase::Idle, DonateEvent::Requested);
        self.publish(phase.status_line());

        while let Some(cmd) = command {
            debug!(command = ?cmd, "executing");
            let event = self.execute(cmd, &mut ctx).await;
            let (next, next_command) = advance(&phase, event);
            debug!(from = ?phase, event = ?event, to = ?next, "transition");
            phase = next;
            command = next_command;
            if !phase.is_terminal() {
                self.publish(phase.status_line());
            }
        }

        match phase {
            DonationPhase::Succeeded => {
                self.publish(DonationPhase::Succeeded.status_line());
                if let Some(refresh) = &self.refresh {
                    let _ = refresh.try_send(WatcherCommand::Refresh);
                }
                let receipt = DonationReceipt {
                    payment_hash: ctx.payment_hash.take().unwrap_or_default(),
                    record_hash: ctx.record_hash.take().unwrap_or_default(),
                };
                info!(record = %receipt.record_hash, "donation recorded");
                Ok(receipt)
            }
            DonationPhase::Failed { kind, partial } => {
                let error = DonationError {
                    kind,
                    partial,
                    message: std::mem::take(&mut ctx.detail),
                };
                warn!(%error, "donation session failed");
                self.publish(&error.to_string());
                Err(error)
            }
            // The machine always ends in a terminal phase; reaching this
            // arm means the driver itself is broken.
            other => {
                let error = DonationError {
                    kind: FailureKind::Internal,
                    partial: other.payment_committed(),
                    message: format!("session ended in non-terminal phase {other:?}"),
                };
                self.publish(&error.to_string());
                Err(error)
            }
        }
    }

    /// Marks a session as in flight, or fails with `SessionInFlight`.
    fn acquire_session(&self) -> Result<SessionGuard<'_>, DonationError> {
        let mut flag = self.in_flight.lock();
        if *flag {
            return Err(DonationError::total(
                FailureKind::SessionInFlight,
                "a donation session is already running",
            ));
        }
        *flag = true;
        Ok(SessionGuard(&self.in_flight))
    }

    fn publish(&self, line: &str) {
        self.status.send_if_modified(|current| {
            if current == line {
                false
            } else {
                line.clone_into(current);
                true
            }
        });
    }

    /// Executes one side-effect command, returning the resulting event.
    ///
    /// Every error is absorbed into an event here; nothing escapes as an
    /// unhandled fault.
    async fn execute(&self, command: Command, ctx: &mut SessionContext) -> DonateEvent {
        match command {
            Command::BuildPayment => self.build_payment(ctx).await,
            Command::RequestPaymentSignature | Command::RequestRecordSignature => {
                self.request_signature(ctx).await
            }
            Command::SubmitPayment => self.submit(ctx, Leg::Payment).await,
            Command::AwaitSettlement => {
                tokio::time::sleep(self.donation.settle_delay()).await;
                DonateEvent::Settled
            }
            Command::BuildRecord => self.build_record(ctx).await,
            Command::SimulateRecord => self.simulate_record(ctx).await,
            Command::AssembleRecord => self.assemble_record(ctx),
            Command::SubmitRecord => self.submit(ctx, Leg::Record).await,
        }
    }

    async fn build_payment(&self, ctx: &mut SessionContext) -> DonateEvent {
        let account = match self.gateway.load_account(&ctx.donor).await {
            Ok(account) => account,
            Err(GatewayError::AccountNotFound(addr)) => {
                ctx.fail(format!("account {addr} has never been funded"));
                return DonateEvent::BuildFailed(FailureKind::InvalidInput);
            }
            Err(e) => {
                ctx.fail(&e);
                return DonateEvent::BuildFailed(FailureKind::TransportError);
            }
        };

        let op = match operations::native_payment(&self.campaign.recipient, ctx.amount.stroops) {
            Ok(op) => op,
            Err(e) => {
                ctx.fail(&e);
                return DonateEvent::BuildFailed(FailureKind::InvalidInput);
            }
        };
        match build_envelope(
            &ctx.donor,
            account.sequence + 1,
            op,
            self.donation.base_fee,
            self.donation.tx_timeout_secs,
        ) {
            Ok(envelope) => {
                ctx.envelope = Some(envelope);
                DonateEvent::Built
            }
            Err(e) => {
                ctx.fail(&e);
                DonateEvent::BuildFailed(FailureKind::InvalidInput)
            }
        }
    }

    async fn build_record(&self, ctx: &mut SessionContext) -> DonateEvent {
        // Fresh reload: the payment consumed a sequence number, so the
        // value loaded for the first leg is stale by construction.
        let account = match self.gateway.load_account(&ctx.donor).await {
            Ok(account) => account,
            Err(e) => {
                ctx.fail(&e);
                return DonateEvent::BuildFailed(FailureKind::TransportError);
            }
        };

        let op = match operations::donate_invocation(
            &self.campaign.contract_id,
            &ctx.donor,
            ctx.amount.whole_lumens,
        ) {
            Ok(op) => op,
            Err(e) => {
                ctx.fail(&e);
                return DonateEvent::BuildFailed(FailureKind::TransportError);
            }
        };
        match build_envelope(
            &ctx.donor,
            account.sequence + 1,
            op,
            self.donation.base_fee,
            self.donation.tx_timeout_secs,
        ) {
            Ok(envelope) => {
                ctx.envelope = Some(envelope);
                DonateEvent::Built
            }
            Err(e) => {
                ctx.fail(&e);
                DonateEvent::BuildFailed(FailureKind::TransportError)
            }
        }
    }

    async fn request_signature(&self, ctx: &mut SessionContext) -> DonateEvent {
        let Some(envelope) = ctx.envelope.take() else {
            ctx.fail("no envelope to sign");
            return DonateEvent::SignatureRefused;
        };
        match self.signer.sign(&envelope, &self.network).await {
            Ok(signed) => {
                ctx.envelope = Some(signed);
                DonateEvent::Signed
            }
            Err(e) => {
                ctx.fail(&e);
                DonateEvent::SignatureRefused
            }
        }
    }

    async fn submit(&self, ctx: &mut SessionContext, leg: Leg) -> DonateEvent {
        let Some(envelope) = ctx.envelope.take() else {
            ctx.fail("no envelope to submit");
            return DonateEvent::SubmissionRejected;
        };
        match self.gateway.submit(&envelope).await {
            Ok(outcome) => match outcome.hash() {
                Some(hash) => {
                    match leg {
                        Leg::Payment => ctx.payment_hash = Some(hash.to_string()),
                        Leg::Record => ctx.record_hash = Some(hash.to_string()),
                    }
                    DonateEvent::Accepted
                }
                None => {
                    ctx.fail(format!("submission rejected: {outcome:?}"));
                    DonateEvent::SubmissionRejected
                }
            },
            // Transport faults are folded into rejection: the envelope
            // may or may not have reached the network, and resubmitting
            // the same sequence number is never safe.
            Err(e) => {
                ctx.fail(&e);
                DonateEvent::SubmissionRejected
            }
        }
    }

    async fn simulate_record(&self, ctx: &mut SessionContext) -> DonateEvent {
        let Some(envelope) = ctx.envelope.as_ref() else {
            ctx.fail("no envelope to simulate");
            return DonateEvent::SimulationFailed;
        };
        match self.simulator.simulate(envelope).await {
            Ok(SimulationResult::Success(success)) => {
                ctx.simulation = Some(success);
                DonateEvent::SimulationOk
            }
            Ok(SimulationResult::Failure { diagnostic }) => {
                ctx.fail(diagnostic);
                DonateEvent::SimulationFailed
            }
            Err(e) => {
                ctx.fail(&e);
                DonateEvent::SimulationFailed
            }
        }
    }

    fn assemble_record(&self, ctx: &mut SessionContext) -> DonateEvent {
        let (Some(envelope), Some(simulation)) = (ctx.envelope.take(), ctx.simulation.take())
        else {
            ctx.fail("no simulation data to assemble");
            return DonateEvent::AssemblyFailed;
        };
        match assemble(
            &envelope,
            simulation.transaction_data,
            simulation.min_resource_fee,
            &simulation.auth,
        ) {
            Ok(assembled) => {
                ctx.envelope = Some(assembled);
                DonateEvent::Assembled
            }
            Err(e) => {
                ctx.fail(&e);
                DonateEvent::AssemblyFailed
            }
        }
    }
}

/// Which leg of the donation a submission belongs to.
#[derive(Debug, Clone, Copy)]
enum Leg {
    Payment,
    Record,
}

/// Clears the in-flight flag when the session ends, however it ends.
struct SessionGuard<'a>(&'a Mutex<bool>);

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = false;
    }
}
