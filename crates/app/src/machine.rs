//! The donation state machine.
//!
//! A donation is a waterfall of dependent, partially-reversible,
//! network-bound steps. Rather than nesting callbacks, the sequence is an
//! explicit machine: [`advance`] is a pure function from (phase, event)
//! to (next phase, next command). The async driver owns all side effects;
//! this module owns all decisions, which makes every transition testable
//! without a network.
//!
//! ```text
//! Idle
//!   Requested                 -> BuildingPayment          [BuildPayment]
//! BuildingPayment
//!   Built                     -> AwaitingPaymentSignature [RequestPaymentSignature]
//!   BuildFailed(kind)         -> Failed(kind)
//! AwaitingPaymentSignature
//!   Signed                    -> SubmittingPayment        [SubmitPayment]
//!   SignatureRefused          -> Failed(SignatureDenied)
//! SubmittingPayment
//!   Accepted                  -> ConfirmingPayment        [AwaitSettlement]
//!   SubmissionRejected        -> Failed(PaymentRejected)
//! ConfirmingPayment
//!   Settled                   -> BuildingRecord           [BuildRecord]
//! BuildingRecord
//!   Built                     -> SimulatingRecord         [SimulateRecord]
//!   BuildFailed(kind)         -> Failed(kind, partial)
//! SimulatingRecord
//!   SimulationOk              -> AssemblingRecord         [AssembleRecord]
//!   SimulationFailed          -> Failed(SimulationFailed, partial)
//! AssemblingRecord
//!   Assembled                 -> AwaitingRecordSignature  [RequestRecordSignature]
//!   AssemblyFailed            -> Failed(AssemblyFailed, partial)
//! AwaitingRecordSignature
//!   Signed                    -> SubmittingRecord         [SubmitRecord]
//!   SignatureRefused          -> Failed(SignatureDenied, partial)
//! SubmittingRecord
//!   Accepted                  -> Succeeded
//!   SubmissionRejected        -> Failed(RecordRejected, partial)
//! ```
//!
//! Once the payment submission is accepted the funds are considered
//! moved: every later failure is terminal and `partial`, and the machine
//! never re-attempts or reverses the payment. There is no settling-phase
//! confirmation poll; `ConfirmingPayment` is a fixed optimistic wait.

use std::fmt;

/// Why a donation session ended in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Bad amount or address; no network call was made. The user can
    /// correct the input and start a fresh session.
    InvalidInput,
    /// The signer refused or failed to sign.
    SignatureDenied,
    /// The network refused the payment envelope.
    PaymentRejected,
    /// The network refused the record envelope.
    RecordRejected,
    /// The record simulation failed (contract-side fault or transport).
    SimulationFailed,
    /// Simulation data could not be merged into the record envelope.
    AssemblyFailed,
    /// A connectivity fault outside submission.
    TransportError,
    /// A donation session is already in flight.
    SessionInFlight,
    /// A transition the protocol cannot produce; indicates a driver bug.
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::InvalidInput => "invalid input",
            FailureKind::SignatureDenied => "signature denied",
            FailureKind::PaymentRejected => "payment rejected",
            FailureKind::RecordRejected => "record rejected",
            FailureKind::SimulationFailed => "simulation failed",
            FailureKind::AssemblyFailed => "assembly failed",
            FailureKind::TransportError => "transport error",
            FailureKind::SessionInFlight => "session in flight",
            FailureKind::Internal => "internal error",
        };
        f.write_str(s)
    }
}

/// The phases of a donation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationPhase {
    /// No session running.
    Idle,
    /// Loading the donor account and building the payment envelope.
    BuildingPayment,
    /// Waiting on the external signer for the payment.
    AwaitingPaymentSignature,
    /// Handing the signed payment to the network.
    SubmittingPayment,
    /// Fixed settling delay after the payment was accepted.
    ConfirmingPayment,
    /// Reloading the account and building the record envelope.
    BuildingRecord,
    /// Dry-running the record invocation.
    SimulatingRecord,
    /// Merging simulation data into the record envelope.
    AssemblingRecord,
    /// Waiting on the external signer for the record.
    AwaitingRecordSignature,
    /// Handing the signed record to the network.
    SubmittingRecord,
    /// Terminal: both legs accepted.
    Succeeded,
    /// Terminal failure. `partial` means the payment already committed
    /// and only the record is missing.
    Failed {
        /// What went wrong.
        kind: FailureKind,
        /// Whether funds already moved.
        partial: bool,
    },
}

impl DonationPhase {
    /// Returns `true` for `Succeeded` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DonationPhase::Succeeded | DonationPhase::Failed { .. }
        )
    }

    /// Returns `true` once the payment leg has been accepted by the
    /// network, the point of no return.
    pub fn payment_committed(&self) -> bool {
        matches!(
            self,
            DonationPhase::ConfirmingPayment
                | DonationPhase::BuildingRecord
                | DonationPhase::SimulatingRecord
                | DonationPhase::AssemblingRecord
                | DonationPhase::AwaitingRecordSignature
                | DonationPhase::SubmittingRecord
                | DonationPhase::Succeeded
        )
    }

    /// The human-readable status line for this phase.
    ///
    /// These strings are the only externally observable progress signal;
    /// the display layer renders them verbatim.
    pub fn status_line(&self) -> &'static str {
        match self {
            DonationPhase::Idle => "",
            DonationPhase::BuildingPayment => "Preparing transaction...",
            DonationPhase::AwaitingPaymentSignature | DonationPhase::SubmittingPayment => {
                "Process 1/2: Sending payment..."
            }
            DonationPhase::ConfirmingPayment => "Confirming payment...",
            DonationPhase::BuildingRecord
            | DonationPhase::SimulatingRecord
            | DonationPhase::AssemblingRecord
            | DonationPhase::AwaitingRecordSignature
            | DonationPhase::SubmittingRecord => "Process 2/2: Recording donation...",
            DonationPhase::Succeeded => "Success! Donation recorded.",
            DonationPhase::Failed { .. } => "Failed.",
        }
    }
}

/// Events the driver feeds back into the machine, one per completed
/// side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonateEvent {
    /// A validated donate request arrived.
    Requested,
    /// The current envelope was built.
    Built,
    /// Building the current envelope failed; the kind distinguishes bad
    /// input from connectivity faults.
    BuildFailed(FailureKind),
    /// The signer returned a signed envelope.
    Signed,
    /// The signer refused or errored.
    SignatureRefused,
    /// The network accepted the submission (pending inclusion).
    Accepted,
    /// The network rejected the submission, or transport failed mid-submit.
    SubmissionRejected,
    /// The settling delay elapsed.
    Settled,
    /// Simulation reported success.
    SimulationOk,
    /// Simulation reported failure (or transport failed mid-simulate).
    SimulationFailed,
    /// Simulation data was merged into the envelope.
    Assembled,
    /// Merging simulation data failed.
    AssemblyFailed,
}

/// Side-effect commands the driver executes between transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Load the donor account and build the payment envelope.
    BuildPayment,
    /// Ask the signer for the payment signature.
    RequestPaymentSignature,
    /// Submit the signed payment.
    SubmitPayment,
    /// Wait out the fixed settling delay.
    AwaitSettlement,
    /// Reload the account and build the record envelope.
    BuildRecord,
    /// Dry-run the record invocation.
    SimulateRecord,
    /// Merge simulation data into the record envelope.
    AssembleRecord,
    /// Ask the signer for the record signature.
    RequestRecordSignature,
    /// Submit the signed record.
    SubmitRecord,
}

/// The pure transition function.
///
/// Returns the next phase and, for non-terminal phases, the command the
/// driver must execute next. Any (phase, event) pair the protocol cannot
/// produce maps to a terminal `Internal` failure rather than panicking.
pub fn advance(phase: &DonationPhase, event: DonateEvent) -> (DonationPhase, Option<Command>) {
    use Command as C;
    use DonateEvent as E;
    use DonationPhase as P;

    match (phase, event) {
        (P::Idle, E::Requested) => (P::BuildingPayment, Some(C::BuildPayment)),

        (P::BuildingPayment, E::Built) => {
            (P::AwaitingPaymentSignature, Some(C::RequestPaymentSignature))
        }
        (P::BuildingPayment, E::BuildFailed(kind)) => fail(kind, false),

        (P::AwaitingPaymentSignature, E::Signed) => (P::SubmittingPayment, Some(C::SubmitPayment)),
        (P::AwaitingPaymentSignature, E::SignatureRefused) => {
            fail(FailureKind::SignatureDenied, false)
        }

        (P::SubmittingPayment, E::Accepted) => (P::ConfirmingPayment, Some(C::AwaitSettlement)),
        (P::SubmittingPayment, E::SubmissionRejected) => fail(FailureKind::PaymentRejected, false),

        // The payment is committed from here on; failures are partial.
        (P::ConfirmingPayment, E::Settled) => (P::BuildingRecord, Some(C::BuildRecord)),

        (P::BuildingRecord, E::Built) => (P::SimulatingRecord, Some(C::SimulateRecord)),
        (P::BuildingRecord, E::BuildFailed(kind)) => fail(kind, true),

        (P::SimulatingRecord, E::SimulationOk) => (P::AssemblingRecord, Some(C::AssembleRecord)),
        (P::SimulatingRecord, E::SimulationFailed) => fail(FailureKind::SimulationFailed, true),

        (P::AssemblingRecord, E::Assembled) => {
            (P::AwaitingRecordSignature, Some(C::RequestRecordSignature))
        }
        (P::AssemblingRecord, E::AssemblyFailed) => fail(FailureKind::AssemblyFailed, true),

        (P::AwaitingRecordSignature, E::Signed) => (P::SubmittingRecord, Some(C::SubmitRecord)),
        (P::AwaitingRecordSignature, E::SignatureRefused) => {
            fail(FailureKind::SignatureDenied, true)
        }

        (P::SubmittingRecord, E::Accepted) => (P::Succeeded, None),
        (P::SubmittingRecord, E::SubmissionRejected) => fail(FailureKind::RecordRejected, true),

        (phase, _) => fail(FailureKind::Internal, phase.payment_committed()),
    }
}

fn fail(kind: FailureKind, partial: bool) -> (DonationPhase, Option<Command>) {
    (DonationPhase::Failed { kind, partial }, None)
}
