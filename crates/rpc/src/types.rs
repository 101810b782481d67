//! Response types of the two RPC methods the client consumes.

use stellar_xdr::curr::{ScVal, SorobanAuthorizationEntry, SorobanTransactionData};

/// Result of a transaction simulation.
///
/// Simulation is a non-committing dry-run: it never mutates ledger state
/// and is safe to repeat. A contract-side failure (an assertion tripping,
/// a bad argument) is a `Failure`, not a transport error.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationResult {
    /// The invocation would succeed.
    Success(SimulationSuccess),
    /// The invocation would fail; `diagnostic` carries the host's
    /// explanation.
    Failure { diagnostic: String },
}

/// The useful payload of a successful simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSuccess {
    /// The invocation's return value, when the host produced one.
    pub return_value: Option<ScVal>,
    /// Resource footprint and budget data to merge into the envelope.
    pub transaction_data: SorobanTransactionData,
    /// Minimum resource fee the network will charge, in stroops.
    pub min_resource_fee: i64,
    /// Authorization entries the invocation requires.
    pub auth: Vec<SorobanAuthorizationEntry>,
    /// Ledger sequence the simulation ran against.
    pub latest_ledger: u32,
}

/// Outcome of handing a signed envelope to the network.
///
/// `Pending` means accepted into the mempool, not included in a ledger.
/// Whether it ultimately lands is not polled by this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Accepted; the network will try to include it.
    Pending {
        /// Transaction hash, hex-encoded.
        hash: String,
    },
    /// The same envelope was already submitted. Treated like `Pending`:
    /// the envelope demonstrably reached the network.
    Duplicate {
        /// Transaction hash, hex-encoded.
        hash: String,
    },
    /// The network refused the envelope. Not retryable as-is: a new
    /// envelope with a fresh sequence number is required.
    Rejected {
        /// Machine-readable reason (the RPC status, e.g. `ERROR`).
        reason: String,
        /// Base64 XDR of the failure result, when the server provided it.
        diagnostic: Option<String>,
    },
}

impl SubmissionOutcome {
    /// Returns the transaction hash if the envelope reached the network.
    pub fn hash(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Pending { hash } | SubmissionOutcome::Duplicate { hash } => {
                Some(hash)
            }
            SubmissionOutcome::Rejected { .. } => None,
        }
    }

    /// Returns `true` for `Pending`/`Duplicate`.
    pub fn is_accepted(&self) -> bool {
        self.hash().is_some()
    }
}
