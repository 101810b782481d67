//! Unsigned envelope construction.
//!
//! An envelope carries exactly one operation, a fee, the caller-supplied
//! sequence number, and a time-bounds expiry horizon. Envelopes are
//! immutable once built: each submission attempt constructs a fresh one
//! from a freshly loaded account.

use stellar_xdr::curr::{
    Memo, Operation, Preconditions, SequenceNumber, TimeBounds, TimePoint, Transaction,
    TransactionEnvelope, TransactionExt, TransactionV1Envelope, VecM,
};

use novafund_common::time::current_timestamp;

use crate::error::TxError;
use crate::operations::muxed_account;

/// Builds an unsigned single-operation transaction envelope.
///
/// `next_sequence` must be the account's freshly loaded sequence number
/// plus one; sequence numbers are single-use and this function never
/// increments anything itself. The envelope expires `timeout_secs` after
/// build time via its upper time bound, after which the ledger rejects it.
///
/// # Errors
///
/// Returns [`TxError::InvalidOperation`] if the source address is
/// malformed.
pub fn build_envelope(
    source: &str,
    next_sequence: i64,
    operation: Operation,
    fee: u32,
    timeout_secs: u64,
) -> Result<TransactionEnvelope, TxError> {
    let operations: VecM<Operation, 100> = vec![operation]
        .try_into()
        .map_err(|_| TxError::Internal("single operation must fit".to_string()))?;

    let tx = Transaction {
        source_account: muxed_account(source)?,
        fee,
        seq_num: SequenceNumber(next_sequence),
        cond: Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(current_timestamp() + timeout_secs),
        }),
        memo: Memo::None,
        operations,
        ext: TransactionExt::V0,
    };

    Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: VecM::default(),
    }))
}
