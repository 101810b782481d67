//! Assembly: merging simulation results into an envelope.
//!
//! A contract-invoking transaction cannot be signed as built: the network
//! requires the resource footprint, instruction budget, and authorization
//! entries that only a simulation can discover. Assembly takes the
//! simulator's output and produces a new envelope with:
//!
//! - the Soroban transaction data attached (`TransactionExt::V1`),
//! - the fee raised by the simulated resource fee,
//! - the simulator's auth entries adopted when the builder left them empty.
//!
//! Payments never pass through here; only contract invocations are
//! assembled.

use stellar_xdr::curr::{
    OperationBody, SorobanAuthorizationEntry, SorobanTransactionData, TransactionEnvelope,
    TransactionExt, VecM,
};

use crate::error::TxError;

/// Merges simulator-derived data into an unsigned envelope, producing the
/// envelope that actually gets signed and submitted.
///
/// # Errors
///
/// Returns [`TxError::AssemblyError`] if the envelope is not a
/// single-operation contract invocation, already carries signatures, or
/// the combined fee overflows.
pub fn assemble(
    envelope: &TransactionEnvelope,
    transaction_data: SorobanTransactionData,
    min_resource_fee: i64,
    auth: &[SorobanAuthorizationEntry],
) -> Result<TransactionEnvelope, TxError> {
    let TransactionEnvelope::Tx(v1) = envelope else {
        return Err(TxError::AssemblyError(
            "only v1 transaction envelopes can be assembled".to_string(),
        ));
    };
    if !v1.signatures.is_empty() {
        return Err(TxError::AssemblyError(
            "envelope is already signed".to_string(),
        ));
    }
    if v1.tx.operations.len() != 1 {
        return Err(TxError::AssemblyError(format!(
            "expected exactly one operation, found {}",
            v1.tx.operations.len()
        )));
    }

    let mut tx = v1.tx.clone();
    let mut operation = tx.operations[0].clone();

    let OperationBody::InvokeHostFunction(ref mut invoke) = operation.body else {
        return Err(TxError::AssemblyError(
            "footprint data applies only to contract invocations".to_string(),
        ));
    };

    // Adopt simulated auth entries unless the caller supplied its own.
    if invoke.auth.is_empty() && !auth.is_empty() {
        invoke.auth = auth
            .to_vec()
            .try_into()
            .map_err(|_| TxError::AssemblyError("too many auth entries".to_string()))?;
    }

    let resource_fee = u32::try_from(min_resource_fee)
        .map_err(|_| TxError::AssemblyError(format!("resource fee out of range: {min_resource_fee}")))?;
    tx.fee = tx
        .fee
        .checked_add(resource_fee)
        .ok_or_else(|| TxError::AssemblyError("fee overflow".to_string()))?;

    tx.operations = vec![operation]
        .try_into()
        .map_err(|_| TxError::Internal("single operation must fit".to_string()))?;
    tx.ext = TransactionExt::V1(transaction_data);

    Ok(TransactionEnvelope::Tx(
        stellar_xdr::curr::TransactionV1Envelope {
            tx,
            signatures: VecM::default(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_envelope;
    use crate::operations::{donate_invocation, native_payment};
    use novafund_crypto::strkey::{encode_account_id, encode_contract_id};
    use stellar_xdr::curr::{
        LedgerFootprint, SorobanResources, SorobanTransactionDataExt, Transaction,
    };

    fn source() -> String {
        encode_account_id(&[1u8; 32])
    }

    fn sample_data() -> SorobanTransactionData {
        SorobanTransactionData {
            ext: SorobanTransactionDataExt::V0,
            resources: SorobanResources {
                footprint: LedgerFootprint {
                    read_only: VecM::default(),
                    read_write: VecM::default(),
                },
                instructions: 1_000_000,
                disk_read_bytes: 500,
                write_bytes: 200,
            },
            resource_fee: 4_321,
        }
    }

    fn invoke_envelope() -> TransactionEnvelope {
        let contract = encode_contract_id(&[2u8; 32]);
        let op = donate_invocation(&contract, &source(), 10).unwrap();
        build_envelope(&source(), 7, op, 100, 30).unwrap()
    }

    fn inner_tx(envelope: &TransactionEnvelope) -> &Transaction {
        let TransactionEnvelope::Tx(v1) = envelope else {
            panic!("expected v1 envelope");
        };
        &v1.tx
    }

    #[test]
    fn test_assemble_attaches_data_and_raises_fee() {
        let envelope = invoke_envelope();
        let assembled = assemble(&envelope, sample_data(), 4_321, &[]).unwrap();
        let tx = inner_tx(&assembled);
        assert_eq!(tx.fee, 100 + 4_321);
        assert!(matches!(tx.ext, TransactionExt::V1(_)));
        // Original envelope is untouched.
        assert_eq!(inner_tx(&envelope).fee, 100);
        assert!(matches!(inner_tx(&envelope).ext, TransactionExt::V0));
    }

    #[test]
    fn test_assemble_rejects_payment() {
        let dest = encode_account_id(&[3u8; 32]);
        let op = native_payment(&dest, 500).unwrap();
        let envelope = build_envelope(&source(), 7, op, 100, 30).unwrap();
        let err = assemble(&envelope, sample_data(), 0, &[]).unwrap_err();
        assert!(matches!(err, TxError::AssemblyError(_)));
    }

    #[test]
    fn test_assemble_rejects_fee_overflow() {
        let envelope = invoke_envelope();
        assert!(assemble(&envelope, sample_data(), i64::MAX, &[]).is_err());
        assert!(assemble(&envelope, sample_data(), -1, &[]).is_err());
    }

    #[test]
    fn test_assemble_adopts_simulated_auth() {
        use stellar_xdr::curr::{
            InvokeContractArgs, ScSymbol, SorobanAuthorizedFunction, SorobanAuthorizedInvocation,
            SorobanCredentials, StringM,
        };
        let contract = encode_contract_id(&[2u8; 32]);
        let entry = SorobanAuthorizationEntry {
            credentials: SorobanCredentials::SourceAccount,
            root_invocation: SorobanAuthorizedInvocation {
                function: SorobanAuthorizedFunction::ContractFn(InvokeContractArgs {
                    contract_address: crate::operations::contract_address(&contract).unwrap(),
                    function_name: ScSymbol(StringM::try_from("donate".to_string()).unwrap()),
                    args: VecM::default(),
                }),
                sub_invocations: VecM::default(),
            },
        };
        let assembled = assemble(&invoke_envelope(), sample_data(), 0, &[entry]).unwrap();
        let tx = inner_tx(&assembled);
        let OperationBody::InvokeHostFunction(invoke) = &tx.operations[0].body else {
            panic!("expected invoke host function");
        };
        assert_eq!(invoke.auth.len(), 1);
    }

    #[test]
    fn test_assemble_preserves_sequence() {
        let envelope = invoke_envelope();
        let assembled = assemble(&envelope, sample_data(), 10, &[]).unwrap();
        assert_eq!(inner_tx(&assembled).seq_num.0, 7);
    }
}
