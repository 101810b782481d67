//! Operation constructors.
//!
//! The client issues exactly two kinds of operations: a native-asset
//! payment to the campaign's recipient account, and an invocation of the
//! campaign contract (`donate` to record a donation, `get_state` to read
//! the aggregate state).

use stellar_xdr::curr::{
    AccountId, Asset, ContractId, Hash, HostFunction, Int128Parts, InvokeContractArgs,
    InvokeHostFunctionOp, MuxedAccount, Operation, OperationBody, PaymentOp, PublicKey, ScAddress,
    ScSymbol, ScVal, StringM, Uint256, VecM,
};

use novafund_crypto::strkey;

use crate::error::TxError;

/// Contract method that records a donation.
pub const DONATE_METHOD: &str = "donate";

/// Contract method that returns the aggregate campaign state.
pub const GET_STATE_METHOD: &str = "get_state";

/// Parses a G-address into an [`AccountId`].
pub fn account_id(address: &str) -> Result<AccountId, TxError> {
    let bytes = strkey::decode_account_id(address)
        .map_err(|e| TxError::InvalidOperation(format!("bad account address: {e}")))?;
    Ok(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(bytes))))
}

/// Parses a G-address into a [`MuxedAccount`].
pub fn muxed_account(address: &str) -> Result<MuxedAccount, TxError> {
    let bytes = strkey::decode_account_id(address)
        .map_err(|e| TxError::InvalidOperation(format!("bad account address: {e}")))?;
    Ok(MuxedAccount::Ed25519(Uint256(bytes)))
}

/// Parses a C-address into a contract [`ScAddress`].
pub fn contract_address(contract_id: &str) -> Result<ScAddress, TxError> {
    let bytes = strkey::decode_contract_id(contract_id)
        .map_err(|e| TxError::InvalidOperation(format!("bad contract id: {e}")))?;
    Ok(ScAddress::Contract(ContractId(Hash(bytes))))
}

/// Splits an `i128` into XDR [`Int128Parts`].
pub fn i128_parts(value: i128) -> Int128Parts {
    Int128Parts {
        hi: (value >> 64) as i64,
        lo: value as u64,
    }
}

/// Reassembles an `i128` from XDR [`Int128Parts`].
pub fn i128_from_parts(parts: &Int128Parts) -> i128 {
    ((parts.hi as i128) << 64) | (parts.lo as i128 & 0xffff_ffff_ffff_ffff)
}

/// Builds a native-asset payment operation.
///
/// # Errors
///
/// Returns [`TxError::InvalidOperation`] if `stroops` is non-positive or
/// the destination is not a valid G-address.
pub fn native_payment(destination: &str, stroops: i64) -> Result<Operation, TxError> {
    if stroops <= 0 {
        return Err(TxError::InvalidOperation(format!(
            "payment amount must be positive, got {stroops}"
        )));
    }
    Ok(Operation {
        source_account: None,
        body: OperationBody::Payment(PaymentOp {
            destination: muxed_account(destination)?,
            asset: Asset::Native,
            amount: stroops,
        }),
    })
}

/// Builds a contract invocation operation with no auth entries.
///
/// Auth entries are discovered by simulation and merged in during
/// assembly.
pub fn invoke_contract(
    contract_id: &str,
    method: &str,
    args: Vec<ScVal>,
) -> Result<Operation, TxError> {
    let function_name = ScSymbol(
        StringM::<32>::try_from(method.to_string())
            .map_err(|_| TxError::InvalidOperation(format!("method name too long: {method:?}")))?,
    );
    let args: VecM<ScVal> = args
        .try_into()
        .map_err(|_| TxError::InvalidOperation("too many contract arguments".to_string()))?;

    Ok(Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
            host_function: HostFunction::InvokeContract(InvokeContractArgs {
                contract_address: contract_address(contract_id)?,
                function_name,
                args,
            }),
            auth: VecM::default(),
        }),
    })
}

/// Builds the `donate(donor, amount)` invocation.
///
/// The amount travels as a 128-bit integer of whole lumens. Zero is
/// deliberately not rejected here: a sub-lumen donation truncates to zero
/// and the contract itself refuses it, which surfaces through simulation.
pub fn donate_invocation(
    contract_id: &str,
    donor: &str,
    whole_lumens: i128,
) -> Result<Operation, TxError> {
    let donor_bytes = strkey::decode_account_id(donor)
        .map_err(|e| TxError::InvalidOperation(format!("bad donor address: {e}")))?;
    let donor_address = ScVal::Address(ScAddress::Account(AccountId(
        PublicKey::PublicKeyTypeEd25519(Uint256(donor_bytes)),
    )));
    let amount = ScVal::I128(i128_parts(whole_lumens));
    invoke_contract(contract_id, DONATE_METHOD, vec![donor_address, amount])
}

/// Builds the `get_state()` invocation.
pub fn get_state_invocation(contract_id: &str) -> Result<Operation, TxError> {
    invoke_contract(contract_id, GET_STATE_METHOD, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use novafund_crypto::strkey::{encode_account_id, encode_contract_id};

    fn test_account() -> String {
        encode_account_id(&[1u8; 32])
    }

    fn test_contract() -> String {
        encode_contract_id(&[2u8; 32])
    }

    #[test]
    fn test_native_payment_shape() {
        let op = native_payment(&test_account(), 105_000_000).unwrap();
        match op.body {
            OperationBody::Payment(PaymentOp { asset, amount, .. }) => {
                assert_eq!(asset, Asset::Native);
                assert_eq!(amount, 105_000_000);
            }
            other => panic!("expected payment, got {other:?}"),
        }
    }

    #[test]
    fn test_native_payment_rejects_non_positive() {
        assert!(native_payment(&test_account(), 0).is_err());
        assert!(native_payment(&test_account(), -1).is_err());
    }

    #[test]
    fn test_native_payment_rejects_bad_destination() {
        assert!(native_payment("not-an-address", 1).is_err());
        assert!(native_payment(&test_contract(), 1).is_err());
    }

    #[test]
    fn test_donate_invocation_shape() {
        let op = donate_invocation(&test_contract(), &test_account(), 10).unwrap();
        let OperationBody::InvokeHostFunction(invoke) = &op.body else {
            panic!("expected invoke host function");
        };
        let HostFunction::InvokeContract(args) = &invoke.host_function else {
            panic!("expected contract invocation");
        };
        let expected = ScSymbol(StringM::<32>::try_from(DONATE_METHOD.to_string()).unwrap());
        assert_eq!(args.function_name, expected);
        assert_eq!(args.args.len(), 2);
        assert!(matches!(args.args[0], ScVal::Address(_)));
        assert!(matches!(
            args.args[1],
            ScVal::I128(Int128Parts { hi: 0, lo: 10 })
        ));
        assert!(invoke.auth.is_empty());
    }

    #[test]
    fn test_get_state_invocation_has_no_args() {
        let op = get_state_invocation(&test_contract()).unwrap();
        let OperationBody::InvokeHostFunction(invoke) = &op.body else {
            panic!("expected invoke host function");
        };
        let HostFunction::InvokeContract(args) = &invoke.host_function else {
            panic!("expected contract invocation");
        };
        let expected = ScSymbol(StringM::<32>::try_from(GET_STATE_METHOD.to_string()).unwrap());
        assert_eq!(args.function_name, expected);
        assert!(args.args.is_empty());
    }

    #[test]
    fn test_i128_round_trip() {
        for value in [0i128, 1, -1, 10, i128::MAX, i128::MIN, 1 << 70] {
            assert_eq!(i128_from_parts(&i128_parts(value)), value);
        }
    }

    #[test]
    fn test_contract_address_rejects_account_strkey() {
        assert!(contract_address(&test_account()).is_err());
    }
}
