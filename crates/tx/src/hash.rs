//! Transaction hashing and signature attachment.
//!
//! The hash an envelope is signed over covers the network ID and the
//! transaction body, binding every signature to one network.

use stellar_xdr::curr::{
    DecoratedSignature, Limits, Signature, SignatureHint, TransactionEnvelope,
    TransactionSignaturePayload, TransactionSignaturePayloadTaggedTransaction, WriteXdr,
};

use novafund_common::NetworkId;
use novafund_crypto::sha256;

use crate::error::TxError;

/// Computes the signature payload hash of an unsigned envelope.
///
/// This is `SHA256(network_id || tagged transaction body)`: the exact
/// bytes an Ed25519 signer must sign.
pub fn envelope_payload_hash(
    network: &NetworkId,
    envelope: &TransactionEnvelope,
) -> Result<[u8; 32], TxError> {
    let TransactionEnvelope::Tx(v1) = envelope else {
        return Err(TxError::InvalidOperation(
            "only v1 transaction envelopes are supported".to_string(),
        ));
    };

    let payload = TransactionSignaturePayload {
        network_id: (*network).into(),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(v1.tx.clone()),
    };
    let bytes = payload.to_xdr(Limits::none())?;
    Ok(sha256(&bytes))
}

/// Returns a copy of `envelope` with one decorated signature attached.
pub fn attach_signature(
    envelope: &TransactionEnvelope,
    hint: [u8; 4],
    signature: [u8; 64],
) -> Result<TransactionEnvelope, TxError> {
    let TransactionEnvelope::Tx(v1) = envelope else {
        return Err(TxError::InvalidOperation(
            "only v1 transaction envelopes are supported".to_string(),
        ));
    };

    let decorated = DecoratedSignature {
        hint: SignatureHint(hint),
        signature: Signature(
            signature
                .to_vec()
                .try_into()
                .map_err(|_| TxError::Internal("signature must fit".to_string()))?,
        ),
    };

    let mut signatures = v1.signatures.to_vec();
    signatures.push(decorated);
    Ok(TransactionEnvelope::Tx(
        stellar_xdr::curr::TransactionV1Envelope {
            tx: v1.tx.clone(),
            signatures: signatures
                .try_into()
                .map_err(|_| TxError::Internal("signature count must fit".to_string()))?,
        },
    ))
}
