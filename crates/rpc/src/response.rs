//! Wire-format structs and their conversion into crate types.
//!
//! Conversion is kept separate from transport so it can be exercised with
//! canned JSON in tests.

use serde::Deserialize;
use stellar_xdr::curr::{
    Limits, ReadXdr, ScVal, SorobanAuthorizationEntry, SorobanTransactionData,
};

use crate::error::RpcError;
use crate::types::{SimulationResult, SimulationSuccess, SubmissionOutcome};

/// Generic JSON-RPC 2.0 response wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse<R> {
    pub result: Option<R>,
    pub error: Option<JsonRpcErrorObject>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// `simulateTransaction` result payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SimulateResponse {
    pub error: Option<String>,
    pub transaction_data: Option<String>,
    pub min_resource_fee: Option<String>,
    pub results: Option<Vec<SimulateHostResult>>,
    #[serde(default)]
    pub latest_ledger: u32,
}

/// One host-function result within a simulation response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SimulateHostResult {
    pub xdr: Option<String>,
    #[serde(default)]
    pub auth: Vec<String>,
}

impl SimulateResponse {
    /// Converts the wire shape into a [`SimulationResult`].
    ///
    /// A present `error` field means the invocation would fail; that is
    /// a `Failure`, not an `Err`. A success without `transactionData` is
    /// a malformed response.
    pub fn into_result(self) -> Result<SimulationResult, RpcError> {
        if let Some(diagnostic) = self.error {
            return Ok(SimulationResult::Failure { diagnostic });
        }

        let data_b64 = self.transaction_data.ok_or_else(|| {
            RpcError::InvalidResponse("simulation success without transactionData".to_string())
        })?;
        let transaction_data =
            SorobanTransactionData::from_xdr_base64(&data_b64, Limits::none())?;

        let min_resource_fee = match self.min_resource_fee {
            Some(fee) => fee
                .parse::<i64>()
                .map_err(|_| RpcError::InvalidResponse(format!("bad minResourceFee: {fee:?}")))?,
            None => 0,
        };

        let mut return_value = None;
        let mut auth = Vec::new();
        if let Some(first) = self.results.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) {
            if let Some(xdr) = first.xdr {
                return_value = Some(ScVal::from_xdr_base64(&xdr, Limits::none())?);
            }
            for entry in first.auth {
                auth.push(SorobanAuthorizationEntry::from_xdr_base64(
                    &entry,
                    Limits::none(),
                )?);
            }
        }

        Ok(SimulationResult::Success(SimulationSuccess {
            return_value,
            transaction_data,
            min_resource_fee,
            auth,
            latest_ledger: self.latest_ledger,
        }))
    }
}

/// `sendTransaction` result payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendResponse {
    pub status: String,
    pub hash: Option<String>,
    pub error_result_xdr: Option<String>,
}

impl SendResponse {
    /// Classifies the submission status.
    ///
    /// `PENDING` and `DUPLICATE` both mean the envelope reached the
    /// network; everything else is a rejection that requires a rebuilt
    /// envelope.
    pub fn into_outcome(self) -> Result<SubmissionOutcome, RpcError> {
        let hash = || {
            self.hash
                .clone()
                .ok_or_else(|| RpcError::InvalidResponse("accepted without hash".to_string()))
        };
        match self.status.as_str() {
            "PENDING" => Ok(SubmissionOutcome::Pending { hash: hash()? }),
            "DUPLICATE" => Ok(SubmissionOutcome::Duplicate { hash: hash()? }),
            _ => Ok(SubmissionOutcome::Rejected {
                reason: self.status,
                diagnostic: self.error_result_xdr,
            }),
        }
    }
}
