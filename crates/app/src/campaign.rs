//! Campaign state snapshots.
//!
//! The campaign contract's `get_state` returns a tuple of
//! `(target, raised, deadline, state)`. The client treats it as a
//! read-only snapshot; the only write path is the contract's `donate`
//! method, observed indirectly by re-querying.

use stellar_xdr::curr::ScVal;

use novafund_common::{funding_progress, Error, Result};
use novafund_tx::operations::i128_from_parts;

/// Lifecycle phase of the campaign, as the contract reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CampaignPhase {
    /// Accepting donations.
    #[default]
    Running,
    /// The target was reached.
    Success,
    /// The deadline passed without reaching the target.
    Expired,
}

impl From<u32> for CampaignPhase {
    fn from(value: u32) -> Self {
        match value {
            1 => CampaignPhase::Success,
            2 => CampaignPhase::Expired,
            // The contract only emits 0..=2; treat anything else as the
            // default so a newer contract does not break the display.
            _ => CampaignPhase::Running,
        }
    }
}

/// A read-only snapshot of the campaign's aggregate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignState {
    /// Funding target in whole lumens.
    pub target: i128,
    /// Total raised in whole lumens.
    pub raised: i128,
    /// Campaign deadline as a Unix timestamp (0 if the contract predates
    /// the field).
    pub deadline: u64,
    /// Lifecycle phase.
    pub phase: CampaignPhase,
}

impl CampaignState {
    /// Decodes a snapshot from the `get_state` return value.
    ///
    /// The contract returns at least `(target: i128, raised: i128)`;
    /// `deadline` and `state` follow on current deployments and default
    /// when absent.
    pub fn from_return_value(value: &ScVal) -> Result<Self> {
        let ScVal::Vec(Some(values)) = value else {
            return Err(Error::InvalidData(format!(
                "get_state returned a non-tuple value: {value:?}"
            )));
        };
        let values: &[ScVal] = values.0.as_ref();
        if values.len() < 2 {
            return Err(Error::InvalidData(format!(
                "get_state tuple too short: {} elements",
                values.len()
            )));
        }

        let target = expect_i128(&values[0], "target")?;
        let raised = expect_i128(&values[1], "raised")?;

        let deadline = match values.get(2) {
            Some(ScVal::U64(v)) => *v,
            Some(other) => {
                return Err(Error::InvalidData(format!(
                    "get_state deadline has wrong type: {other:?}"
                )))
            }
            None => 0,
        };
        let phase = match values.get(3) {
            Some(ScVal::U32(v)) => CampaignPhase::from(*v),
            Some(other) => {
                return Err(Error::InvalidData(format!(
                    "get_state phase has wrong type: {other:?}"
                )))
            }
            None => CampaignPhase::Running,
        };

        Ok(CampaignState {
            target,
            raised,
            deadline,
            phase,
        })
    }

    /// Funding progress as a percentage in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        funding_progress(self.raised, self.target)
    }
}

fn expect_i128(value: &ScVal, field: &str) -> Result<i128> {
    match value {
        ScVal::I128(parts) => Ok(i128_from_parts(parts)),
        other => Err(Error::InvalidData(format!(
            "get_state {field} has wrong type: {other:?}"
        ))),
    }
}
