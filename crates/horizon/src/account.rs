//! Account state as Horizon reports it.

use serde::Deserialize;

use crate::error::HorizonError;

/// A snapshot of an account's ledger state.
///
/// The sequence number is ledger-authoritative and advances once per
/// included transaction; a snapshot is stale the moment one of the
/// account's transactions lands, which is why the donation flow reloads
/// between phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// The account's address (G-strkey).
    pub account_id: String,
    /// Current sequence number. The next transaction must use
    /// `sequence + 1`.
    pub sequence: i64,
    /// Asset balances, as Horizon reports them.
    pub balances: Vec<Balance>,
}

impl Account {
    /// Returns the native (lumen) balance string, if the account holds
    /// one.
    pub fn native_balance(&self) -> Option<&str> {
        self.balances
            .iter()
            .find(|b| b.asset_type == "native")
            .map(|b| b.balance.as_str())
    }
}

/// One asset balance line.
///
/// Balances stay in Horizon's decimal-string form; the client displays
/// them and never does arithmetic on them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Balance {
    /// Asset type tag (`native`, `credit_alphanum4`, ...).
    pub asset_type: String,
    /// Decimal balance string.
    pub balance: String,
}

/// Wire shape of Horizon's account resource. Only the fields the client
/// consumes are modeled.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountRecord {
    pub id: String,
    pub sequence: String,
    #[serde(default)]
    pub balances: Vec<Balance>,
}

impl AccountRecord {
    pub fn into_account(self) -> Result<Account, HorizonError> {
        let sequence = self.sequence.parse::<i64>().map_err(|_| {
            HorizonError::InvalidResponse(format!("bad sequence number: {:?}", self.sequence))
        })?;
        Ok(Account {
            account_id: self.id,
            sequence,
            balances: self.balances,
        })
    }
}
