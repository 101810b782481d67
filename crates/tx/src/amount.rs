//! Lumen amount parsing.
//!
//! Donation amounts arrive as decimal lumen strings typed by a user. The
//! two legs of the donation consume them differently:
//!
//! - the **payment** leg wants stroops (1 lumen = 10^7 stroops, `i64`);
//! - the **record** leg passes whole lumens to the contract as an `i128`,
//!   truncating the fractional part. Fractional units below one lumen are
//!   discarded, not rejected; the contract itself rejects a zero amount.

use crate::error::TxError;

/// Number of stroops in one lumen.
pub const STROOPS_PER_LUMEN: i64 = 10_000_000;

/// Maximum number of decimal places a lumen amount can carry.
const MAX_DECIMALS: usize = 7;

/// A parsed donation amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LumenAmount {
    /// The full amount in stroops, for the payment operation.
    pub stroops: i64,
    /// The amount truncated to whole lumens, for the contract call.
    pub whole_lumens: i128,
}

/// Parses a decimal lumen string (e.g. `"12"`, `"0.5"`, `"12.3456789"` is
/// rejected for excess precision) into a [`LumenAmount`].
///
/// # Errors
///
/// Returns [`TxError::InvalidOperation`] if the input is empty, malformed,
/// non-positive, carries more than 7 decimal places, or overflows.
pub fn parse_lumens(input: &str) -> Result<LumenAmount, TxError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TxError::InvalidOperation("empty amount".to_string()));
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(TxError::InvalidOperation(format!(
            "malformed amount: {trimmed:?}"
        )));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        // Signs are rejected here too: negative amounts are never valid.
        return Err(TxError::InvalidOperation(format!(
            "malformed amount: {trimmed:?}"
        )));
    }
    if frac_part.len() > MAX_DECIMALS {
        return Err(TxError::InvalidOperation(format!(
            "at most {MAX_DECIMALS} decimal places supported: {trimmed:?}"
        )));
    }

    let whole: i64 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| TxError::InvalidOperation(format!("amount out of range: {trimmed:?}")))?
    };

    let mut frac: i64 = 0;
    if !frac_part.is_empty() {
        frac = frac_part
            .parse()
            .map_err(|_| TxError::InvalidOperation(format!("amount out of range: {trimmed:?}")))?;
        frac *= 10_i64.pow((MAX_DECIMALS - frac_part.len()) as u32);
    }

    let stroops = whole
        .checked_mul(STROOPS_PER_LUMEN)
        .and_then(|s| s.checked_add(frac))
        .ok_or_else(|| TxError::InvalidOperation(format!("amount out of range: {trimmed:?}")))?;

    if stroops <= 0 {
        return Err(TxError::InvalidOperation(format!(
            "amount must be positive: {trimmed:?}"
        )));
    }

    Ok(LumenAmount {
        stroops,
        whole_lumens: whole as i128,
    })
}
