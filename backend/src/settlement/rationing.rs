//! Proportional rationing
//!
//! When a payer cannot cover every obligation in a batch, cash is shared out
//! pro rata with an exact integer remainder rule:
//!
//! ```text
//! payment_i = floor(cash × due_i / total_due)
//! remainder = cash − Σ payment_i          (always < number of non-zero dues)
//! +1 to each of the first `remainder` non-zero obligations, in batch order
//! ```
//!
//! So `Σ payment_i == cash` exactly and no creditor gets more than its share
//! plus one unit. The batch order is the caller's registration order; this
//! module never reorders.
//!
//! # Example
//!
//! ```rust
//! use credit_ledger_core_rs::settlement::ration;
//!
//! let r = ration(71, &[40, 30, 30]).unwrap();
//! assert_eq!(r.payments, vec![29, 21, 21]);
//! assert!(r.is_rationed());
//! ```

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RationingError {
    #[error("Obligation {index} has negative due {due}")]
    NegativeDue { index: usize, due: i64 },

    #[error("Cannot allocate negative amount {amount}")]
    NegativeAmount { amount: i64 },

    #[error("Cannot allocate {amount} across zero total weight")]
    NoWeight { amount: i64 },

    #[error("Rationing inconsistency: {0}")]
    Inconsistent(String),
}

/// Outcome of paying one batch of obligations
#[derive(Debug, Clone, PartialEq)]
pub struct Rationing {
    /// Payment per obligation, same order as the dues
    pub payments: Vec<i64>,
    pub total_due: i64,
    pub paid: i64,
}

impl Rationing {
    /// Cash did not cover the batch
    pub fn is_rationed(&self) -> bool {
        self.paid < self.total_due
    }

    pub fn shortfall(&self) -> i64 {
        self.total_due - self.paid
    }
}

/// Split `amount` across `weights` proportionally, remainder to the first
/// non-zero weights in order. The result always sums to `amount`.
pub fn split_proportionally(amount: i64, weights: &[i64]) -> Result<Vec<i64>, RationingError> {
    if amount < 0 {
        return Err(RationingError::NegativeAmount { amount });
    }
    let mut total: i128 = 0;
    for (index, &w) in weights.iter().enumerate() {
        if w < 0 {
            return Err(RationingError::NegativeDue { index, due: w });
        }
        total += w as i128;
    }
    if total == 0 {
        if amount == 0 {
            return Ok(vec![0; weights.len()]);
        }
        return Err(RationingError::NoWeight { amount });
    }

    let mut shares: Vec<i64> = weights
        .iter()
        .map(|&w| ((amount as i128 * w as i128) / total) as i64)
        .collect();

    let allocated: i64 = shares.iter().sum();
    let remainder = amount - allocated;
    let eligible = weights.iter().filter(|&&w| w > 0).count() as i64;
    if remainder < 0 || (remainder > 0 && remainder >= eligible) {
        return Err(RationingError::Inconsistent(format!(
            "remainder {} out of range for {} obligations",
            remainder, eligible
        )));
    }

    let mut left = remainder;
    for (share, &w) in shares.iter_mut().zip(weights) {
        if left == 0 {
            break;
        }
        if w > 0 {
            *share += 1;
            left -= 1;
        }
    }
    Ok(shares)
}

/// Pay a batch of `dues` out of `cash`
///
/// Pays in full when `cash` covers the batch; otherwise rations with
/// [`split_proportionally`]. Post-conditions are checked here and reported
/// as [`RationingError::Inconsistent`].
pub fn ration(cash: i64, dues: &[i64]) -> Result<Rationing, RationingError> {
    if cash < 0 {
        return Err(RationingError::NegativeAmount { amount: cash });
    }
    let mut total_due: i64 = 0;
    for (index, &due) in dues.iter().enumerate() {
        if due < 0 {
            return Err(RationingError::NegativeDue { index, due });
        }
        total_due += due;
    }

    if cash >= total_due {
        return Ok(Rationing {
            payments: dues.to_vec(),
            total_due,
            paid: total_due,
        });
    }

    let payments = split_proportionally(cash, dues)?;
    let paid: i64 = payments.iter().sum();
    if paid != cash {
        return Err(RationingError::Inconsistent(format!(
            "rationed payments sum to {} but cash was {}",
            paid, cash
        )));
    }
    if let Some(index) = payments.iter().zip(dues).position(|(p, d)| p > d) {
        return Err(RationingError::Inconsistent(format!(
            "obligation {} paid {} above its due {}",
            index, payments[index], dues[index]
        )));
    }

    Ok(Rationing {
        payments,
        total_due,
        paid,
    })
}
