// Fee policies

use crate::core::{Amount, Transaction};

/// Bytes a P2PKH scriptSig adds once an input is signed
/// (push + 72-byte DER signature with sighash byte + push + 33-byte pubkey)
pub const SIGNED_INPUT_ALLOWANCE: usize = 107;

/// Computes the fee for a payment.
///
/// Called twice while building: with `None` as a transaction-independent
/// gate before any inputs exist, then with the assembled transaction.
pub trait FeePolicy {
    fn fee(&self, tx: Option<&Transaction>) -> Amount;
}

impl<F> FeePolicy for F
where
    F: Fn(Option<&Transaction>) -> Amount,
{
    fn fee(&self, tx: Option<&Transaction>) -> Amount {
        self(tx)
    }
}

/// Same fee regardless of size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatFee(pub Amount);

impl FeePolicy for FlatFee {
    fn fee(&self, _tx: Option<&Transaction>) -> Amount {
        self.0
    }
}

/// Fee proportional to the estimated signed size, never below `minimum`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeFee {
    pub per_kb: Amount,
    pub minimum: Amount,
}

impl SizeFee {
    /// Serialized size once every input carries a signature
    pub fn estimated_size(tx: &Transaction) -> usize {
        tx.serialize().len() + tx.inputs.len() * SIGNED_INPUT_ALLOWANCE
    }
}

impl FeePolicy for SizeFee {
    fn fee(&self, tx: Option<&Transaction>) -> Amount {
        match tx {
            None => self.minimum,
            Some(tx) => {
                let size = Self::estimated_size(tx) as u64;
                let by_size = self.per_kb.saturating_mul(size).div_ceil(1000);
                by_size.max(self.minimum)
            }
        }
    }
}
