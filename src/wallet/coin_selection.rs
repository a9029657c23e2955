//! Greedy coin selection over subaccount balances.
//!
//! Candidates are visited in store order (accounts in index order, then
//! subaccounts in address order). Subaccounts with a zero balance are
//! skipped; the rest are accumulated until their balances cover the
//! amount plus the context-free fee estimate.

use crate::core::Amount;
use crate::error::{Result, WalletError};
use crate::wallet::{FeePolicy, SubAccount};

/// A subaccount picked to fund a payment
#[derive(Debug, Clone, Copy)]
pub struct Funding<'a> {
    pub account: &'a str,
    pub subaccount: &'a SubAccount,
}

/// Result of coin selection
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub selected: Vec<Funding<'a>>,
    /// Sum of the selected balances
    pub total: Amount,
    /// Amount plus the gate fee
    pub target: Amount,
}

pub struct CoinSelector;

impl CoinSelector {
    /// Select subaccounts until `amount + fee.fee(None)` is covered.
    pub fn select<'a, I>(candidates: I, amount: Amount, fee: &dyn FeePolicy) -> Result<Selection<'a>>
    where
        I: IntoIterator<Item = (&'a str, &'a SubAccount)>,
    {
        let target = amount.saturating_add(fee.fee(None));
        let mut selected = Vec::new();
        let mut total: Amount = 0;

        for (account, subaccount) in candidates {
            if subaccount.balance == 0 {
                continue;
            }
            selected.push(Funding { account, subaccount });
            total = total.saturating_add(subaccount.balance);

            if total >= target {
                log::debug!(
                    "Selected {} subaccount(s) holding {} for target {}",
                    selected.len(),
                    total,
                    target
                );
                return Ok(Selection { selected, total, target });
            }
        }

        Err(WalletError::InsufficientFunds { have: total, need: target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::FlatFee;

    fn subaccount(address: &str, balance: Amount) -> SubAccount {
        SubAccount {
            address: address.to_string(),
            public_key: String::new(),
            private_key: String::new(),
            balance,
            height: 0,
            received: Vec::new(),
        }
    }

    fn addresses(selection: &Selection) -> Vec<String> {
        selection
            .selected
            .iter()
            .map(|f| f.subaccount.address.clone())
            .collect()
    }

    #[test]
    fn test_selects_until_target_reached() {
        let subs = [subaccount("a", 3), subaccount("b", 5), subaccount("c", 2)];
        let selection =
            CoinSelector::select(subs.iter().map(|s| ("account", s)), 6, &FlatFee(0)).unwrap();

        assert_eq!(addresses(&selection), vec!["a", "b"]);
        assert_eq!(selection.total, 8);
    }

    #[test]
    fn test_skips_zero_balances() {
        let subs = [subaccount("a", 0), subaccount("b", 5), subaccount("c", 0), subaccount("d", 4)];
        let selection =
            CoinSelector::select(subs.iter().map(|s| ("account", s)), 9, &FlatFee(0)).unwrap();

        assert_eq!(addresses(&selection), vec!["b", "d"]);
    }

    #[test]
    fn test_fee_gate_included() {
        let subs = [subaccount("a", 6), subaccount("b", 1)];
        let selection =
            CoinSelector::select(subs.iter().map(|s| ("account", s)), 6, &FlatFee(1)).unwrap();

        assert_eq!(addresses(&selection), vec!["a", "b"]);
        assert_eq!(selection.target, 7);
    }

    #[test]
    fn test_spans_accounts_in_order() {
        let first = [subaccount("x", 2)];
        let second = [subaccount("y", 2)];
        let candidates = first
            .iter()
            .map(|s| ("first", s))
            .chain(second.iter().map(|s| ("second", s)));

        let selection = CoinSelector::select(candidates, 4, &FlatFee(0)).unwrap();
        let accounts: Vec<&str> = selection.selected.iter().map(|f| f.account).collect();
        assert_eq!(accounts, vec!["first", "second"]);
    }

    #[test]
    fn test_insufficient_funds() {
        let subs = [subaccount("a", 1), subaccount("b", 3)];
        let result = CoinSelector::select(subs.iter().map(|s| ("account", s)), 6, &FlatFee(0));

        assert!(matches!(
            result,
            Err(WalletError::InsufficientFunds { have: 4, need: 6 })
        ));
    }
}
