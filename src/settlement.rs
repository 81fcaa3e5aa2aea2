//! Settlement planning: turns net balances into a concrete list of transfers
//! that zero the ledger.

use crate::balance::{BalanceError, Balances};
use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// A single suggested payment from a debtor to a creditor.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: Amount,
}

/// Plans the transfers that settle `balances`.
///
/// Greedy matching: the largest debtor pays the largest creditor until both
/// sides are exhausted. Each transfer zeroes at least one side, so at most
/// `n - 1` transfers are produced for `n` members with non-zero balance.
/// Ties break on member id to keep the plan deterministic.
///
/// Balances that do not sum to zero (within one cent) are rejected: settling
/// a non-closed ledger would manufacture or destroy money.
pub fn plan_transfers(balances: &Balances) -> Result<Vec<Transfer>, BalanceError> {
    let total: Amount = balances.values().copied().sum();
    if total.abs() > Amount::from_minor_units(1) {
        return Err(BalanceError::UnbalancedLedger(total));
    }

    // Largest amount first, id as the tie-break.
    let by_size = |a: &(&String, Amount), b: &(&String, Amount)| {
        b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
    };

    let mut creditors: Vec<(&String, Amount)> = balances
        .iter()
        .filter(|(_, amount)| amount.is_positive())
        .map(|(id, amount)| (id, *amount))
        .collect();
    creditors.sort_by(by_size);

    let mut debtors: Vec<(&String, Amount)> = balances
        .iter()
        .filter(|(_, amount)| amount.is_negative())
        .map(|(id, amount)| (id, amount.abs()))
        .collect();
    debtors.sort_by(by_size);

    let mut transfers = Vec::new();
    let (mut ci, mut di) = (0, 0);
    while ci < creditors.len() && di < debtors.len() {
        let (creditor, credit) = creditors[ci];
        let (debtor, debt) = debtors[di];
        let amount = credit.min(debt);

        transfers.push(Transfer {
            from: debtor.clone(),
            to: creditor.clone(),
            amount,
        });

        creditors[ci].1 -= amount;
        debtors[di].1 -= amount;
        if creditors[ci].1.is_zero() {
            ci += 1;
        }
        if debtors[di].1.is_zero() {
            di += 1;
        }
    }

    Ok(transfers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn balances(entries: &[(&str, i64)]) -> Balances {
        entries
            .iter()
            .map(|(id, cents)| (id.to_string(), Amount::from_minor_units(*cents)))
            .collect()
    }

    /// Replays a transfer plan over the balances it was computed from.
    fn apply(balances: &Balances, transfers: &[Transfer]) -> Balances {
        let mut result = balances.clone();
        for t in transfers {
            *result.get_mut(&t.from).unwrap() += t.amount;
            *result.get_mut(&t.to).unwrap() -= t.amount;
        }
        result
    }

    #[test]
    fn test_simple_pair() {
        let b = balances(&[("alice", 500), ("bob", -500)]);
        let transfers = plan_transfers(&b).unwrap();
        assert_eq!(
            transfers,
            vec![Transfer {
                from: "bob".to_string(),
                to: "alice".to_string(),
                amount: Amount::from_minor_units(500),
            }]
        );
    }

    #[test]
    fn test_one_creditor_many_debtors() {
        let b = balances(&[("alice", 1000), ("bob", -400), ("carol", -600)]);
        let transfers = plan_transfers(&b).unwrap();

        assert_eq!(transfers.len(), 2);
        // Largest debtor pays first.
        assert_eq!(transfers[0].from, "carol");
        assert_eq!(transfers[0].amount, Amount::from_minor_units(600));
        assert_eq!(transfers[1].from, "bob");
        assert_eq!(transfers[1].amount, Amount::from_minor_units(400));
    }

    #[test]
    fn test_settled_ledger_needs_no_transfers() {
        let b = balances(&[("alice", 0), ("bob", 0)]);
        assert!(plan_transfers(&b).unwrap().is_empty());
    }

    #[test]
    fn test_unbalanced_ledger_rejected() {
        let b = balances(&[("alice", 500), ("bob", -300)]);
        let err = plan_transfers(&b).unwrap_err();
        assert_eq!(
            err,
            BalanceError::UnbalancedLedger(Amount::from_minor_units(200))
        );
    }

    #[test]
    fn test_transfers_zero_out_balances() {
        let b = balances(&[
            ("alice", 1234),
            ("bob", -200),
            ("carol", -534),
            ("dave", -500),
            ("erin", 0),
        ]);
        let transfers = plan_transfers(&b).unwrap();
        let settled = apply(&b, &transfers);
        assert!(settled.values().all(Amount::is_zero));
    }

    #[test]
    fn test_at_most_n_minus_one_transfers() {
        let b = balances(&[
            ("alice", 900),
            ("bob", 100),
            ("carol", -300),
            ("dave", -300),
            ("erin", -400),
        ]);
        let transfers = plan_transfers(&b).unwrap();
        assert!(transfers.len() <= 4);
    }

    #[test]
    fn test_deterministic_tie_break_by_id() {
        let b = balances(&[("zed", 500), ("amy", -250), ("ben", -250)]);
        let transfers = plan_transfers(&b).unwrap();
        assert_eq!(transfers[0].from, "amy");
        assert_eq!(transfers[1].from, "ben");
    }
}
