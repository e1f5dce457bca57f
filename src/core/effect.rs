//! Ledger effects - what a transaction does to account balances and envelopes.
//!
//! Balances and envelope totals are accumulators, never recomputed from
//! history. Every ledger operation therefore works in terms of effects:
//! creation applies a transaction's effect, deletion applies its reversal, an
//! edit applies the reversal of the old row and then the effect of the new
//! one, and a batch delete nets the reversals per account and per category
//! before touching the store.

use crate::{
    core::{
        account::apply_balance_delta,
        category::{CategoryDelta, apply_category_delta},
    },
    entities::{TransactionType, transaction},
    errors::Result,
};
use sea_orm::ConnectionTrait;
use std::collections::BTreeMap;

/// Signed changes one transaction makes to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerEffect {
    /// `(account_id, balance delta)` pairs
    pub account_deltas: Vec<(i64, i64)>,
    /// Envelope change for categorized expenses
    pub category_delta: Option<(i64, CategoryDelta)>,
}

impl LedgerEffect {
    /// Effect of a transaction with the given fields.
    ///
    /// - income: `+amount` on the account
    /// - expense: `-amount` on the account; its category gains `+amount`
    ///   spent and loses `amount` available
    /// - transfer: `-amount` on the source, `+amount` on the counterpart when
    ///   one is recorded; never touches categories
    #[must_use]
    pub fn for_parts(
        transaction_type: TransactionType,
        account_id: i64,
        counterpart_account_id: Option<i64>,
        category_id: Option<i64>,
        amount: i64,
    ) -> Self {
        match transaction_type {
            TransactionType::Income => Self {
                account_deltas: vec![(account_id, amount)],
                category_delta: None,
            },
            TransactionType::Expense => Self {
                account_deltas: vec![(account_id, -amount)],
                category_delta: category_id
                    .map(|category_id| (category_id, CategoryDelta::spending(amount))),
            },
            TransactionType::Transfer => {
                let mut account_deltas = vec![(account_id, -amount)];
                if let Some(counterpart) = counterpart_account_id {
                    account_deltas.push((counterpart, amount));
                }
                Self {
                    account_deltas,
                    category_delta: None,
                }
            }
        }
    }

    /// Effect of a stored transaction row.
    #[must_use]
    pub fn of(txn: &transaction::Model) -> Self {
        Self::for_parts(
            txn.transaction_type,
            txn.account_id,
            txn.counterpart_account_id,
            txn.category_id,
            txn.amount,
        )
    }

    /// The effect that exactly undoes this one.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            account_deltas: self
                .account_deltas
                .iter()
                .map(|&(account_id, delta)| (account_id, -delta))
                .collect(),
            category_delta: self
                .category_delta
                .map(|(category_id, delta)| (category_id, delta.reversed())),
        }
    }
}

/// Effects summed per account and per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetDeltas {
    accounts: BTreeMap<i64, i64>,
    categories: BTreeMap<i64, CategoryDelta>,
}

impl NetDeltas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, effect: &LedgerEffect) {
        for &(account_id, delta) in &effect.account_deltas {
            *self.accounts.entry(account_id).or_insert(0) += delta;
        }
        if let Some((category_id, delta)) = effect.category_delta {
            *self.categories.entry(category_id).or_default() += delta;
        }
    }

    /// Non-zero net balance deltas, one per account.
    pub fn account_deltas(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.accounts
            .iter()
            .filter(|&(_, &delta)| delta != 0)
            .map(|(&id, &delta)| (id, delta))
    }

    /// Non-zero net envelope deltas, one per category.
    pub fn category_deltas(&self) -> impl Iterator<Item = (i64, CategoryDelta)> + '_ {
        self.categories
            .iter()
            .filter(|&(_, delta)| !delta.is_zero())
            .map(|(&id, &delta)| (id, delta))
    }
}

impl<'a> FromIterator<&'a LedgerEffect> for NetDeltas {
    fn from_iter<I: IntoIterator<Item = &'a LedgerEffect>>(iter: I) -> Self {
        let mut net = Self::new();
        for effect in iter {
            net.add(effect);
        }
        net
    }
}

/// Writes one effect to the store.
pub(crate) async fn apply_effect<C>(db: &C, effect: &LedgerEffect) -> Result<()>
where
    C: ConnectionTrait,
{
    for &(account_id, delta) in &effect.account_deltas {
        apply_balance_delta(db, account_id, delta).await?;
    }
    if let Some((category_id, delta)) = effect.category_delta {
        apply_category_delta(db, category_id, delta).await?;
    }
    Ok(())
}

/// Writes netted deltas: exactly one update per distinct account and category.
/// Returns how many accounts and categories were updated.
pub(crate) async fn apply_net<C>(db: &C, net: &NetDeltas) -> Result<(usize, usize)>
where
    C: ConnectionTrait,
{
    let mut accounts = 0;
    for (account_id, delta) in net.account_deltas() {
        apply_balance_delta(db, account_id, delta).await?;
        accounts += 1;
    }

    let mut categories = 0;
    for (category_id, delta) in net.category_deltas() {
        apply_category_delta(db, category_id, delta).await?;
        categories += 1;
    }

    Ok((accounts, categories))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_effect() {
        let effect = LedgerEffect::for_parts(TransactionType::Income, 1, None, Some(9), 500);
        assert_eq!(effect.account_deltas, vec![(1, 500)]);
        // Income never touches envelopes
        assert_eq!(effect.category_delta, None);
    }

    #[test]
    fn test_expense_effect() {
        let categorized = LedgerEffect::for_parts(TransactionType::Expense, 1, None, Some(9), 2_500);
        assert_eq!(categorized.account_deltas, vec![(1, -2_500)]);
        assert_eq!(
            categorized.category_delta,
            Some((
                9,
                CategoryDelta {
                    spent: 2_500,
                    available: -2_500
                }
            ))
        );

        let uncategorized = LedgerEffect::for_parts(TransactionType::Expense, 1, None, None, 2_500);
        assert_eq!(uncategorized.category_delta, None);
    }

    #[test]
    fn test_transfer_effect() {
        let one_sided = LedgerEffect::for_parts(TransactionType::Transfer, 1, None, Some(9), 1_000);
        assert_eq!(one_sided.account_deltas, vec![(1, -1_000)]);
        assert_eq!(one_sided.category_delta, None);

        let two_sided = LedgerEffect::for_parts(TransactionType::Transfer, 1, Some(2), None, 1_000);
        assert_eq!(two_sided.account_deltas, vec![(1, -1_000), (2, 1_000)]);
    }

    #[test]
    fn test_reversal_cancels_effect() {
        let effect = LedgerEffect::for_parts(TransactionType::Expense, 3, None, Some(4), 750);
        let net: NetDeltas = [effect.clone(), effect.reversed()].iter().collect();

        assert_eq!(net.account_deltas().count(), 0);
        assert_eq!(net.category_deltas().count(), 0);
        assert_eq!(effect.reversed().reversed(), effect);
    }

    #[test]
    fn test_net_deltas_group_by_entity() {
        let effects = [
            LedgerEffect::for_parts(TransactionType::Expense, 1, None, Some(10), 100),
            LedgerEffect::for_parts(TransactionType::Expense, 1, None, Some(10), 250),
            LedgerEffect::for_parts(TransactionType::Income, 1, None, None, 1_000),
            LedgerEffect::for_parts(TransactionType::Transfer, 2, Some(1), None, 40),
        ];
        let reversals: Vec<_> = effects.iter().map(LedgerEffect::reversed).collect();
        let net: NetDeltas = reversals.iter().collect();

        let accounts: Vec<_> = net.account_deltas().collect();
        assert_eq!(accounts, vec![(1, 100 + 250 - 1_000 - 40), (2, 40)]);
        let categories: Vec<_> = net.category_deltas().collect();
        assert_eq!(
            categories,
            vec![(
                10,
                CategoryDelta {
                    spent: -350,
                    available: 350
                }
            )]
        );
    }
}
