//! Ready-to-assign - account cash that no envelope has claimed yet.
//!
//! Always computed from the live account balance and envelope totals; nothing
//! here is cached.

use crate::{
    core::{
        account::{get_accounts_for_owner, require_account},
        budget::require_budget,
        category::get_categories_for_account,
    },
    entities::budget_category,
    errors::Result,
};
use sea_orm::ConnectionTrait;
use tracing::debug;

/// Ready-to-assign figures for one account in one budget period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyToAssign {
    pub account_id: i64,
    pub budget_id: i64,
    pub balance: i64,
    /// Sum of available money in the account's expense and savings envelopes
    pub assigned: i64,
    /// Negative when envelopes hold more than the account has
    pub ready_to_assign: i64,
}

impl ReadyToAssign {
    pub const fn is_over_assigned(&self) -> bool {
        self.ready_to_assign < 0
    }
}

/// Sums the available money of envelopes that hold assigned money.
/// Income categories are skipped.
pub fn assigned_total<'a>(categories: impl IntoIterator<Item = &'a budget_category::Model>) -> i64 {
    categories
        .into_iter()
        .filter(|c| c.category_type.holds_assigned_money())
        .map(|c| c.available_amount)
        .sum()
}

/// Computes ready-to-assign for an account within a budget period.
///
/// # Errors
/// Returns `NotFound` if the account or budget does not exist.
pub async fn ready_to_assign<C>(db: &C, account_id: i64, budget_id: i64) -> Result<ReadyToAssign>
where
    C: ConnectionTrait,
{
    let account = require_account(db, account_id).await?;
    require_budget(db, budget_id).await?;

    let categories = get_categories_for_account(db, account_id, budget_id).await?;
    let assigned = assigned_total(&categories);
    let result = ReadyToAssign {
        account_id,
        budget_id,
        balance: account.balance,
        assigned,
        ready_to_assign: account.balance - assigned,
    };

    debug!(
        account_id,
        budget_id,
        ready_to_assign = result.ready_to_assign,
        "Computed ready to assign"
    );
    Ok(result)
}

/// Computes ready-to-assign for every account of an owner, ordered by account name.
pub async fn ready_to_assign_for_owner<C>(
    db: &C,
    owner: &str,
    budget_id: i64,
) -> Result<Vec<ReadyToAssign>>
where
    C: ConnectionTrait,
{
    require_budget(db, budget_id).await?;

    let mut results = Vec::new();
    for account in get_accounts_for_owner(db, owner).await? {
        let categories = get_categories_for_account(db, account.id, budget_id).await?;
        let assigned = assigned_total(&categories);
        results.push(ReadyToAssign {
            account_id: account.id,
            budget_id,
            balance: account.balance,
            assigned,
            ready_to_assign: account.balance - assigned,
        });
    }
    Ok(results)
}
