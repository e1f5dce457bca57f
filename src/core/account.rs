//! Account store - Owns account rows and their running balance.
//!
//! Balances are accumulators. Every ledger effect reaches an account through
//! [`apply_balance_delta`], which issues a single
//! `UPDATE accounts SET balance = balance + ? WHERE id = ?` so concurrent
//! writers never lose each other's deltas.

use crate::{
    entities::{Account, AccountType, BudgetCategory, Goal, Transaction, account, budget_category, goal, transaction},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{Condition, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub owner: String,
    pub name: String,
    pub account_type: AccountType,
    /// Starting balance in cents
    pub opening_balance: i64,
    pub is_goal_tracking: bool,
    pub institution: Option<String>,
}

impl NewAccount {
    /// A regular (non goal-tracking) account with a zero opening balance.
    pub fn new(owner: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            account_type,
            opening_balance: 0,
            is_goal_tracking: false,
            institution: None,
        }
    }

    #[must_use]
    pub const fn with_opening_balance(mut self, balance: i64) -> Self {
        self.opening_balance = balance;
        self
    }

    #[must_use]
    pub const fn goal_tracking(mut self) -> Self {
        self.is_goal_tracking = true;
        self
    }

    #[must_use]
    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }
}

/// Creates a new account with its opening balance.
///
/// # Errors
/// Returns an error if the owner or name is blank, or the insert fails.
#[instrument(skip(db))]
pub async fn create_account<C>(db: &C, input: NewAccount) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    if input.owner.trim().is_empty() {
        return Err(Error::validation("Account owner cannot be empty"));
    }
    if input.name.trim().is_empty() {
        return Err(Error::validation("Account name cannot be empty"));
    }

    let account = account::ActiveModel {
        owner: Set(input.owner.trim().to_string()),
        name: Set(input.name.trim().to_string()),
        account_type: Set(input.account_type),
        balance: Set(input.opening_balance),
        is_goal_tracking: Set(input.is_goal_tracking),
        institution: Set(input.institution.map(|i| i.trim().to_string())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = account.insert(db).await?;
    info!(
        account_id = created.id,
        balance = created.balance,
        "Created account"
    );
    Ok(created)
}

/// Finds an account by its unique ID.
pub async fn get_account_by_id<C>(db: &C, account_id: i64) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_account_by_id`] but a missing account is an error.
pub async fn require_account<C>(db: &C, account_id: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    get_account_by_id(db, account_id)
        .await?
        .ok_or_else(|| Error::account_not_found(account_id))
}

/// All accounts of an owner, ordered by name.
pub async fn get_accounts_for_owner<C>(db: &C, owner: &str) -> Result<Vec<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find()
        .filter(account::Column::Owner.eq(owner))
        .order_by_asc(account::Column::Name)
        .order_by_asc(account::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an owner's account by exact name.
pub async fn get_account_by_name<C>(
    db: &C,
    owner: &str,
    name: &str,
) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find()
        .filter(account::Column::Owner.eq(owner))
        .filter(account::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// The owner's oldest goal-tracking account, if any.
pub async fn get_goal_tracking_account<C>(db: &C, owner: &str) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find()
        .filter(account::Column::Owner.eq(owner))
        .filter(account::Column::IsGoalTracking.eq(true))
        .order_by_asc(account::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Atomically adds `delta` (negative to subtract) to an account balance.
///
/// Performs `UPDATE accounts SET balance = balance + delta WHERE id = ?` and
/// returns the updated row.
///
/// # Errors
/// Returns `NotFound` if no account has this ID.
pub async fn apply_balance_delta<C>(db: &C, account_id: i64, delta: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let result = Account::update_many()
        .col_expr(
            account::Column::Balance,
            Expr::col(account::Column::Balance).add(delta),
        )
        .filter(account::Column::Id.eq(account_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::account_not_found(account_id));
    }

    debug!(account_id, delta, "Applied balance delta");
    require_account(db, account_id).await
}

/// Replaces an account balance wholesale.
///
/// This is the explicit opening-balance edit; ledger effects must go through
/// [`apply_balance_delta`] instead.
#[instrument(skip(db))]
pub async fn set_opening_balance<C>(db: &C, account_id: i64, balance: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let account = require_account(db, account_id).await?;
    let mut active: account::ActiveModel = account.into();
    active.balance = Set(balance);
    let updated = active.update(db).await?;
    info!(account_id, balance, "Opening balance overwritten");
    Ok(updated)
}

/// Renames an account.
pub async fn rename_account<C>(db: &C, account_id: i64, new_name: &str) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    if new_name.trim().is_empty() {
        return Err(Error::validation("Account name cannot be empty"));
    }

    let account = require_account(db, account_id).await?;
    let mut active: account::ActiveModel = account.into();
    active.name = Set(new_name.trim().to_string());
    active.update(db).await.map_err(Into::into)
}

/// Deletes an account together with its envelopes and their goals.
///
/// Accounts still referenced by transactions (on either side of a transfer)
/// cannot be deleted; those transactions must be removed first so no balance
/// history points at a missing account.
#[instrument(skip(db))]
pub async fn delete_account(db: &DatabaseConnection, account_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    require_account(&txn, account_id).await?;

    let referencing = Transaction::find()
        .filter(
            Condition::any()
                .add(transaction::Column::AccountId.eq(account_id))
                .add(transaction::Column::CounterpartAccountId.eq(account_id)),
        )
        .count(&txn)
        .await?;
    if referencing > 0 {
        return Err(Error::validation(format!(
            "Account {account_id} still has {referencing} transactions"
        )));
    }

    let category_ids: Vec<i64> = BudgetCategory::find()
        .filter(budget_category::Column::AccountId.eq(account_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    if !category_ids.is_empty() {
        Goal::delete_many()
            .filter(goal::Column::CategoryId.is_in(category_ids.clone()))
            .exec(&txn)
            .await?;
        BudgetCategory::delete_many()
            .filter(budget_category::Column::Id.is_in(category_ids))
            .exec(&txn)
            .await?;
    }

    Account::delete_by_id(account_id).exec(&txn).await?;
    txn.commit().await?;

    info!(account_id, "Deleted account");
    Ok(())
}
