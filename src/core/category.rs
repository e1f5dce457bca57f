//! Envelope store - Owns budget categories and their three amounts.
//!
//! `spent_amount` and `available_amount` are accumulators updated with atomic
//! `col = col + delta` statements, the same way account balances are. Only
//! [`set_allocation`] reads before writing, and it does so inside a database
//! transaction.

use crate::{
    core::{account::require_account, budget::require_budget},
    entities::{BudgetCategory, CategoryType, Goal, Transaction, budget_category, goal, transaction},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, Value, prelude::*};
use std::collections::HashSet;
use std::ops::AddAssign;
use tracing::{debug, info, instrument};

/// Input for creating a new budget category
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub budget_id: i64,
    pub account_id: i64,
    pub name: String,
    pub category_type: CategoryType,
    pub category_group: Option<String>,
    /// Planned amount in cents; also the envelope's starting funding
    pub allocated_amount: i64,
}

impl NewCategory {
    pub fn new(
        budget_id: i64,
        account_id: i64,
        name: impl Into<String>,
        category_type: CategoryType,
    ) -> Self {
        Self {
            budget_id,
            account_id,
            name: name.into(),
            category_type,
            category_group: None,
            allocated_amount: 0,
        }
    }

    #[must_use]
    pub const fn with_allocation(mut self, allocated_amount: i64) -> Self {
        self.allocated_amount = allocated_amount;
        self
    }

    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.category_group = Some(group.into());
        self
    }
}

/// Creates a new category. Its available amount starts at the allocation.
///
/// # Errors
/// Returns an error if:
/// - The name is blank or the allocation is negative
/// - The budget or account does not exist
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_category<C>(db: &C, input: NewCategory) -> Result<budget_category::Model>
where
    C: ConnectionTrait,
{
    if input.name.trim().is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }
    if input.allocated_amount < 0 {
        return Err(Error::validation(format!(
            "Allocation cannot be negative: {}",
            input.allocated_amount
        )));
    }

    require_budget(db, input.budget_id).await?;
    require_account(db, input.account_id).await?;

    let created = budget_category::ActiveModel {
        budget_id: Set(input.budget_id),
        account_id: Set(input.account_id),
        name: Set(input.name.trim().to_string()),
        category_type: Set(input.category_type),
        category_group: Set(input.category_group),
        allocated_amount: Set(input.allocated_amount),
        spent_amount: Set(0),
        available_amount: Set(input.allocated_amount),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        category_id = created.id,
        account_id = created.account_id,
        allocated = created.allocated_amount,
        "Created category"
    );
    Ok(created)
}

/// Finds a category by its unique ID.
pub async fn get_category_by_id<C>(db: &C, category_id: i64) -> Result<Option<budget_category::Model>>
where
    C: ConnectionTrait,
{
    BudgetCategory::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_category_by_id`] but a missing category is an error.
pub async fn require_category<C>(db: &C, category_id: i64) -> Result<budget_category::Model>
where
    C: ConnectionTrait,
{
    get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::category_not_found(category_id))
}

/// Every category of a budget, grouped then alphabetical.
pub async fn get_categories_for_budget<C>(db: &C, budget_id: i64) -> Result<Vec<budget_category::Model>>
where
    C: ConnectionTrait,
{
    BudgetCategory::find()
        .filter(budget_category::Column::BudgetId.eq(budget_id))
        .order_by_asc(budget_category::Column::CategoryGroup)
        .order_by_asc(budget_category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The categories one account backs within one budget.
pub async fn get_categories_for_account<C>(
    db: &C,
    account_id: i64,
    budget_id: i64,
) -> Result<Vec<budget_category::Model>>
where
    C: ConnectionTrait,
{
    BudgetCategory::find()
        .filter(budget_category::Column::AccountId.eq(account_id))
        .filter(budget_category::Column::BudgetId.eq(budget_id))
        .order_by_asc(budget_category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes a category's planned amount.
///
/// The available amount moves by the same delta as the allocation, so money
/// already moved in or out of the envelope is preserved. Lowering the
/// allocation by more than the envelope still holds is rejected with
/// `InsufficientFunds`.
#[instrument(skip(db))]
pub async fn set_allocation(
    db: &DatabaseConnection,
    category_id: i64,
    new_allocated: i64,
) -> Result<budget_category::Model> {
    if new_allocated < 0 {
        return Err(Error::validation(format!(
            "Allocation cannot be negative: {new_allocated}"
        )));
    }

    let txn = db.begin().await?;
    let category = require_category(&txn, category_id).await?;
    let delta = new_allocated - category.allocated_amount;
    if delta < 0 && category.available_amount + delta < 0 {
        return Err(Error::InsufficientFunds {
            available: category.available_amount,
            required: -delta,
        });
    }

    BudgetCategory::update_many()
        .col_expr(
            budget_category::Column::AllocatedAmount,
            Expr::value(new_allocated),
        )
        .col_expr(
            budget_category::Column::AvailableAmount,
            Expr::col(budget_category::Column::AvailableAmount).add(delta),
        )
        .filter(budget_category::Column::Id.eq(category_id))
        .exec(&txn)
        .await?;

    let updated = require_category(&txn, category_id).await?;
    txn.commit().await?;

    info!(category_id, new_allocated, delta, "Allocation changed");
    Ok(updated)
}

/// Signed changes to an envelope's spending and funding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryDelta {
    /// Change to `spent_amount`
    pub spent: i64,
    /// Change to `available_amount`
    pub available: i64,
}

impl CategoryDelta {
    /// Spending `amount` from the envelope: spent grows and available shrinks.
    #[must_use]
    pub const fn spending(amount: i64) -> Self {
        Self {
            spent: amount,
            available: -amount,
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            spent: -self.spent,
            available: -self.available,
        }
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.spent == 0 && self.available == 0
    }
}

impl AddAssign for CategoryDelta {
    fn add_assign(&mut self, other: Self) {
        self.spent += other.spent;
        self.available += other.available;
    }
}

/// Atomically applies both halves of a [`CategoryDelta`] in one statement.
pub async fn apply_category_delta<C>(
    db: &C,
    category_id: i64,
    delta: CategoryDelta,
) -> Result<budget_category::Model>
where
    C: ConnectionTrait,
{
    let result = BudgetCategory::update_many()
        .col_expr(
            budget_category::Column::SpentAmount,
            Expr::col(budget_category::Column::SpentAmount).add(delta.spent),
        )
        .col_expr(
            budget_category::Column::AvailableAmount,
            Expr::col(budget_category::Column::AvailableAmount).add(delta.available),
        )
        .filter(budget_category::Column::Id.eq(category_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::category_not_found(category_id));
    }

    debug!(category_id, ?delta, "Applied category delta");
    require_category(db, category_id).await
}

/// Records `delta` of spending against a category: `spent_amount` grows by
/// `delta` and `available_amount` shrinks by the same amount, atomically.
pub async fn apply_spending_delta<C>(
    db: &C,
    category_id: i64,
    delta: i64,
) -> Result<budget_category::Model>
where
    C: ConnectionTrait,
{
    apply_category_delta(db, category_id, CategoryDelta::spending(delta)).await
}

/// Atomically adds `delta` to a category's `available_amount`.
pub async fn adjust_available<C>(
    db: &C,
    category_id: i64,
    delta: i64,
) -> Result<budget_category::Model>
where
    C: ConnectionTrait,
{
    apply_category_delta(
        db,
        category_id,
        CategoryDelta {
            spent: 0,
            available: delta,
        },
    )
    .await
}

/// Deletes a category.
///
/// Transactions charged to it keep their rows but lose the category
/// reference; the money they spent stays spent. A goal backed by the
/// category is deleted with it.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    delete_category_in(&txn, category_id).await?;
    txn.commit().await?;

    info!(category_id, "Deleted category");
    Ok(())
}

pub(crate) async fn delete_category_in<C>(db: &C, category_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    require_category(db, category_id).await?;

    Transaction::update_many()
        .col_expr(transaction::Column::CategoryId, Expr::value(Value::BigInt(None)))
        .filter(transaction::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?;

    Goal::delete_many()
        .filter(goal::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?;

    BudgetCategory::delete_by_id(category_id).exec(db).await?;
    Ok(())
}

/// Copies a budget's categories into another budget of the same owner.
///
/// Each copy keeps account, name, type, group and allocation, starts fully
/// funded at its allocation and has nothing spent. Categories whose
/// `(account, name)` already exist in the target are skipped. Returns the
/// categories created.
#[instrument(skip(db))]
pub async fn copy_categories_to_budget(
    db: &DatabaseConnection,
    from_budget_id: i64,
    to_budget_id: i64,
) -> Result<Vec<budget_category::Model>> {
    if from_budget_id == to_budget_id {
        return Err(Error::validation("Cannot copy a budget onto itself"));
    }

    let txn = db.begin().await?;

    let from = require_budget(&txn, from_budget_id).await?;
    let to = require_budget(&txn, to_budget_id).await?;
    if from.owner != to.owner {
        return Err(Error::validation("Budgets belong to different owners"));
    }

    let existing: HashSet<(i64, String)> = get_categories_for_budget(&txn, to_budget_id)
        .await?
        .into_iter()
        .map(|c| (c.account_id, c.name))
        .collect();

    let mut created = Vec::new();
    for source in get_categories_for_budget(&txn, from_budget_id).await? {
        if existing.contains(&(source.account_id, source.name.clone())) {
            continue;
        }

        let mut input = NewCategory::new(
            to_budget_id,
            source.account_id,
            source.name,
            source.category_type,
        )
        .with_allocation(source.allocated_amount);
        input.category_group = source.category_group;

        created.push(create_category(&txn, input).await?);
    }

    txn.commit().await?;

    info!(
        from_budget_id,
        to_budget_id,
        copied = created.len(),
        "Copied categories"
    );
    Ok(created)
}
