//! Transaction ledger - Creates, edits and deletes transactions while keeping
//! account balances and envelope amounts consistent.
//!
//! Every operation runs in one database transaction:
//! - create: insert the row, then apply its effect
//! - update: reverse the old effect, persist the new fields, apply the new effect
//! - delete: reverse the effect, then delete the row
//! - batch delete: net all reversals per account and per category, delete the
//!   rows in one statement, then apply one update per distinct entity
//!
//! A failure at any step drops the uncommitted database transaction, so a
//! half-reversed edit is never visible.

use crate::{
    core::{
        account::require_account,
        category::require_category,
        effect::{LedgerEffect, NetDeltas, apply_effect, apply_net},
    },
    entities::{Transaction, TransactionType, transaction},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Account whose balance moves
    pub account_id: i64,
    /// Envelope charged; only expenses touch it
    pub category_id: Option<i64>,
    /// Positive magnitude in cents
    pub amount: i64,
    pub transaction_type: TransactionType,
    /// Calendar date the money moved
    pub date: NaiveDate,
    /// Free-form memo, may be empty
    pub description: String,
    /// Subscription this charge was generated from, if any
    pub subscription_id: Option<i64>,
    /// Destination account; transfers only
    pub counterpart_account_id: Option<i64>,
}

impl NewTransaction {
    pub fn new(
        account_id: i64,
        amount: i64,
        transaction_type: TransactionType,
        date: NaiveDate,
    ) -> Self {
        Self {
            account_id,
            category_id: None,
            amount,
            transaction_type,
            date,
            description: String::new(),
            subscription_id: None,
            counterpart_account_id: None,
        }
    }

    pub fn expense(account_id: i64, amount: i64, date: NaiveDate) -> Self {
        Self::new(account_id, amount, TransactionType::Expense, date)
    }

    pub fn income(account_id: i64, amount: i64, date: NaiveDate) -> Self {
        Self::new(account_id, amount, TransactionType::Income, date)
    }

    #[must_use]
    pub const fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn from_subscription(mut self, subscription_id: i64) -> Self {
        self.subscription_id = Some(subscription_id);
        self
    }
}

/// Partial update of a transaction. `None` leaves a field unchanged; for
/// optional fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub account_id: Option<i64>,
    pub category_id: Option<Option<i64>>,
    pub amount: Option<i64>,
    pub transaction_type: Option<TransactionType>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub subscription_id: Option<Option<i64>>,
    pub counterpart_account_id: Option<Option<i64>>,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only rows booked against this account
    pub account_id: Option<i64>,
    /// Only rows charged to this envelope
    pub category_id: Option<i64>,
    pub transaction_type: Option<TransactionType>,
    /// Inclusive lower date bound
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub end_date: Option<NaiveDate>,
    /// Maximum number of rows, newest first
    pub limit: Option<u64>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn account(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub const fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub const fn of_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    /// Inclusive date range
    #[must_use]
    pub const fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Outcome of [`delete_transactions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchDeleteSummary {
    pub deleted: u64,
    pub accounts_updated: usize,
    pub categories_updated: usize,
}

fn validate_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn validate_counterpart(
    transaction_type: TransactionType,
    account_id: i64,
    counterpart_account_id: Option<i64>,
) -> Result<()> {
    match counterpart_account_id {
        Some(_) if transaction_type != TransactionType::Transfer => Err(Error::validation(
            "Only transfers can have a counterpart account",
        )),
        Some(counterpart) if counterpart == account_id => Err(Error::validation(
            "Cannot transfer to the same account",
        )),
        _ => Ok(()),
    }
}

/// Creates a transaction and applies its effect.
///
/// Income adds to the account balance; expenses and transfers subtract from
/// it. A categorized expense also adds to the category's spending and takes
/// the same amount out of its available money. Transfers
/// with a counterpart credit the counterpart account.
///
/// # Errors
/// Returns an error if:
/// - The amount is not positive
/// - A counterpart is set on a non-transfer or equals the account
/// - The account, category or counterpart does not exist
/// - Any store call fails (nothing is committed in that case)
#[instrument(skip(db))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    input: NewTransaction,
) -> Result<transaction::Model> {
    validate_amount(input.amount)?;
    validate_counterpart(
        input.transaction_type,
        input.account_id,
        input.counterpart_account_id,
    )?;

    let txn = db.begin().await?;
    let created = insert_with_effect(&txn, input).await?;
    txn.commit().await?;

    info!(
        transaction_id = created.id,
        account_id = created.account_id,
        amount = created.amount,
        kind = ?created.transaction_type,
        "Created transaction"
    );
    Ok(created)
}

/// Inserts an already validated transaction and applies its effect.
pub(crate) async fn insert_with_effect<C>(db: &C, input: NewTransaction) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    require_references(
        db,
        input.account_id,
        input.category_id,
        input.counterpart_account_id,
    )
    .await?;

    let created = transaction::ActiveModel {
        account_id: Set(input.account_id),
        category_id: Set(input.category_id),
        amount: Set(input.amount),
        transaction_type: Set(input.transaction_type),
        date: Set(input.date),
        description: Set(input.description.trim().to_string()),
        subscription_id: Set(input.subscription_id),
        counterpart_account_id: Set(input.counterpart_account_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    apply_effect(db, &LedgerEffect::of(&created)).await?;
    Ok(created)
}

async fn require_references<C>(
    db: &C,
    account_id: i64,
    category_id: Option<i64>,
    counterpart_account_id: Option<i64>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    require_account(db, account_id).await?;
    if let Some(category_id) = category_id {
        require_category(db, category_id).await?;
    }
    if let Some(counterpart) = counterpart_account_id {
        require_account(db, counterpart).await?;
    }
    Ok(())
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id<C>(db: &C, transaction_id: i64) -> Result<Option<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_transaction_by_id`] but a missing transaction is an error.
pub async fn require_transaction<C>(db: &C, transaction_id: i64) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or_else(|| Error::transaction_not_found(transaction_id))
}

/// Lists transactions matching a filter, newest date first.
pub async fn get_transactions<C>(db: &C, filter: TransactionFilter) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Transaction::find();

    if let Some(account_id) = filter.account_id {
        query = query.filter(transaction::Column::AccountId.eq(account_id));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(transaction::Column::CategoryId.eq(category_id));
    }
    if let Some(transaction_type) = filter.transaction_type {
        query = query.filter(transaction::Column::TransactionType.eq(transaction_type));
    }
    if let Some(start) = filter.start_date {
        query = query.filter(transaction::Column::Date.gte(start));
    }
    if let Some(end) = filter.end_date {
        query = query.filter(transaction::Column::Date.lte(end));
    }

    query = query
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id);
    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }

    let transactions = query.all(db).await?;
    debug!(count = transactions.len(), "Listed transactions");
    Ok(transactions)
}

/// Edits a transaction in place, keeping the ledger consistent.
///
/// The old effect is reversed before any field changes and the new effect is
/// applied from the updated row, so changing the account, category, amount or
/// type behaves like delete-old plus create-new for accounting purposes.
/// Switching a transfer to another type drops its counterpart unless one is
/// given explicitly.
#[instrument(skip(db))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    updates: TransactionUpdate,
) -> Result<transaction::Model> {
    if let Some(amount) = updates.amount {
        validate_amount(amount)?;
    }

    let txn = db.begin().await?;

    let old = require_transaction(&txn, transaction_id).await?;

    let account_id = updates.account_id.unwrap_or(old.account_id);
    let category_id = updates.category_id.unwrap_or(old.category_id);
    let amount = updates.amount.unwrap_or(old.amount);
    let transaction_type = updates.transaction_type.unwrap_or(old.transaction_type);
    let counterpart_account_id = match updates.counterpart_account_id {
        Some(counterpart) => counterpart,
        None if transaction_type == TransactionType::Transfer => old.counterpart_account_id,
        None => None,
    };
    validate_counterpart(transaction_type, account_id, counterpart_account_id)?;
    require_references(&txn, account_id, category_id, counterpart_account_id).await?;

    // Reverse before persisting: the old row is the only record of what to undo
    apply_effect(&txn, &LedgerEffect::of(&old).reversed()).await?;

    let mut active: transaction::ActiveModel = old.clone().into();
    active.account_id = Set(account_id);
    active.category_id = Set(category_id);
    active.amount = Set(amount);
    active.transaction_type = Set(transaction_type);
    active.date = Set(updates.date.unwrap_or(old.date));
    active.description = Set(updates
        .description
        .map_or(old.description, |d| d.trim().to_string()));
    active.subscription_id = Set(updates.subscription_id.unwrap_or(old.subscription_id));
    active.counterpart_account_id = Set(counterpart_account_id);
    let updated = active.update(&txn).await?;

    apply_effect(&txn, &LedgerEffect::of(&updated)).await?;

    txn.commit().await?;

    info!(
        transaction_id,
        old_amount = old.amount,
        new_amount = updated.amount,
        "Updated transaction"
    );
    Ok(updated)
}

/// Deletes a transaction and reverses its effect.
#[instrument(skip(db))]
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = require_transaction(&txn, transaction_id).await?;
    remove_with_reversal(&txn, existing).await?;
    txn.commit().await?;

    info!(transaction_id, "Deleted transaction");
    Ok(())
}

pub(crate) async fn remove_with_reversal<C>(db: &C, existing: transaction::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    apply_effect(db, &LedgerEffect::of(&existing).reversed()).await?;
    existing.delete(db).await?;
    Ok(())
}

/// Deletes several transactions at once.
///
/// Reversals are netted per account and per category first, the rows are
/// deleted with one statement, and then exactly one balance update per
/// distinct account and one envelope update per distinct category is issued.
/// The final state equals deleting the transactions one by one.
///
/// # Errors
/// Returns a validation error for an empty list and `NotFound` if any ID is
/// unknown; nothing is changed in either case.
#[instrument(skip(db))]
pub async fn delete_transactions(
    db: &DatabaseConnection,
    transaction_ids: &[i64],
) -> Result<BatchDeleteSummary> {
    if transaction_ids.is_empty() {
        return Err(Error::validation("No transactions to delete"));
    }
    let ids: BTreeSet<i64> = transaction_ids.iter().copied().collect();

    let txn = db.begin().await?;

    let rows = Transaction::find()
        .filter(transaction::Column::Id.is_in(ids.iter().copied()))
        .all(&txn)
        .await?;
    if rows.len() != ids.len() {
        let found: BTreeSet<i64> = rows.iter().map(|t| t.id).collect();
        if let Some(&missing) = ids.difference(&found).next() {
            return Err(Error::transaction_not_found(missing));
        }
    }

    let reversals: Vec<LedgerEffect> = rows
        .iter()
        .map(|t| LedgerEffect::of(t).reversed())
        .collect();
    let net: NetDeltas = reversals.iter().collect();

    let deleted = Transaction::delete_many()
        .filter(transaction::Column::Id.is_in(ids.iter().copied()))
        .exec(&txn)
        .await?
        .rows_affected;

    let (accounts_updated, categories_updated) = apply_net(&txn, &net).await?;

    txn.commit().await?;

    info!(
        deleted,
        accounts_updated, categories_updated, "Deleted transaction batch"
    );
    Ok(BatchDeleteSummary {
        deleted,
        accounts_updated,
        categories_updated,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::account::create_account;
    use crate::core::account::NewAccount;
    use crate::core::category::{create_category, NewCategory};
    use crate::entities::{AccountType, CategoryType};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let zero = NewTransaction::expense(1, 0, test_date());
        assert!(matches!(
            create_transaction(&db, zero).await.unwrap_err(),
            Error::InvalidAmount { amount: 0 }
        ));

        let negative = NewTransaction::income(1, -10, test_date());
        assert!(matches!(
            create_transaction(&db, negative).await.unwrap_err(),
            Error::InvalidAmount { amount: -10 }
        ));

        let mut misplaced_counterpart = NewTransaction::expense(1, 10, test_date());
        misplaced_counterpart.counterpart_account_id = Some(2);
        assert!(create_transaction(&db, misplaced_counterpart).await.unwrap_err().is_validation());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_updates_balance_and_spending() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;

        let created = create_transaction(
            &db,
            NewTransaction::expense(fixture.account.id, 2_500, test_date())
                .in_category(fixture.category.id)
                .with_description("  Weekly shop "),
        )
        .await?;

        assert_eq!(created.description, "Weekly shop");
        assert_eq!(account_balance(&db, fixture.account.id).await?, 7_500);
        let category = require_category(&db, fixture.category.id).await?;
        assert_eq!(category.spent_amount, 2_500);
        assert_eq!(category.available_amount, 2_500);
        assert_eq!(category.allocated_amount, 5_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_income_never_touches_category() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;

        create_transaction(
            &db,
            NewTransaction::income(fixture.account.id, 3_000, test_date()).in_category(fixture.category.id),
        )
        .await?;

        assert_eq!(account_balance(&db, fixture.account.id).await?, 13_000);
        let category = require_category(&db, fixture.category.id).await?;
        assert_eq!((category.spent_amount, category.available_amount), (0, 5_000));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_with_unknown_references() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;

        let err = create_transaction(&db, NewTransaction::expense(999, 100, test_date()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = create_transaction(
            &db,
            NewTransaction::expense(fixture.account.id, 100, test_date()).in_category(999),
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());

        // Nothing was applied
        assert_eq!(account_balance(&db, fixture.account.id).await?, 10_000);
        assert!(get_transactions(&db, TransactionFilter::new()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_amount_reverses_then_applies() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let expense =
            create_test_expense(&db, fixture.account.id, Some(fixture.category.id), 2_500).await?;

        let updated = update_transaction(
            &db,
            expense.id,
            TransactionUpdate {
                amount: Some(4_000),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.amount, 4_000);
        assert_eq!(account_balance(&db, fixture.account.id).await?, 6_000);
        let category = require_category(&db, fixture.category.id).await?;
        assert_eq!(category.spent_amount, 4_000);
        assert_eq!(category.available_amount, 1_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_moves_between_accounts_and_categories() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let savings = create_test_account(&db, "Savings", 20_000).await?;
        let dining = create_category(
            &db,
            NewCategory::new(fixture.budget.id, savings.id, "Dining", CategoryType::Expense)
                .with_allocation(3_000),
        )
        .await?;
        let expense =
            create_test_expense(&db, fixture.account.id, Some(fixture.category.id), 1_000).await?;

        update_transaction(
            &db,
            expense.id,
            TransactionUpdate {
                account_id: Some(savings.id),
                category_id: Some(Some(dining.id)),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(account_balance(&db, fixture.account.id).await?, 10_000);
        assert_eq!(account_balance(&db, savings.id).await?, 19_000);
        let groceries = require_category(&db, fixture.category.id).await?;
        assert_eq!((groceries.spent_amount, groceries.available_amount), (0, 5_000));
        let dining = require_category(&db, dining.id).await?;
        assert_eq!((dining.spent_amount, dining.available_amount), (1_000, 2_000));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_type_from_expense_to_income() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let expense =
            create_test_expense(&db, fixture.account.id, Some(fixture.category.id), 800).await?;

        update_transaction(
            &db,
            expense.id,
            TransactionUpdate {
                transaction_type: Some(TransactionType::Income),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(account_balance(&db, fixture.account.id).await?, 10_800);
        let category = require_category(&db, fixture.category.id).await?;
        assert_eq!((category.spent_amount, category.available_amount), (0, 5_000));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_clearing_category() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let expense =
            create_test_expense(&db, fixture.account.id, Some(fixture.category.id), 800).await?;

        let updated = update_transaction(
            &db,
            expense.id,
            TransactionUpdate {
                category_id: Some(None),
                description: Some("Uncategorized".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.category_id, None);
        assert_eq!(updated.description, "Uncategorized");
        assert_eq!(account_balance(&db, fixture.account.id).await?, 9_200);
        let category = require_category(&db, fixture.category.id).await?;
        assert_eq!((category.spent_amount, category.available_amount), (0, 5_000));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_failure_leaves_ledger_untouched() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let expense =
            create_test_expense(&db, fixture.account.id, Some(fixture.category.id), 800).await?;

        let err = update_transaction(
            &db,
            expense.id,
            TransactionUpdate {
                account_id: Some(999),
                amount: Some(100),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(require_transaction(&db, expense.id).await?, expense);
        assert_eq!(account_balance(&db, fixture.account.id).await?, 9_200);
        let category = require_category(&db, fixture.category.id).await?;
        assert_eq!((category.spent_amount, category.available_amount), (800, 4_200));

        let err = update_transaction(
            &db,
            expense.id,
            TransactionUpdate {
                amount: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_validation());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_reverses_effect() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let expense =
            create_test_expense(&db, fixture.account.id, Some(fixture.category.id), 2_500).await?;

        delete_transaction(&db, expense.id).await?;

        assert!(get_transaction_by_id(&db, expense.id).await?.is_none());
        assert_eq!(account_balance(&db, fixture.account.id).await?, 10_000);
        let category = require_category(&db, fixture.category.id).await?;
        assert_eq!((category.spent_amount, category.available_amount), (0, 5_000));

        assert!(delete_transaction(&db, expense.id).await.unwrap_err().is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_then_recreate_restores_state() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let input = NewTransaction::expense(fixture.account.id, 1_750, test_date())
            .in_category(fixture.category.id);
        let expense = create_transaction(&db, input.clone()).await?;
        let balance_before = account_balance(&db, fixture.account.id).await?;
        let category_before = require_category(&db, fixture.category.id).await?;

        delete_transaction(&db, expense.id).await?;
        create_transaction(&db, input).await?;

        assert_eq!(account_balance(&db, fixture.account.id).await?, balance_before);
        assert_eq!(require_category(&db, fixture.category.id).await?, category_before);
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_delete_matches_sequential_delete() -> Result<()> {
        let (db_batch, batch) = setup_with_category().await?;
        let (db_seq, seq) = setup_with_category().await?;

        let mut batch_ids = Vec::new();
        let mut seq_ids = Vec::new();
        for amount in [1_200, 300] {
            batch_ids.push(create_test_expense(&db_batch, batch.account.id, Some(batch.category.id), amount).await?.id);
            seq_ids.push(create_test_expense(&db_seq, seq.account.id, Some(seq.category.id), amount).await?.id);
        }

        let summary = delete_transactions(&db_batch, &batch_ids).await?;
        for id in seq_ids {
            delete_transaction(&db_seq, id).await?;
        }

        assert_eq!(
            summary,
            BatchDeleteSummary {
                deleted: 2,
                accounts_updated: 1,
                categories_updated: 1,
            }
        );
        assert_eq!(
            account_balance(&db_batch, batch.account.id).await?,
            account_balance(&db_seq, seq.account.id).await?
        );
        let batched = require_category(&db_batch, batch.category.id).await?;
        let sequential = require_category(&db_seq, seq.category.id).await?;
        assert_eq!(
            (batched.spent_amount, batched.available_amount),
            (sequential.spent_amount, sequential.available_amount)
        );
        assert_eq!(batched.available_amount, 5_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_delete_nets_mixed_types_and_accounts() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let other = create_account(
            &db,
            NewAccount::new(TEST_OWNER, "Card", AccountType::CreditCard),
        )
        .await?;

        let a = create_test_expense(&db, fixture.account.id, Some(fixture.category.id), 900).await?;
        let b = create_transaction(&db, NewTransaction::income(fixture.account.id, 900, test_date())).await?;
        let c = create_test_expense(&db, other.id, Some(fixture.category.id), 400).await?;
        let kept = create_test_expense(&db, fixture.account.id, None, 50).await?;

        // Duplicates collapse
        let summary = delete_transactions(&db, &[a.id, b.id, c.id, a.id]).await?;

        assert_eq!(summary.deleted, 3);
        // The expense and income on the first account cancel out
        assert_eq!(summary.accounts_updated, 1);
        assert_eq!(account_balance(&db, fixture.account.id).await?, 10_000 - 50);
        assert_eq!(account_balance(&db, other.id).await?, 0);
        let category = require_category(&db, fixture.category.id).await?;
        assert_eq!((category.spent_amount, category.available_amount), (0, 5_000));
        assert!(get_transaction_by_id(&db, kept.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_delete_unknown_id_changes_nothing() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let expense =
            create_test_expense(&db, fixture.account.id, Some(fixture.category.id), 900).await?;

        let err = delete_transactions(&db, &[expense.id, 4242]).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "Transaction", ref id } if id == "4242"));
        assert!(get_transaction_by_id(&db, expense.id).await?.is_some());
        assert_eq!(account_balance(&db, fixture.account.id).await?, 9_100);

        assert!(delete_transactions(&db, &[]).await.unwrap_err().is_validation());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_transactions_filters_and_orders() -> Result<()> {
        let (db, fixture) = setup_with_category().await?;
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();

        let early = create_transaction(
            &db,
            NewTransaction::expense(fixture.account.id, 100, day(3)).in_category(fixture.category.id),
        )
        .await?;
        let late = create_transaction(
            &db,
            NewTransaction::expense(fixture.account.id, 200, day(20)).in_category(fixture.category.id),
        )
        .await?;
        let income = create_transaction(&db, NewTransaction::income(fixture.account.id, 5_000, day(15))).await?;

        let all = get_transactions(&db, TransactionFilter::new().account(fixture.account.id)).await?;
        assert_eq!(all, vec![late.clone(), income.clone(), early.clone()]);

        let categorized = get_transactions(&db, TransactionFilter::new().category(fixture.category.id)).await?;
        assert_eq!(categorized.len(), 2);

        let incomes = get_transactions(&db, TransactionFilter::new().of_type(TransactionType::Income)).await?;
        assert_eq!(incomes, vec![income]);

        let ranged = get_transactions(&db, TransactionFilter::new().date_range(day(1), day(10))).await?;
        assert_eq!(ranged, vec![early]);

        let limited = get_transactions(&db, TransactionFilter::new().limit(1)).await?;
        assert_eq!(limited, vec![late]);
        Ok(())
    }
}
