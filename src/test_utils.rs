//! Shared test utilities for `envelope_ledger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        account::{NewAccount, create_account, require_account},
        budget::create_budget,
        category::{NewCategory, create_category},
        transaction::{NewTransaction, create_transaction},
    },
    entities::{self, AccountType, CategoryType},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Owner used by every fixture
pub const TEST_OWNER: &str = "test-owner";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all store-backed tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A fixed date inside the fixture budget's month (2024-01-15).
#[allow(clippy::unwrap_used)]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// Creates a checking account for [`TEST_OWNER`] with the given opening balance.
pub async fn create_test_account(
    db: &DatabaseConnection,
    name: &str,
    balance: i64,
) -> Result<entities::account::Model> {
    create_account(
        db,
        NewAccount::new(TEST_OWNER, name, AccountType::Checking).with_opening_balance(balance),
    )
    .await
}

/// Creates the January 2024 budget for [`TEST_OWNER`].
pub async fn create_test_budget(db: &DatabaseConnection) -> Result<entities::budget::Model> {
    create_budget(db, TEST_OWNER, test_date()).await
}

/// Creates an expense category with the given allocation.
pub async fn create_test_category(
    db: &DatabaseConnection,
    budget_id: i64,
    account_id: i64,
    name: &str,
    allocation: i64,
) -> Result<entities::budget_category::Model> {
    create_category(
        db,
        NewCategory::new(budget_id, account_id, name, CategoryType::Expense)
            .with_allocation(allocation),
    )
    .await
}

/// Creates an expense transaction dated [`test_date`].
pub async fn create_test_expense(
    db: &DatabaseConnection,
    account_id: i64,
    category_id: Option<i64>,
    amount: i64,
) -> Result<entities::transaction::Model> {
    let mut input = NewTransaction::expense(account_id, amount, test_date())
        .with_description("Test expense");
    input.category_id = category_id;
    create_transaction(db, input).await
}

/// Current balance of an account.
pub async fn account_balance(db: &DatabaseConnection, account_id: i64) -> Result<i64> {
    Ok(require_account(db, account_id).await?.balance)
}

/// Entities created by [`setup_with_category`]
pub struct CategoryFixture {
    pub account: entities::account::Model,
    pub budget: entities::budget::Model,
    pub category: entities::budget_category::Model,
}

/// Sets up a complete test environment with one envelope.
///
/// # Defaults
/// * account: "Checking", balance 10000
/// * budget: January 2024
/// * category: "Groceries" (expense, group "Needs"), allocated and available 5000
pub async fn setup_with_category() -> Result<(DatabaseConnection, CategoryFixture)> {
    let db = setup_test_db().await?;
    let account = create_test_account(&db, "Checking", 10_000).await?;
    let budget = create_test_budget(&db).await?;
    let category = create_category(
        &db,
        NewCategory::new(budget.id, account.id, "Groceries", CategoryType::Expense)
            .with_allocation(5_000)
            .in_group("Needs"),
    )
    .await?;
    Ok((
        db,
        CategoryFixture {
            account,
            budget,
            category,
        },
    ))
}
