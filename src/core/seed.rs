//! Seeding accounts and envelopes from settings.

use crate::{
    config::Settings,
    core::{
        account::{NewAccount, create_account, get_account_by_name},
        budget::get_or_create_budget_for_month,
        category::{NewCategory, create_category, get_categories_for_account},
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::collections::HashSet;
use tracing::{info, instrument};

/// What a seeding run created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub budget_id: i64,
    pub accounts_created: usize,
    pub categories_created: usize,
}

/// Creates the configured accounts and their envelopes in the month's budget.
///
/// Accounts are matched by name for the owner and envelopes by name within
/// their account, so running this again only adds what is missing. Existing
/// balances and allocations are left alone.
#[instrument(skip(db, settings), fields(owner = %settings.owner))]
pub async fn seed_from_settings(
    db: &DatabaseConnection,
    settings: &Settings,
    month: NaiveDate,
) -> Result<SeedSummary> {
    let txn = db.begin().await?;

    let budget = get_or_create_budget_for_month(&txn, &settings.owner, month).await?;
    let mut accounts_created = 0;
    let mut categories_created = 0;

    for account_config in &settings.accounts {
        let account = match get_account_by_name(&txn, &settings.owner, &account_config.name).await? {
            Some(existing) => existing,
            None => {
                let mut input = NewAccount::new(
                    &settings.owner,
                    &account_config.name,
                    account_config.account_type,
                )
                .with_opening_balance(account_config.opening_balance);
                if let Some(institution) = &account_config.institution {
                    input = input.with_institution(institution);
                }
                if account_config.is_goal_tracking {
                    input = input.goal_tracking();
                }
                accounts_created += 1;
                create_account(&txn, input).await?
            }
        };

        let existing: HashSet<String> = get_categories_for_account(&txn, account.id, budget.id)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();

        for category_config in &account_config.categories {
            if existing.contains(category_config.name.trim()) {
                continue;
            }
            let mut input = NewCategory::new(
                budget.id,
                account.id,
                &category_config.name,
                category_config.category_type,
            )
            .with_allocation(category_config.allocation);
            if let Some(group) = &category_config.group {
                input = input.in_group(group);
            }
            create_category(&txn, input).await?;
            categories_created += 1;
        }
    }

    txn.commit().await?;

    info!(
        budget_id = budget.id,
        accounts_created, categories_created, "Seeded ledger from settings"
    );
    Ok(SeedSummary {
        budget_id: budget.id,
        accounts_created,
        categories_created,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::parse_settings;
    use crate::core::account::get_accounts_for_owner;
    use crate::core::category::get_categories_for_budget;
    use crate::test_utils::*;

    const SETTINGS: &str = r#"
        owner = "test-owner"

        [[accounts]]
        name = "Checking"
        account_type = "checking"
        opening_balance = 250000
        institution = "First Bank"

        [[accounts.categories]]
        name = "Groceries"
        category_type = "expense"
        group = "Needs"
        allocation = 40000

        [[accounts.categories]]
        name = "Paycheck"
        category_type = "income"

        [[accounts]]
        name = "Goals"
        account_type = "savings"
        is_goal_tracking = true
    "#;

    #[tokio::test]
    async fn test_seed_creates_accounts_and_categories() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = parse_settings(SETTINGS)?;

        let summary = seed_from_settings(&db, &settings, test_date()).await?;

        assert_eq!(summary.accounts_created, 2);
        assert_eq!(summary.categories_created, 2);

        let accounts = get_accounts_for_owner(&db, TEST_OWNER).await?;
        let checking = accounts.iter().find(|a| a.name == "Checking").unwrap();
        assert_eq!(checking.balance, 250_000);
        assert_eq!(checking.institution.as_deref(), Some("First Bank"));
        assert!(accounts.iter().any(|a| a.name == "Goals" && a.is_goal_tracking));

        let categories = get_categories_for_budget(&db, summary.budget_id).await?;
        let groceries = categories.iter().find(|c| c.name == "Groceries").unwrap();
        assert_eq!(groceries.available_amount, 40_000);
        assert_eq!(groceries.category_group.as_deref(), Some("Needs"));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = parse_settings(SETTINGS)?;

        let first = seed_from_settings(&db, &settings, test_date()).await?;
        let second = seed_from_settings(&db, &settings, test_date()).await?;

        assert_eq!(second.budget_id, first.budget_id);
        assert_eq!(second.accounts_created, 0);
        assert_eq!(second.categories_created, 0);
        assert_eq!(get_categories_for_budget(&db, first.budget_id).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_empty_settings_only_creates_budget() -> Result<()> {
        let db = setup_test_db().await?;

        let summary = seed_from_settings(&db, &Settings::default(), test_date()).await?;

        assert_eq!(summary.accounts_created, 0);
        assert_eq!(summary.categories_created, 0);
        Ok(())
    }
}
