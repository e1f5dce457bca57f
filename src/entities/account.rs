//! Account entity - A financial account holding a running balance.
//!
//! The `balance` column is an accumulator: it only changes through atomic
//! delta application (see `core::account::apply_balance_delta`), except for an
//! explicit opening-balance edit.

use super::enums::AccountType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the account (the budgeting user)
    pub owner: String,
    /// Display name (e.g., "Everyday Checking")
    pub name: String,
    /// Kind of account
    pub account_type: AccountType,
    /// Current balance in minor currency units (cents), signed
    pub balance: i64,
    /// Whether this account only holds savings-goal envelopes
    pub is_goal_tracking: bool,
    /// Optional bank or institution name
    pub institution: Option<String>,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many source-side transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One account holds many budget categories
    #[sea_orm(has_many = "super::budget_category::Entity")]
    BudgetCategories,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::budget_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
