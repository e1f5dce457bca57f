//! Budget category entity - An envelope inside one account and one budget period.
//!
//! `spent_amount` accumulates categorized expenses. `available_amount` is the
//! envelope's funding: it grows on allocation, transfer-in and goal
//! contributions and shrinks on transfer-out. Spending is tracked separately,
//! so an envelope whose `spent_amount` exceeds `available_amount` is overspent.

use super::enums::CategoryType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Budget period this category belongs to
    pub budget_id: i64,
    /// Account whose cash backs this envelope
    pub account_id: i64,
    /// Human-readable name (e.g., "Groceries")
    pub name: String,
    /// Income, expense or savings
    pub category_type: CategoryType,
    /// Optional grouping label (e.g., "Bills")
    pub category_group: Option<String>,
    /// Planned amount for the period, in cents
    pub allocated_amount: i64,
    /// Sum of expense transactions charged to this category, in cents
    pub spent_amount: i64,
    /// Funding currently held by the envelope, in cents
    pub available_amount: i64,
    /// When the category was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Funding left after spending; negative when overspent.
    #[must_use]
    pub const fn remaining(&self) -> i64 {
        self.available_amount - self.spent_amount
    }

    /// How far spending exceeds funding, or zero.
    #[must_use]
    pub fn overspent_amount(&self) -> i64 {
        (self.spent_amount - self.available_amount).max(0)
    }

    /// Whether spending exceeds funding.
    #[must_use]
    pub fn is_overspent(&self) -> bool {
        self.overspent_amount() > 0
    }
}

/// Defines relationships between `BudgetCategory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category belongs to one budget period
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id",
        on_delete = "Cascade"
    )]
    Budget,
    /// Each category is backed by one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    /// Categorized transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
