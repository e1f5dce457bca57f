//! Budget entity - One budgeting period (a calendar month) for one owner.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget period
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the budget
    pub owner: String,
    /// First day of the month this budget covers
    pub month: Date,
    /// When the budget was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One budget has many categories
    #[sea_orm(has_many = "super::budget_category::Entity")]
    BudgetCategories,
}

impl Related<super::budget_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
