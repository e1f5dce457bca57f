//! Goal entity - A savings target backed by exactly one envelope in a
//! goal-tracking account. The goal's current amount is the backing
//! category's `available_amount` and is never stored here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Goal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    /// Unique identifier for the goal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the goal
    pub owner: String,
    /// Human-readable name (e.g., "Emergency Fund")
    pub name: String,
    /// Backing envelope
    #[sea_orm(unique)]
    pub category_id: i64,
    /// Amount to reach, in cents
    pub target_amount: i64,
    /// Optional date the owner wants to reach the target by
    pub target_date: Option<Date>,
    /// When the goal was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Goal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each goal is backed by one category
    #[sea_orm(
        belongs_to = "super::budget_category::Entity",
        from = "Column::CategoryId",
        to = "super::budget_category::Column::Id",
        on_delete = "Cascade"
    )]
    BudgetCategory,
}

impl Related<super::budget_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
