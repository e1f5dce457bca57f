//! Transaction entity - A single ledger entry against one account.
//!
//! `amount` is always a positive magnitude; `transaction_type` decides the sign.
//! For transfers, `account_id` is the source side and `counterpart_account_id`
//! records the destination so both sides can be reversed.
use super::enums::TransactionType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account the transaction is recorded against (source side for transfers)
    pub account_id: i64,
    /// Envelope charged, if any
    pub category_id: Option<i64>,
    /// Positive magnitude in cents
    pub amount: i64,
    /// Income, expense or transfer
    pub transaction_type: TransactionType,
    /// Calendar day the transaction happened
    pub date: Date,
    /// Human-readable description of the transaction
    pub description: String,
    /// Subscription that produced this transaction, if any
    pub subscription_id: Option<i64>,
    /// Destination account of a transfer
    pub counterpart_account_id: Option<i64>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one (source) account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
    /// Each transaction may be charged to one category
    #[sea_orm(
        belongs_to = "super::budget_category::Entity",
        from = "Column::CategoryId",
        to = "super::budget_category::Column::Id",
        on_delete = "SetNull"
    )]
    BudgetCategory,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::budget_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
