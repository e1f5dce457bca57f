//! String-backed enums shared by the entity definitions.
//!
//! Each enum is stored as its lowercase `snake_case` name so rows stay readable
//! from any SQL client, and deserializes from the same spelling in `config.toml`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of financial account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Day-to-day spending account
    #[sea_orm(string_value = "checking")]
    Checking,
    /// Savings account
    #[sea_orm(string_value = "savings")]
    Savings,
    /// Credit card; the balance is usually negative
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    /// Brokerage or other investment account
    #[sea_orm(string_value = "investment")]
    Investment,
    /// Loan or mortgage
    #[sea_orm(string_value = "loan")]
    Loan,
}

/// Role of a budget category inside a monthly budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    /// Tracks expected income; never counts as assigned money
    #[sea_orm(string_value = "income")]
    Income,
    /// Regular spending envelope
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Savings envelope (goals live here)
    #[sea_orm(string_value = "savings")]
    Savings,
}

impl CategoryType {
    /// Whether money held by a category of this type counts against ready-to-assign.
    #[must_use]
    pub const fn holds_assigned_money(self) -> bool {
        matches!(self, Self::Expense | Self::Savings)
    }
}

/// Sign convention of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money entering the account
    #[sea_orm(string_value = "income")]
    Income,
    /// Money leaving the account, optionally charged to an envelope
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money moving to another account
    #[sea_orm(string_value = "transfer")]
    Transfer,
}
