//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the rows of the backing store and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod budget;
pub mod budget_category;
pub mod enums;
pub mod goal;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use budget_category::{
    Column as BudgetCategoryColumn, Entity as BudgetCategory, Model as BudgetCategoryModel,
};
pub use enums::{AccountType, CategoryType, TransactionType};
pub use goal::{Column as GoalColumn, Entity as Goal, Model as GoalModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
