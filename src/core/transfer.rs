//! Transfers between accounts.
//!
//! A transfer is stored as a single transaction on the source account with the
//! destination recorded as its counterpart. Its effect debits the source and
//! credits the destination, so deleting it restores both balances. Transfers
//! never touch envelope spending.

use crate::{
    core::{
        budget::local_today,
        transaction::{NewTransaction, TransactionFilter, get_transactions, insert_with_effect, remove_with_reversal, require_transaction},
    },
    entities::{Transaction, TransactionType, transaction},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Condition, QueryOrder, TransactionTrait, prelude::*};
use tracing::{info, instrument};

const DEFAULT_DESCRIPTION: &str = "Transfer";

/// A request to move money between two accounts
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Positive magnitude in cents
    pub amount: i64,
    /// Defaults to "Transfer"
    pub description: Option<String>,
    /// Defaults to today's local date
    pub date: Option<NaiveDate>,
}

impl TransferRequest {
    pub const fn new(from_account_id: i64, to_account_id: i64, amount: i64) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            description: None,
            date: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Moves money from one account to another.
///
/// # Errors
/// Returns an error if:
/// - The amount is not positive
/// - Source and destination are the same account
/// - Either account does not exist
#[instrument(skip(db))]
pub async fn transfer(db: &DatabaseConnection, request: TransferRequest) -> Result<transaction::Model> {
    if request.amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: request.amount,
        });
    }
    if request.from_account_id == request.to_account_id {
        return Err(Error::validation("Cannot transfer to the same account"));
    }

    let description = request
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let mut input = NewTransaction::new(
        request.from_account_id,
        request.amount,
        TransactionType::Transfer,
        request.date.unwrap_or_else(local_today),
    )
    .with_description(description);
    input.counterpart_account_id = Some(request.to_account_id);

    let txn = db.begin().await?;
    let created = insert_with_effect(&txn, input).await?;
    txn.commit().await?;

    info!(
        transaction_id = created.id,
        from = request.from_account_id,
        to = request.to_account_id,
        amount = created.amount,
        "Transferred between accounts"
    );
    Ok(created)
}

/// Deletes a transfer, restoring both account balances.
///
/// # Errors
/// Returns a validation error if the transaction is not a transfer.
#[instrument(skip(db))]
pub async fn delete_transfer(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = require_transaction(&txn, transaction_id).await?;
    if existing.transaction_type != TransactionType::Transfer {
        return Err(Error::validation(format!(
            "Transaction {transaction_id} is not a transfer"
        )));
    }
    remove_with_reversal(&txn, existing).await?;
    txn.commit().await?;

    info!(transaction_id, "Deleted transfer");
    Ok(())
}

/// Lists transfers leaving or entering an account, newest first.
pub async fn get_transfers_for_account<C>(db: &C, account_id: i64) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(transaction::Column::TransactionType.eq(TransactionType::Transfer))
        .filter(
            Condition::any()
                .add(transaction::Column::AccountId.eq(account_id))
                .add(transaction::Column::CounterpartAccountId.eq(account_id)),
        )
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists only the outgoing side of an account's transfers.
pub async fn get_outgoing_transfers<C>(db: &C, account_id: i64) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    get_transactions(
        db,
        TransactionFilter::new()
            .account(account_id)
            .of_type(TransactionType::Transfer),
    )
    .await
}
