//! Envelope reallocation - moving available money between envelopes of one account and month.

use crate::{
    core::category::{adjust_available, require_category},
    entities::budget_category,
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{info, instrument, warn};

/// Both envelopes after a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub from: budget_category::Model,
    pub to: budget_category::Model,
}

/// Outcome of covering an overspent envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverResult {
    pub amount_moved: i64,
    pub overspent: budget_category::Model,
    pub source: budget_category::Model,
}

/// Moves `amount` of available money from one envelope to another.
///
/// Both envelopes must belong to the same budget month and be backed by the
/// same account, and the source must hold at least `amount`.
///
/// # Errors
/// - `InvalidAmount` if the amount is not positive
/// - `Validation` for identical, cross-budget or cross-account envelopes
/// - `InsufficientFunds` if the source holds less than `amount`
/// - `NotFound` if either envelope is unknown
#[instrument(skip(db))]
pub async fn move_money(
    db: &DatabaseConnection,
    from_category_id: i64,
    to_category_id: i64,
    amount: i64,
) -> Result<MoveResult> {
    let txn = db.begin().await?;
    let result = move_money_in(&txn, from_category_id, to_category_id, amount).await?;
    txn.commit().await?;

    info!(
        from_category_id,
        to_category_id, amount, "Moved money between envelopes"
    );
    Ok(result)
}

pub(crate) async fn move_money_in<C>(
    db: &C,
    from_category_id: i64,
    to_category_id: i64,
    amount: i64,
) -> Result<MoveResult>
where
    C: ConnectionTrait,
{
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    if from_category_id == to_category_id {
        return Err(Error::validation("Cannot move money to the same envelope"));
    }

    let from = require_category(db, from_category_id).await?;
    let to = require_category(db, to_category_id).await?;

    if from.budget_id != to.budget_id {
        warn!(
            from_budget = from.budget_id,
            to_budget = to.budget_id,
            "Rejected cross-budget reallocation"
        );
        return Err(Error::validation(format!(
            "'{}' and '{}' belong to different budget months",
            from.name, to.name
        )));
    }
    if from.account_id != to.account_id {
        warn!(
            from_account = from.account_id,
            to_account = to.account_id,
            "Rejected cross-account reallocation"
        );
        return Err(Error::validation(format!(
            "'{}' and '{}' belong to different accounts; transfer between the accounts instead",
            from.name, to.name
        )));
    }
    if from.available_amount < amount {
        return Err(Error::InsufficientFunds {
            available: from.available_amount,
            required: amount,
        });
    }

    let from = adjust_available(db, from_category_id, -amount).await?;
    let to = adjust_available(db, to_category_id, amount).await?;
    Ok(MoveResult { from, to })
}

/// Covers an overspent envelope from another envelope of the same account.
///
/// Moves the smaller of the deficit (`spent - available`) and the source's
/// available money, so the deficit is cleared when the source can afford it
/// and reduced otherwise.
///
/// # Errors
/// Returns a validation error if the target is not overspent, the source is
/// the target, or the source has nothing available.
#[instrument(skip(db))]
pub async fn cover_overspending(
    db: &DatabaseConnection,
    overspent_category_id: i64,
    source_category_id: i64,
) -> Result<CoverResult> {
    if overspent_category_id == source_category_id {
        return Err(Error::validation("An envelope cannot cover itself"));
    }

    let txn = db.begin().await?;

    let overspent = require_category(&txn, overspent_category_id).await?;
    let source = require_category(&txn, source_category_id).await?;

    let deficit = overspent.overspent_amount();
    if deficit == 0 {
        warn!(overspent_category_id, "Rejected cover for an envelope that is not overspent");
        return Err(Error::validation(format!(
            "'{}' is not overspent",
            overspent.name
        )));
    }
    if source.available_amount <= 0 {
        return Err(Error::validation(format!(
            "'{}' has no money available",
            source.name
        )));
    }

    let amount_moved = deficit.min(source.available_amount);
    let moved = move_money_in(&txn, source_category_id, overspent_category_id, amount_moved).await?;
    txn.commit().await?;

    info!(
        overspent_category_id,
        source_category_id,
        amount_moved,
        remaining_deficit = moved.to.overspent_amount(),
        "Covered overspending"
    );
    Ok(CoverResult {
        amount_moved,
        overspent: moved.to,
        source: moved.from,
    })
}
