//! Budget periods and calendar helpers.
//!
//! A budget is one calendar month for one owner. The active period is always
//! passed explicitly (as a `budget_id` or a month) to the operations that need
//! it; nothing in the engine resolves a "current month" on its own.

use crate::{
    entities::{Budget, budget},
    errors::{Error, Result},
};
use chrono::{Datelike, Local, NaiveDate};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a calendar day in `YYYY-MM-DD` form.
///
/// # Errors
/// Returns a validation error for anything else.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| Error::validation(format!("Invalid date '{value}': {e}")))
}

/// Formats a calendar day as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today in the local calendar.
///
/// Dates are calendar days, so "today" must come from the local clock: using
/// UTC would shift evening entries to the next day.
#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// First day of the month containing `date`.
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Creates the budget for an owner's month.
///
/// # Errors
/// Returns a validation error if the owner already has a budget for that month.
#[instrument(skip(db))]
pub async fn create_budget<C>(db: &C, owner: &str, month: NaiveDate) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    if owner.trim().is_empty() {
        return Err(Error::validation("Budget owner cannot be empty"));
    }

    let month = month_start(month);
    if get_budget_for_month(db, owner, month).await?.is_some() {
        return Err(Error::validation(format!(
            "A budget for {} already exists",
            month.format("%B %Y")
        )));
    }

    let created = budget::ActiveModel {
        owner: Set(owner.trim().to_string()),
        month: Set(month),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(budget_id = created.id, month = %created.month, "Created budget");
    Ok(created)
}

/// Finds a budget by its unique ID.
pub async fn get_budget_by_id<C>(db: &C, budget_id: i64) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find_by_id(budget_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_budget_by_id`] but a missing budget is an error.
pub async fn require_budget<C>(db: &C, budget_id: i64) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    get_budget_by_id(db, budget_id)
        .await?
        .ok_or_else(|| Error::budget_not_found(budget_id))
}

/// The owner's budget for the month containing `month`, if one exists.
pub async fn get_budget_for_month<C>(
    db: &C,
    owner: &str,
    month: NaiveDate,
) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find()
        .filter(budget::Column::Owner.eq(owner.trim()))
        .filter(budget::Column::Month.eq(month_start(month)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the owner's budget for a month, creating it when missing.
pub async fn get_or_create_budget_for_month<C>(
    db: &C,
    owner: &str,
    month: NaiveDate,
) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = get_budget_for_month(db, owner, month).await? {
        debug!(budget_id = existing.id, "Budget already exists");
        return Ok(existing);
    }
    create_budget(db, owner, month).await
}

/// The most recent budget of the same owner that precedes `budget_id`.
pub async fn get_previous_budget<C>(db: &C, budget_id: i64) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    let current = require_budget(db, budget_id).await?;
    Budget::find()
        .filter(budget::Column::Owner.eq(current.owner))
        .filter(budget::Column::Month.lt(current.month))
        .order_by_desc(budget::Column::Month)
        .one(db)
        .await
        .map_err(Into::into)
}
