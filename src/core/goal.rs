//! Savings goals.
//!
//! A goal is a target amount tracked by one savings envelope in a
//! goal-tracking account. Money is earmarked for a goal by raising the
//! envelope's available amount; the cash itself already sits in the
//! goal-tracking account, so no transaction is recorded and no balance moves.

use crate::{
    core::{
        account::{NewAccount, create_account, get_goal_tracking_account, require_account},
        budget::require_budget,
        category::{NewCategory, adjust_available, create_category, delete_category_in, require_category},
        reallocation::{MoveResult, move_money_in},
    },
    entities::{AccountType, CategoryType, Goal, budget_category, goal},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

const GOALS_ACCOUNT_NAME: &str = "Goals";
const GOALS_GROUP: &str = "Goals";

/// Input for creating a goal
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub owner: String,
    pub name: String,
    /// Amount to reach, in cents
    pub target_amount: i64,
    pub target_date: Option<NaiveDate>,
    /// Budget period the backing envelope lives in
    pub budget_id: i64,
    /// Goal-tracking account to use; the owner's existing one when `None`
    pub goal_account_id: Option<i64>,
}

impl NewGoal {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        target_amount: i64,
        budget_id: i64,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            target_amount,
            target_date: None,
            budget_id,
            goal_account_id: None,
        }
    }

    #[must_use]
    pub const fn by(mut self, target_date: NaiveDate) -> Self {
        self.target_date = Some(target_date);
        self
    }

    #[must_use]
    pub const fn in_account(mut self, account_id: i64) -> Self {
        self.goal_account_id = Some(account_id);
        self
    }
}

/// A goal with its progress read from the backing envelope
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub goal: goal::Model,
    pub current_amount: i64,
    pub remaining_amount: i64,
    /// 0.0 to 100.0
    pub percent_complete: f64,
    pub is_complete: bool,
}

impl GoalProgress {
    pub fn new(goal: goal::Model, category: &budget_category::Model) -> Self {
        let current_amount = category.available_amount;
        let remaining_amount = (goal.target_amount - current_amount).max(0);
        #[allow(clippy::cast_precision_loss)]
        let percent_complete = if goal.target_amount > 0 {
            (current_amount as f64 / goal.target_amount as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };
        let is_complete = current_amount >= goal.target_amount;
        Self {
            goal,
            current_amount,
            remaining_amount,
            percent_complete,
            is_complete,
        }
    }
}

fn validate_target(target_amount: i64) -> Result<()> {
    if target_amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: target_amount,
        });
    }
    Ok(())
}

/// Creates a goal and its backing savings envelope.
///
/// The envelope is placed in the chosen goal-tracking account, or the owner's
/// existing one. When the owner has none, a savings account named "Goals" is
/// created for them.
///
/// # Errors
/// Returns an error if:
/// - The name is blank or the target is not positive
/// - The budget belongs to another owner or does not exist
/// - The chosen account is not a goal-tracking account of the owner
#[instrument(skip(db))]
pub async fn create_goal(db: &DatabaseConnection, input: NewGoal) -> Result<goal::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Goal name cannot be empty"));
    }
    validate_target(input.target_amount)?;

    let txn = db.begin().await?;

    let budget = require_budget(&txn, input.budget_id).await?;
    if budget.owner != input.owner {
        return Err(Error::validation("Budget belongs to a different owner"));
    }

    let account = match input.goal_account_id {
        Some(account_id) => {
            let account = require_account(&txn, account_id).await?;
            if account.owner != input.owner || !account.is_goal_tracking {
                return Err(Error::validation(format!(
                    "'{}' is not a goal-tracking account of this owner",
                    account.name
                )));
            }
            account
        }
        None => match get_goal_tracking_account(&txn, &input.owner).await? {
            Some(account) => account,
            None => {
                create_account(
                    &txn,
                    NewAccount::new(&input.owner, GOALS_ACCOUNT_NAME, AccountType::Savings)
                        .goal_tracking(),
                )
                .await?
            }
        },
    };

    let category = create_category(
        &txn,
        NewCategory::new(budget.id, account.id, input.name.trim(), CategoryType::Savings)
            .in_group(GOALS_GROUP),
    )
    .await?;

    let created = goal::ActiveModel {
        owner: Set(input.owner),
        name: Set(category.name.clone()),
        category_id: Set(category.id),
        target_amount: Set(input.target_amount),
        target_date: Set(input.target_date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        goal_id = created.id,
        category_id = category.id,
        account_id = account.id,
        target_amount = created.target_amount,
        "Created goal"
    );
    Ok(created)
}

/// Finds a savings goal by its unique ID.
pub async fn get_goal_by_id<C>(db: &C, goal_id: i64) -> Result<Option<goal::Model>>
where
    C: ConnectionTrait,
{
    Goal::find_by_id(goal_id).one(db).await.map_err(Into::into)
}

/// Like [`get_goal_by_id`] but a missing goal is an error.
pub async fn require_goal<C>(db: &C, goal_id: i64) -> Result<goal::Model>
where
    C: ConnectionTrait,
{
    get_goal_by_id(db, goal_id)
        .await?
        .ok_or_else(|| Error::goal_not_found(goal_id))
}

/// Lists an owner's goals, ordered by name.
pub async fn get_goals_for_owner<C>(db: &C, owner: &str) -> Result<Vec<goal::Model>>
where
    C: ConnectionTrait,
{
    Goal::find()
        .filter(goal::Column::Owner.eq(owner))
        .order_by_asc(goal::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_goal_progress<C>(db: &C, goal_id: i64) -> Result<GoalProgress>
where
    C: ConnectionTrait,
{
    let goal = require_goal(db, goal_id).await?;
    let category = require_category(db, goal.category_id).await?;
    let progress = GoalProgress::new(goal, &category);
    debug!(
        goal_id,
        current_amount = progress.current_amount,
        "Computed goal progress"
    );
    Ok(progress)
}

/// Changes a goal's target amount and date.
#[instrument(skip(db))]
pub async fn update_goal_target(
    db: &DatabaseConnection,
    goal_id: i64,
    target_amount: i64,
    target_date: Option<NaiveDate>,
) -> Result<goal::Model> {
    validate_target(target_amount)?;

    let existing = require_goal(db, goal_id).await?;
    let mut active: goal::ActiveModel = existing.into();
    active.target_amount = Set(target_amount);
    active.target_date = Set(target_date);
    let updated = active.update(db).await?;

    info!(goal_id, target_amount, "Updated goal target");
    Ok(updated)
}

/// Earmarks `amount` for a goal by raising its envelope's available money.
/// No account balance changes.
#[instrument(skip(db))]
pub async fn add_to_goal(db: &DatabaseConnection, goal_id: i64, amount: i64) -> Result<GoalProgress> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;
    let goal = require_goal(&txn, goal_id).await?;
    let category = adjust_available(&txn, goal.category_id, amount).await?;
    txn.commit().await?;

    info!(goal_id, amount, "Added to goal");
    Ok(GoalProgress::new(goal, &category))
}

/// Moves earmarked money from one goal to another.
///
/// # Errors
/// Fails like an envelope move: the backing envelopes must share an account
/// and the source goal must hold at least `amount`.
#[instrument(skip(db))]
pub async fn transfer_between_goals(
    db: &DatabaseConnection,
    from_goal_id: i64,
    to_goal_id: i64,
    amount: i64,
) -> Result<MoveResult> {
    if from_goal_id == to_goal_id {
        return Err(Error::validation("Cannot transfer a goal to itself"));
    }

    let txn = db.begin().await?;
    let from = require_goal(&txn, from_goal_id).await?;
    let to = require_goal(&txn, to_goal_id).await?;
    let result = move_money_in(&txn, from.category_id, to.category_id, amount).await?;
    txn.commit().await?;

    info!(from_goal_id, to_goal_id, amount, "Transferred between goals");
    Ok(result)
}

/// Deletes a goal together with its backing envelope.
///
/// Money still earmarked for the goal is released back to ready-to-assign.
/// Use [`close_goal_into`] to hand it to another goal first.
#[instrument(skip(db))]
pub async fn delete_goal(db: &DatabaseConnection, goal_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let goal = require_goal(&txn, goal_id).await?;
    delete_category_in(&txn, goal.category_id).await?;
    txn.commit().await?;

    info!(goal_id, "Deleted goal");
    Ok(())
}

/// Moves everything a goal holds into another goal, then deletes it.
/// Returns the amount moved.
#[instrument(skip(db))]
pub async fn close_goal_into(
    db: &DatabaseConnection,
    goal_id: i64,
    destination_goal_id: i64,
) -> Result<i64> {
    if goal_id == destination_goal_id {
        return Err(Error::validation("Cannot close a goal into itself"));
    }

    let txn = db.begin().await?;
    let goal = require_goal(&txn, goal_id).await?;
    let destination = require_goal(&txn, destination_goal_id).await?;
    let category = require_category(&txn, goal.category_id).await?;

    let amount = category.available_amount.max(0);
    if amount > 0 {
        move_money_in(&txn, goal.category_id, destination.category_id, amount).await?;
    }
    delete_category_in(&txn, goal.category_id).await?;
    txn.commit().await?;

    info!(goal_id, destination_goal_id, amount, "Closed goal");
    Ok(amount)
}
