/// Accounts and their atomic balance updates
pub mod account;

/// Monthly budget periods and date helpers
pub mod budget;

/// Envelopes (budget categories) and their accumulators
pub mod category;

/// What each transaction does to balances and envelope spending
pub mod effect;

/// Savings goals backed by envelopes in a goal-tracking account
pub mod goal;

/// Ready-to-assign computation per account and budget period
pub mod ready_to_assign;

/// Moving and covering money between envelopes of one account
pub mod reallocation;

/// Creating accounts and envelopes from settings
pub mod seed;

/// Create, edit and delete transactions with balance bookkeeping
pub mod transaction;

/// Account-to-account transfers
pub mod transfer;
