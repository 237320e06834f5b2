//! Applies transactions to account balances, goal progress and budget spending.
//!
//! Each operation runs inside one SQLite transaction, so the transaction row
//! and its effects are written together or not at all.

use rusqlite::Connection;

use crate::{
    Error,
    account::adjust_account_balance,
    activity::{ActivityAction, record_activity, send_notification},
    auth::UserID,
    budget::{Budget, BudgetStatus, adjust_budget_spent, get_budget},
    database_id::{AccountId, BudgetId, GoalId, TransactionId},
    goal::{Goal, GoalStatus, adjust_goal_progress, get_goal},
    transaction::core::{
        Transaction, TransactionType, ValidatedTransaction, delete_transaction_row,
        get_transaction, insert_transaction, update_transaction_row,
    },
};

/// The stored transaction and any milestones it reached.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerOutcome {
    pub transaction: Transaction,
    /// Set if the transaction completed a goal.
    pub completed_goal: Option<Goal>,
    /// Set if the transaction pushed a budget past its alert threshold or its limit.
    pub crossed_budget: Option<Budget>,
}

/// The parts of a transaction that affect other records.
#[derive(Debug, Clone, Copy)]
struct Effect {
    type_: TransactionType,
    amount: f64,
    account_id: AccountId,
    goal_id: Option<GoalId>,
    budget_id: Option<BudgetId>,
}

impl Effect {
    fn goal_id(&self) -> Option<GoalId> {
        match self.type_ {
            TransactionType::Contribution => self.goal_id,
            TransactionType::Income | TransactionType::Expense => None,
        }
    }

    fn budget_id(&self) -> Option<BudgetId> {
        match self.type_ {
            TransactionType::Expense => self.budget_id,
            TransactionType::Income | TransactionType::Contribution => None,
        }
    }

    /// Apply the effect once with `direction` 1.0, or undo it with -1.0.
    fn apply(&self, direction: f64, connection: &Connection) -> Result<(), Error> {
        adjust_account_balance(
            self.account_id,
            direction * self.type_.balance_sign() * self.amount,
            connection,
        )?;

        if let Some(goal_id) = self.goal_id() {
            adjust_goal_progress(goal_id, direction * self.amount, connection)?;
        }

        if let Some(budget_id) = self.budget_id() {
            adjust_budget_spent(budget_id, direction * self.amount, connection)?;
        }

        Ok(())
    }
}

impl From<&Transaction> for Effect {
    fn from(transaction: &Transaction) -> Self {
        Self {
            type_: transaction.type_,
            amount: transaction.amount,
            account_id: transaction.account_id,
            goal_id: transaction.goal_id,
            budget_id: transaction.budget_id,
        }
    }
}

impl From<&ValidatedTransaction> for Effect {
    fn from(transaction: &ValidatedTransaction) -> Self {
        Self {
            type_: transaction.type_,
            amount: transaction.amount,
            account_id: transaction.account_id,
            goal_id: transaction.goal_id,
            budget_id: transaction.budget_id,
        }
    }
}

/// The goal and budget an effect touches, read before any change is made.
struct Snapshot {
    goal: Option<Goal>,
    budget: Option<Budget>,
}

impl Snapshot {
    fn take(effect: &Effect, connection: &Connection) -> Result<Self, Error> {
        Ok(Self {
            goal: effect
                .goal_id()
                .map(|goal_id| get_goal(goal_id, connection))
                .transpose()?,
            budget: effect
                .budget_id()
                .map(|budget_id| get_budget(budget_id, connection))
                .transpose()?,
        })
    }

    fn into_outcome(
        self,
        transaction: Transaction,
        connection: &Connection,
    ) -> Result<LedgerOutcome, Error> {
        let completed_goal = match self.goal {
            Some(before) if before.status != GoalStatus::Completed => {
                let after = get_goal(before.id, connection)?;
                (after.status == GoalStatus::Completed).then_some(after)
            }
            _ => None,
        };

        let crossed_budget = match self.budget {
            Some(before) => {
                let after = get_budget(before.id, connection)?;
                let crossed = after.status() != BudgetStatus::OnTrack
                    && after.status() != before.status();
                crossed.then_some(after)
            }
            None => None,
        };

        Ok(LedgerOutcome {
            transaction,
            completed_goal,
            crossed_budget,
        })
    }
}

/// Insert a transaction and apply its effects.
///
/// Income adds to the account balance, expenses and contributions withdraw
/// from it. Contributions add to the goal's progress and expenses add to the
/// budget's spending.
///
/// # Errors
/// Returns an error if any of the writes fail, in which case none of them are kept.
pub fn record_transaction(
    user_id: UserID,
    transaction: &ValidatedTransaction,
    connection: &Connection,
) -> Result<LedgerOutcome, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let effect = Effect::from(transaction);
    let snapshot = Snapshot::take(&effect, &sql_transaction)?;
    let stored = insert_transaction(user_id, transaction, &sql_transaction)?;
    effect.apply(1.0, &sql_transaction)?;
    let outcome = snapshot.into_outcome(stored, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(outcome)
}

/// Replace a stored transaction, reversing its old effects and applying the new ones.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if the user has no transaction `id`.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    transaction: &ValidatedTransaction,
    connection: &Connection,
) -> Result<LedgerOutcome, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let old = get_transaction(id, user_id, &sql_transaction).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })?;
    let effect = Effect::from(transaction);
    let snapshot = Snapshot::take(&effect, &sql_transaction)?;

    Effect::from(&old).apply(-1.0, &sql_transaction)?;
    effect.apply(1.0, &sql_transaction)?;
    let stored = update_transaction_row(id, transaction, &sql_transaction)?;
    let outcome = snapshot.into_outcome(stored, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(outcome)
}

/// Delete a transaction and reverse its effects.
///
/// Reversing a contribution re-opens a completed goal that drops below its target.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the user has no transaction `id`.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let old = get_transaction(id, user_id, &sql_transaction).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        error => error,
    })?;
    Effect::from(&old).apply(-1.0, &sql_transaction)?;
    delete_transaction_row(id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(old)
}

/// Log `action` for the transaction and announce any milestones it reached.
pub fn record_outcome_activity(
    user_id: UserID,
    action: ActivityAction,
    outcome: &LedgerOutcome,
    connection: &Connection,
) {
    let transaction = &outcome.transaction;
    record_activity(
        user_id,
        action,
        transaction.id,
        &format!("{} of {:.2}", transaction.type_, transaction.amount),
        connection,
    );

    if let Some(goal) = &outcome.completed_goal {
        record_activity(
            user_id,
            ActivityAction::GoalCompleted,
            goal.id,
            goal.name.as_ref(),
            connection,
        );

        let message = format!("You reached the target for {}.", goal.name);
        send_notification(user_id, "Goal completed", &message, connection);

        if goal.user_id != user_id {
            send_notification(goal.user_id, "Goal completed", &message, connection);
        }
    }

    if let Some(budget) = &outcome.crossed_budget {
        record_activity(
            user_id,
            ActivityAction::BudgetThresholdCrossed,
            budget.id,
            &format!("{} at {:.0}%", budget.name, budget.percentage()),
            connection,
        );

        let (title, message) = match budget.status() {
            BudgetStatus::OverBudget => (
                "Over budget",
                format!(
                    "You have spent {:.0}% of your {} budget.",
                    budget.percentage(),
                    budget.name
                ),
            ),
            BudgetStatus::NearLimit | BudgetStatus::OnTrack => (
                "Budget alert",
                format!(
                    "You have used {:.0}% of your {} budget.",
                    budget.percentage(),
                    budget.name
                ),
            ),
        };
        send_notification(user_id, title, &message, connection);
    }
}
