//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, params,
    types::{FromSqlError, Type},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::{CategoryKind, CategoryRef},
    database_id::{AccountId, BudgetId, CategoryId, GoalId, TransactionId},
};

/// Whether money came in, went out, or went towards a savings goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
    /// Money set aside for a savings goal. Withdrawn from the account like an expense.
    Contribution,
}

impl TransactionType {
    /// The value stored in the `type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Contribution => "contribution",
        }
    }

    /// The sign applied to the amount when it is added to an account balance.
    pub fn balance_sign(self) -> f64 {
        match self {
            TransactionType::Income => 1.0,
            TransactionType::Expense | TransactionType::Contribution => -1.0,
        }
    }

    /// The kind of category a transaction of this type is filed under.
    pub fn category_kind(self) -> CategoryKind {
        match self {
            TransactionType::Income => CategoryKind::Income,
            TransactionType::Expense | TransactionType::Contribution => CategoryKind::Expense,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            "contribution" => Ok(TransactionType::Contribution),
            other => Err(format!("unknown transaction type \"{other}\"")),
        }
    }
}

/// An income, expense or contribution recorded against one of the user's accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserID,
    pub type_: TransactionType,
    /// Always positive, the type decides the direction.
    pub amount: f64,
    pub date: Date,
    pub description: String,
    pub account_id: AccountId,
    /// Set only for income.
    pub income_category_id: Option<CategoryId>,
    /// Set only for expenses and contributions.
    pub expense_category_id: Option<CategoryId>,
    pub goal_id: Option<GoalId>,
    pub budget_id: Option<BudgetId>,
}

impl Transaction {
    /// The category ID from the column that matches the transaction type.
    pub fn category_id(&self) -> Option<CategoryId> {
        match self.type_ {
            TransactionType::Income => self.income_category_id,
            TransactionType::Expense | TransactionType::Contribution => self.expense_category_id,
        }
    }

    pub fn category(&self) -> Option<CategoryRef> {
        self.category_id().map(|id| CategoryRef {
            kind: self.type_.category_kind(),
            id,
        })
    }
}

/// A transaction that passed validation and is ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTransaction {
    pub type_: TransactionType,
    /// Rounded to centavos.
    pub amount: f64,
    pub date: Date,
    pub description: String,
    pub account_id: AccountId,
    /// A category of the kind that matches `type_`.
    pub category_id: Option<CategoryId>,
    pub goal_id: Option<GoalId>,
    pub budget_id: Option<BudgetId>,
}

impl ValidatedTransaction {
    pub fn category(&self) -> Option<CategoryRef> {
        self.category_id.map(|id| CategoryRef {
            kind: self.type_.category_kind(),
            id,
        })
    }

    fn category_columns(&self) -> (Option<CategoryId>, Option<CategoryId>) {
        match self.type_ {
            TransactionType::Income => (self.category_id, None),
            TransactionType::Expense | TransactionType::Contribution => (None, self.category_id),
        }
    }
}

const TRANSACTION_COLUMNS: &str = "id, user_id, type, amount, date, description, account_id, \
    income_category_id, expense_category_id, goal_id, budget_id";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense', 'contribution')),
            amount REAL NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            income_category_id INTEGER REFERENCES income_categories(id) ON DELETE SET NULL,
            expense_category_id INTEGER REFERENCES expense_categories(id) ON DELETE SET NULL,
            goal_id INTEGER REFERENCES goals(id) ON DELETE SET NULL,
            budget_id INTEGER REFERENCES budgets(id) ON DELETE SET NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date)",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_type: String = row.get(2)?;
    let type_ = raw_type.parse().map_err(|error: String| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            Box::new(FromSqlError::Other(error.into())),
        )
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        type_,
        amount: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        account_id: row.get(6)?,
        income_category_id: row.get(7)?,
        expense_category_id: row.get(8)?,
        goal_id: row.get(9)?,
        budget_id: row.get(10)?,
    })
}

/// Insert a transaction row without touching balances, goals or budgets.
///
/// Use [super::ledger::record_transaction] to apply the effects as well.
pub(crate) fn insert_transaction(
    user_id: UserID,
    transaction: &ValidatedTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let (income_category_id, expense_category_id) = transaction.category_columns();

    connection
        .prepare(&format!(
            "INSERT INTO transactions (user_id, type, amount, date, description, account_id,
                income_category_id, expense_category_id, goal_id, budget_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                user_id.as_i64(),
                transaction.type_.as_str(),
                transaction.amount,
                transaction.date,
                transaction.description,
                transaction.account_id,
                income_category_id,
                expense_category_id,
                transaction.goal_id,
                transaction.budget_id,
            ],
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Overwrite the row for `id` with `transaction`.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if no row was updated.
pub(crate) fn update_transaction_row(
    id: TransactionId,
    transaction: &ValidatedTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let (income_category_id, expense_category_id) = transaction.category_columns();

    connection
        .prepare(&format!(
            "UPDATE transactions SET
                type = ?1,
                amount = ?2,
                date = ?3,
                description = ?4,
                account_id = ?5,
                income_category_id = ?6,
                expense_category_id = ?7,
                goal_id = ?8,
                budget_id = ?9
            WHERE id = ?10
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                transaction.type_.as_str(),
                transaction.amount,
                transaction.date,
                transaction.description,
                transaction.account_id,
                income_category_id,
                expense_category_id,
                transaction.goal_id,
                transaction.budget_id,
                id,
            ],
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// # Errors
/// Returns [Error::DeleteMissingTransaction] if no row was deleted.
pub(crate) fn delete_transaction_row(
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM transactions WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Retrieve one of the user's transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .query_row(
            &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"),
            params![id, user_id.as_i64()],
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Get all of the user's transactions, most recent first.
pub fn get_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = ?1
            ORDER BY date DESC, id DESC"
        ))?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Get the total number of transactions the user has recorded.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM transactions WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}
