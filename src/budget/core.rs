//! Spending limits for an expense category over a period.

use rusqlite::{Connection, Row, params};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::{BudgetId, CategoryId},
    money::{MAX_AMOUNT, round_to_centavos},
    name::Name,
};

/// The alert threshold used when the user does not pick one.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.8;

/// A spending limit and how much of it has been used.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    pub name: Name,
    pub expense_category_id: Option<CategoryId>,
    /// The spending limit.
    pub amount: f64,
    pub spent: f64,
    /// The fraction of `amount`, in (0, 1], at which the user is warned.
    pub alert_threshold: f64,
    pub start_date: Date,
    pub end_date: Date,
}

/// How close a budget is to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    OnTrack,
    /// At or above the alert threshold, below 100%.
    NearLimit,
    OverBudget,
}

impl Budget {
    /// Spending as a percentage of the limit.
    pub fn percentage(&self) -> f64 {
        percentage_of(self.spent, self.amount)
    }

    pub fn status(&self) -> BudgetStatus {
        status_at(self.percentage(), self.alert_threshold)
    }
}

/// `spent` as a percentage of `amount`.
pub fn percentage_of(spent: f64, amount: f64) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }

    spent / amount * 100.0
}

/// The budget state at `percentage` for a budget with `alert_threshold`.
pub fn status_at(percentage: f64, alert_threshold: f64) -> BudgetStatus {
    if percentage >= 100.0 {
        BudgetStatus::OverBudget
    } else if percentage >= alert_threshold * 100.0 {
        BudgetStatus::NearLimit
    } else {
        BudgetStatus::OnTrack
    }
}

/// The data needed to create a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub name: Name,
    pub expense_category_id: Option<CategoryId>,
    pub amount: f64,
    pub alert_threshold: f64,
    pub start_date: Date,
    pub end_date: Date,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            expense_category_id INTEGER REFERENCES expense_categories(id) ON DELETE SET NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            spent REAL NOT NULL DEFAULT 0,
            alert_threshold REAL NOT NULL DEFAULT 0.8
                CHECK (alert_threshold > 0 AND alert_threshold <= 1),
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

const BUDGET_COLUMNS: &str = "id, user_id, name, expense_category_id, amount, spent, \
    alert_threshold, start_date, end_date";

fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: Name::new_unchecked(&raw_name),
        expense_category_id: row.get(3)?,
        amount: row.get(4)?,
        spent: row.get(5)?,
        alert_threshold: row.get(6)?,
        start_date: row.get(7)?,
        end_date: row.get(8)?,
    })
}

/// Create a budget for `user_id`.
///
/// # Errors
/// - [Error::InvalidAmount] if the limit is not a positive amount,
/// - [Error::InvalidThreshold] if the alert threshold is outside (0, 1],
/// - [Error::InvalidDateRange] if the period ends before it starts,
/// - [Error::NotFound] if the category is not one of the user's expense categories.
pub fn create_budget(
    user_id: UserID,
    new_budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    let amount = round_to_centavos(new_budget.amount);

    if !amount.is_finite() || amount <= 0.0 || amount > MAX_AMOUNT {
        return Err(Error::InvalidAmount(
            "the budget amount must be greater than zero".to_owned(),
        ));
    }

    let threshold = new_budget.alert_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(Error::InvalidThreshold(threshold));
    }

    if new_budget.end_date < new_budget.start_date {
        return Err(Error::InvalidDateRange);
    }

    if let Some(category_id) = new_budget.expense_category_id {
        connection.query_row(
            "SELECT id FROM expense_categories WHERE id = ?1 AND user_id = ?2",
            params![category_id, user_id.as_i64()],
            |row| row.get::<_, CategoryId>(0),
        )?;
    }

    connection.execute(
        "INSERT INTO budgets
            (user_id, name, expense_category_id, amount, alert_threshold, start_date, end_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user_id.as_i64(),
            new_budget.name.as_ref(),
            new_budget.expense_category_id,
            amount,
            threshold,
            new_budget.start_date,
            new_budget.end_date
        ],
    )?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        user_id,
        name: new_budget.name,
        expense_category_id: new_budget.expense_category_id,
        amount,
        spent: 0.0,
        alert_threshold: threshold,
        start_date: new_budget.start_date,
        end_date: new_budget.end_date,
    })
}

/// Get the user's budgets, most recent period first.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = ?1
            ORDER BY start_date DESC, name ASC"
        ))?
        .query_map([user_id.as_i64()], map_row_to_budget)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub fn get_budget(budget_id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .query_row(
            &format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ?1"),
            [budget_id],
            map_row_to_budget,
        )
        .map_err(Error::from)
}

/// Add `delta` to the budget's spending and return the updated budget.
pub fn adjust_budget_spent(
    budget_id: BudgetId,
    delta: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = get_budget(budget_id, connection)?;
    let spent = round_to_centavos(budget.spent + delta);

    connection.execute(
        "UPDATE budgets SET spent = ?1 WHERE id = ?2",
        params![spent, budget_id],
    )?;

    Ok(Budget { spent, ..budget })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryKind, create_category},
        name::Name,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        BudgetStatus, DEFAULT_ALERT_THRESHOLD, NewBudget, adjust_budget_spent, create_budget,
        get_budget, get_budgets, status_at,
    };

    fn new_budget(amount: f64) -> NewBudget {
        NewBudget {
            name: Name::new_unchecked("Groceries"),
            expense_category_id: None,
            amount,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            start_date: date!(2026 - 10 - 01),
            end_date: date!(2026 - 10 - 31),
        }
    }

    #[test]
    fn creates_and_lists_budget() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        let food = create_category(
            user_id,
            Name::new_unchecked("Food"),
            None,
            CategoryKind::Expense,
            &connection,
        )
        .unwrap();

        let budget = create_budget(
            user_id,
            NewBudget {
                expense_category_id: Some(food.id),
                ..new_budget(1000.0)
            },
            &connection,
        )
        .unwrap();

        assert_eq!(get_budgets(user_id, &connection), Ok(vec![budget]));
    }

    #[test]
    fn rejects_invalid_budgets() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        assert!(matches!(
            create_budget(user_id, new_budget(0.0), &connection),
            Err(Error::InvalidAmount(_))
        ));
        assert_eq!(
            create_budget(
                user_id,
                NewBudget {
                    alert_threshold: 1.5,
                    ..new_budget(100.0)
                },
                &connection
            ),
            Err(Error::InvalidThreshold(1.5))
        );
        assert_eq!(
            create_budget(
                user_id,
                NewBudget {
                    end_date: date!(2026 - 09 - 30),
                    ..new_budget(100.0)
                },
                &connection
            ),
            Err(Error::InvalidDateRange)
        );
    }

    #[test]
    fn rejects_other_users_category() {
        let connection = get_test_connection();
        let juan = create_test_user("juan@example.ph", &connection);
        let maria = create_test_user("maria@example.ph", &connection);
        let food = create_category(
            maria,
            Name::new_unchecked("Food"),
            None,
            CategoryKind::Expense,
            &connection,
        )
        .unwrap();

        let result = create_budget(
            juan,
            NewBudget {
                expense_category_id: Some(food.id),
                ..new_budget(100.0)
            },
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn spending_changes_state() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        let budget = create_budget(user_id, new_budget(1000.0), &connection).unwrap();

        let budget_after = adjust_budget_spent(budget.id, 850.0, &connection).unwrap();
        assert_eq!(budget_after.percentage(), 85.0);
        assert_eq!(budget_after.status(), BudgetStatus::NearLimit);

        let budget_after = adjust_budget_spent(budget.id, 150.0, &connection).unwrap();
        assert_eq!(budget_after.status(), BudgetStatus::OverBudget);
        assert_eq!(get_budget(budget.id, &connection), Ok(budget_after));
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(status_at(79.99, 0.8), BudgetStatus::OnTrack);
        assert_eq!(status_at(80.0, 0.8), BudgetStatus::NearLimit);
        assert_eq!(status_at(99.99, 0.8), BudgetStatus::NearLimit);
        assert_eq!(status_at(100.0, 0.8), BudgetStatus::OverBudget);
        assert_eq!(status_at(100.0, 1.0), BudgetStatus::OverBudget);
    }
}
