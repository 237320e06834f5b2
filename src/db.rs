//! Creates the application's tables in a SQLite database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, activity::create_activity_tables,
    auth::create_user_table, budget::create_budget_table, category::create_category_tables,
    family::create_family_tables, goal::create_goal_table,
    transaction::create_transaction_table,
};

/// Create all of the application's tables if they do not exist and enable
/// foreign key enforcement for `connection`.
///
/// The tables are created inside a single exclusive transaction, so either
/// every table exists afterwards or none of the new ones do.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Must be set outside of a transaction, SQLite ignores it otherwise.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_family_tables(&transaction)?;
    create_account_table(&transaction)?;
    create_category_tables(&transaction)?;
    create_goal_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_activity_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("first initialization failed");
        initialize(&connection).expect("second initialization failed");
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let enabled: bool = connection
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert!(enabled);
    }

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        for table in [
            "users",
            "families",
            "family_members",
            "accounts",
            "income_categories",
            "expense_categories",
            "goals",
            "budgets",
            "transactions",
            "activity_log",
            "notifications",
        ] {
            let count: i64 = connection
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();

            assert_eq!(count, 1, "want table {table} to exist");
        }
    }
}
