use rusqlite::{Connection, ErrorCode, Row, params};

use crate::{
    Error, auth::UserID, database_id::AccountId, money::DEFAULT_CURRENCY, name::Name,
};

/// A bank account, e-wallet or cash pouch and the money currently in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserID,
    /// The name of the account, unique per user.
    pub name: Name,
    /// The current balance.
    pub balance: f64,
    /// A three-letter currency code, e.g. "PHP".
    pub currency: String,
    /// Whether the account is preselected in the transaction form.
    pub is_default: bool,
}

/// The data needed to open a new account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The name of the account, unique per user.
    pub name: Name,
    /// The opening balance.
    pub balance: f64,
    /// A three-letter currency code. Empty means [DEFAULT_CURRENCY].
    pub currency: String,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            balance REAL NOT NULL DEFAULT 0,
            currency TEXT NOT NULL DEFAULT 'PHP',
            is_default INTEGER NOT NULL DEFAULT 0,
            UNIQUE(user_id, name)
        )",
        (),
    )?;

    // At most one default account per user.
    connection.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_one_default
            ON accounts(user_id) WHERE is_default = 1",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Account {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: Name::new_unchecked(&raw_name),
        balance: row.get(3)?,
        currency: row.get(4)?,
        is_default: row.get(5)?,
    })
}

fn normalize_currency(currency: &str) -> Result<String, Error> {
    let currency = currency.trim();

    if currency.is_empty() {
        return Ok(DEFAULT_CURRENCY.to_owned());
    }

    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidCurrency(currency.to_owned()));
    }

    Ok(currency.to_ascii_uppercase())
}

/// Open a new account for `user_id`.
///
/// The user's first account becomes their default account.
///
/// # Errors
/// Returns [Error::DuplicateAccountName] if the user already has an account
/// called `new_account.name`, or [Error::InvalidCurrency] if the currency is
/// not a three-letter code.
pub fn create_account(
    user_id: UserID,
    new_account: NewAccount,
    connection: &Connection,
) -> Result<Account, Error> {
    let currency = normalize_currency(&new_account.currency)?;

    let has_accounts: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE user_id = ?1)",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;
    let is_default = !has_accounts;

    connection
        .execute(
            "INSERT INTO accounts (user_id, name, balance, currency, is_default)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id.as_i64(),
                new_account.name.as_ref(),
                new_account.balance,
                currency,
                is_default
            ],
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref message))
                if sql_error.code == ErrorCode::ConstraintViolation
                    && message.contains("accounts.name") =>
            {
                Error::DuplicateAccountName(new_account.name.to_string())
            }
            error => error.into(),
        })?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        user_id,
        name: new_account.name,
        balance: new_account.balance,
        currency,
        is_default,
    })
}

/// Get the user's accounts, default account first and then by name.
pub fn get_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, balance, currency, is_default FROM accounts
            WHERE user_id = ?1
            ORDER BY is_default DESC, name ASC",
        )?
        .query_map([user_id.as_i64()], map_row_to_account)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Get one of the user's accounts.
///
/// # Errors
/// Returns [Error::NotFound] if the account does not exist or belongs to
/// another user.
pub fn get_account(
    account_id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, user_id, name, balance, currency, is_default FROM accounts
            WHERE id = ?1 AND user_id = ?2",
            params![account_id, user_id.as_i64()],
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Make `account_id` the user's only default account.
///
/// # Errors
/// Returns [Error::UpdateMissingAccount] if the user has no such account.
pub fn set_default_account(
    user_id: UserID,
    account_id: AccountId,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    get_account(account_id, user_id, &transaction).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingAccount,
        error => error,
    })?;

    transaction.execute(
        "UPDATE accounts SET is_default = 0 WHERE user_id = ?1 AND is_default = 1",
        [user_id.as_i64()],
    )?;
    transaction.execute(
        "UPDATE accounts SET is_default = 1 WHERE id = ?1",
        [account_id],
    )?;

    transaction.commit()?;

    Ok(())
}

/// Add `delta` to the balance of `account_id`. Negative deltas withdraw money.
///
/// # Errors
/// Returns [Error::UpdateMissingAccount] if the account does not exist.
pub fn adjust_account_balance(
    account_id: AccountId,
    delta: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE accounts SET balance = ROUND(balance + ?1, 2) WHERE id = ?2",
        params![delta, account_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    Ok(())
}

/// Get the total balance across all of the user's accounts.
pub fn get_total_account_balance(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    let total: f64 = connection.query_row(
        "SELECT COALESCE(SUM(balance), 0) FROM accounts WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    Ok(total)
}

#[cfg(test)]
mod create_account_tests {
    use crate::{
        Error,
        name::Name,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{NewAccount, create_account, get_accounts};

    fn new_account(name: &str, balance: f64) -> NewAccount {
        NewAccount {
            name: Name::new_unchecked(name),
            balance,
            currency: String::new(),
        }
    }

    #[test]
    fn first_account_becomes_default() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        let wallet = create_account(user_id, new_account("Wallet", 500.0), &connection).unwrap();
        let bank = create_account(user_id, new_account("BDO", 10_000.0), &connection).unwrap();

        assert!(wallet.is_default);
        assert!(!bank.is_default);
        assert_eq!(wallet.currency, "PHP");
        assert_eq!(get_accounts(user_id, &connection), Ok(vec![wallet, bank]));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        create_account(user_id, new_account("Wallet", 500.0), &connection).unwrap();

        let result = create_account(user_id, new_account("Wallet", 1.0), &connection);

        assert_eq!(result, Err(Error::DuplicateAccountName("Wallet".to_owned())));
    }

    #[test]
    fn other_users_may_reuse_a_name() {
        let connection = get_test_connection();
        let juan = create_test_user("juan@example.ph", &connection);
        let maria = create_test_user("maria@example.ph", &connection);
        create_account(juan, new_account("Wallet", 500.0), &connection).unwrap();

        let account = create_account(maria, new_account("Wallet", 20.0), &connection).unwrap();

        assert!(account.is_default);
    }

    #[test]
    fn currency_is_validated_and_uppercased() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        let usd = create_account(
            user_id,
            NewAccount {
                currency: "usd".to_owned(),
                ..new_account("Dollars", 0.0)
            },
            &connection,
        )
        .unwrap();
        let invalid = create_account(
            user_id,
            NewAccount {
                currency: "pesos".to_owned(),
                ..new_account("Pesos", 0.0)
            },
            &connection,
        );

        assert_eq!(usd.currency, "USD");
        assert_eq!(invalid, Err(Error::InvalidCurrency("pesos".to_owned())));
    }
}

#[cfg(test)]
mod default_account_tests {
    use crate::{
        Error,
        name::Name,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{NewAccount, create_account, get_account, set_default_account};

    #[test]
    fn set_default_moves_the_flag() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        let new_account = |name: &str| NewAccount {
            name: Name::new_unchecked(name),
            balance: 0.0,
            currency: "PHP".to_owned(),
        };
        let wallet = create_account(user_id, new_account("Wallet"), &connection).unwrap();
        let bank = create_account(user_id, new_account("BDO"), &connection).unwrap();

        set_default_account(user_id, bank.id, &connection).unwrap();

        assert!(!get_account(wallet.id, user_id, &connection).unwrap().is_default);
        assert!(get_account(bank.id, user_id, &connection).unwrap().is_default);
    }

    #[test]
    fn cannot_set_another_users_account_as_default() {
        let connection = get_test_connection();
        let juan = create_test_user("juan@example.ph", &connection);
        let maria = create_test_user("maria@example.ph", &connection);
        let account = create_account(
            juan,
            NewAccount {
                name: Name::new_unchecked("Wallet"),
                balance: 0.0,
                currency: "PHP".to_owned(),
            },
            &connection,
        )
        .unwrap();

        assert_eq!(
            set_default_account(maria, account.id, &connection),
            Err(Error::UpdateMissingAccount)
        );
    }
}

#[cfg(test)]
mod balance_tests {
    use crate::{
        Error,
        name::Name,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        NewAccount, adjust_account_balance, create_account, get_account,
        get_total_account_balance,
    };

    #[test]
    fn total_balance_sums_only_the_users_accounts() {
        let connection = get_test_connection();
        let juan = create_test_user("juan@example.ph", &connection);
        let maria = create_test_user("maria@example.ph", &connection);
        for (user_id, name, balance) in [
            (juan, "Wallet", 100.50),
            (juan, "BDO", 250.75),
            (juan, "Credit Card", -50.25),
            (maria, "Wallet", 1000.0),
        ] {
            create_account(
                user_id,
                NewAccount {
                    name: Name::new_unchecked(name),
                    balance,
                    currency: "PHP".to_owned(),
                },
                &connection,
            )
            .unwrap();
        }

        assert_eq!(get_total_account_balance(juan, &connection), Ok(301.0));
    }

    #[test]
    fn total_balance_is_zero_without_accounts() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        assert_eq!(get_total_account_balance(user_id, &connection), Ok(0.0));
    }

    #[test]
    fn adjust_balance_adds_delta() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        let account = create_account(
            user_id,
            NewAccount {
                name: Name::new_unchecked("Wallet"),
                balance: 500.0,
                currency: "PHP".to_owned(),
            },
            &connection,
        )
        .unwrap();

        adjust_account_balance(account.id, -150.0, &connection).unwrap();

        assert_eq!(
            get_account(account.id, user_id, &connection).unwrap().balance,
            350.0
        );
        assert_eq!(
            adjust_account_balance(999, 1.0, &connection),
            Err(Error::UpdateMissingAccount)
        );
    }
}
