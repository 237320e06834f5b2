//! The users table and queries for registered users.

use std::fmt::Display;

use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The lowercase email address the user logs in with.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Trim and lowercase `email` and check that it looks like an email address,
/// i.e. "local@domain.tld" without whitespace.
///
/// # Errors
///
/// Returns [Error::InvalidEmail] if `email` is not plausible.
pub fn normalize_email(email: &str) -> Result<String, Error> {
    let email = email.trim().to_lowercase();

    let is_plausible = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if is_plausible {
        Ok(email)
    } else {
        Err(Error::InvalidEmail(email))
    }
}

/// Create the users table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user with the address `email`.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidEmail] if `email` is not a plausible email address,
/// - [Error::DuplicateEmail] if another user already registered `email`,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let email = normalize_email(email)?;

    connection
        .execute(
            "INSERT INTO users (email, password) VALUES (?1, ?2)",
            (&email, password_hash.as_ref()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref message))
                if sql_error.code == ErrorCode::ConstraintViolation
                    && message.contains("users.email") =>
            {
                Error::DuplicateEmail(email.clone())
            }
            error => error.into(),
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email,
        password_hash,
    })
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password FROM users WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row_to_user)
        .map_err(Error::from)
}

/// Get the user registered with `email`, ignoring case and surrounding whitespace.
///
/// Returns `Ok(None)` if nobody registered `email`.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<Option<User>, Error> {
    let email = email.trim().to_lowercase();

    connection
        .prepare("SELECT id, email, password FROM users WHERE email = :email")?
        .query_row(&[(":email", &email)], map_row_to_user)
        .optional()
        .map_err(Error::from)
}

/// Replace the password of `user_id` with `password_hash`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE users SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, UserID},
    };

    use super::{
        create_user, create_user_table, get_user_by_email, get_user_by_id, normalize_email,
        update_password,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        connection
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(
            normalize_email("  Juan@Example.PH "),
            Ok("juan@example.ph".to_owned())
        );
    }

    #[test]
    fn rejects_implausible_emails() {
        for email in ["", "juan", "@example.com", "juan@", "juan@example", "ju an@x.ph"] {
            assert!(
                matches!(normalize_email(email), Err(Error::InvalidEmail(_))),
                "want {email:?} to be rejected"
            );
        }
    }

    #[test]
    fn create_and_get_user() {
        let connection = get_test_connection();
        let hash = PasswordHash::new_unchecked("hunter2");

        let user = create_user("juan@example.ph", hash.clone(), &connection).unwrap();

        assert_eq!(get_user_by_id(user.id, &connection), Ok(user.clone()));
        assert_eq!(
            get_user_by_email("JUAN@example.ph", &connection),
            Ok(Some(user))
        );
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let connection = get_test_connection();
        let hash = PasswordHash::new_unchecked("hunter2");
        create_user("juan@example.ph", hash.clone(), &connection).unwrap();

        let result = create_user("Juan@Example.ph", hash, &connection);

        assert_eq!(
            result,
            Err(Error::DuplicateEmail("juan@example.ph".to_owned()))
        );
    }

    #[test]
    fn unknown_user_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(
            get_user_by_id(UserID::new(42), &connection),
            Err(Error::NotFound)
        );
        assert_eq!(get_user_by_email("nobody@example.ph", &connection), Ok(None));
    }

    #[test]
    fn update_password_replaces_hash() {
        let connection = get_test_connection();
        let user = create_user(
            "juan@example.ph",
            PasswordHash::new_unchecked("old"),
            &connection,
        )
        .unwrap();

        update_password(user.id, &PasswordHash::new_unchecked("new"), &connection).unwrap();

        let got = get_user_by_id(user.id, &connection).unwrap();
        assert_eq!(got.password_hash, PasswordHash::new_unchecked("new"));
    }

    #[test]
    fn update_password_for_missing_user_fails() {
        let connection = get_test_connection();

        let result = update_password(
            UserID::new(7),
            &PasswordHash::new_unchecked("new"),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }
}
