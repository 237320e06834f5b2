//! BudgetMe is a web app for managing personal and family budgets.
//!
//! This library provides a REST API that directly serves HTML pages. Users
//! keep accounts, categories, savings goals and budgets, and record income,
//! expense and contribution transactions through a two-step form that
//! validates each draft before it reaches the ledger.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod activity;
mod alert;
mod app_state;
mod auth;
mod budget;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod family;
mod goal;
mod html;
mod insights;
mod internal_server_error;
mod logging;
mod money;
mod name;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use account::{Account, NewAccount, create_account};
pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email,
    update_password,
};
pub use category::seed_default_categories;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use name::Name;
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::{
    alert::Alert,
    family::PermissionDenied,
    internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
    transaction::ValidationError,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token in the cookie could not be parsed or serialized.
    #[error("invalid auth token: {0}")]
    InvalidToken(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address is not a plausible email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email address is already registered to another user.
    #[error("the email \"{0}\" is already registered")]
    DuplicateEmail(String),

    /// An empty string was used to create a name.
    #[error("name cannot be empty")]
    EmptyName,

    /// A name was longer than the allowed number of characters.
    #[error("name cannot be longer than {0} characters")]
    NameTooLong(usize),

    /// A monetary amount outside the accepted range, e.g. a negative goal target.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A currency that is not a three-letter code such as "PHP".
    #[error("\"{0}\" is not a three-letter currency code")]
    InvalidCurrency(String),

    /// A budget alert threshold outside of (0, 1].
    #[error("alert threshold must be greater than 0% and at most 100%, got {0}")]
    InvalidThreshold(f64),

    /// A date that could not be parsed.
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),

    /// A period where the end date comes before the start date.
    #[error("the end date must not be before the start date")]
    InvalidDateRange,

    /// A draft transaction failed validation.
    #[error("{0}")]
    Validation(ValidationError),

    /// A transaction form was submitted from a step that does not allow it,
    /// e.g. submitting a draft that was never reviewed.
    #[error("{0}")]
    InvalidFormStep(String),

    /// The draft raised warnings that the user has not acknowledged.
    #[error("the transaction has warnings that must be confirmed before submitting")]
    ConfirmationRequired,

    /// A family role check failed.
    #[error("{0}")]
    PermissionDenied(PermissionDenied),

    /// A role change that breaks the family ownership rules.
    #[error("cannot change role: {0}")]
    InvalidRoleChange(String),

    /// The user is already a member of a family.
    #[error("the user is already a member of a family")]
    AlreadyInFamily,

    /// No registered user has the given email address.
    #[error("no user is registered with the email \"{0}\"")]
    UnknownEmail(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The specified account name already exists for the user.
    #[error("the account \"{0}\" already exists")]
    DuplicateAccountName(String),

    /// The specified category name already exists for the user.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::NotAllowed(denied) => Error::PermissionDenied(denied),
            error => Error::Validation(error),
        }
    }
}

impl From<PermissionDenied> for Error {
    fn from(value: PermissionDenied) -> Self {
        Error::PermissionDenied(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Alert::Error {
                    message: "Invalid email or password".to_owned(),
                    details: "Check your email and password and try again.".to_owned(),
                },
            ),
            Error::Validation(error) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid transaction".to_owned(),
                    details: error.to_string(),
                },
            ),
            Error::InvalidFormStep(reason) => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Form out of date".to_owned(),
                    details: format!("{reason}. Reload the page and try again."),
                },
            ),
            Error::ConfirmationRequired => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Confirmation required".to_owned(),
                    details: "Review the warnings for this transaction and confirm them \
                    before submitting."
                        .to_owned(),
                },
            ),
            Error::PermissionDenied(denied) => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: denied.to_string(),
                    details: denied.remediation().to_owned(),
                },
            ),
            Error::InvalidRoleChange(reason) => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: "Could not change role".to_owned(),
                    details: format!("{reason}."),
                },
            ),
            Error::AlreadyInFamily => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Already in a family".to_owned(),
                    details: "A user can only belong to one family.".to_owned(),
                },
            ),
            Error::UnknownEmail(email) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unknown user".to_owned(),
                    details: format!(
                        "No user is registered with the email {email}. Ask them to register first."
                    ),
                },
            ),
            Error::DuplicateAccountName(name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate Account Name".to_owned(),
                    details: format!(
                        "The account {name} already exists. Choose a different account name.",
                    ),
                },
            ),
            Error::DuplicateCategoryName(name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate Category Name".to_owned(),
                    details: format!(
                        "The category {name} already exists. Choose a different name."
                    ),
                },
            ),
            error @ (Error::EmptyName
            | Error::NameTooLong(_)
            | Error::InvalidAmount(_)
            | Error::InvalidThreshold(_)
            | Error::InvalidCurrency(_)
            | Error::InvalidDate(_)
            | Error::InvalidDateRange
            | Error::InvalidEmail(_)
            | Error::DuplicateEmail(_)
            | Error::TooWeak(_)) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid input".to_owned(),
                    details: error.to_string(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The requested item could not be found. \
                    Try refreshing the page."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingAccount => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update account".to_owned(),
                    details: "The account could not be found.".to_owned(),
                },
            ),
            Error::SqlError(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Could not save your changes".to_owned(),
                    details: error.to_string(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
