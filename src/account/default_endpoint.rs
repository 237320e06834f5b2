//! The endpoint that changes which account is preselected in the transaction form.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, account::set_default_account, auth::UserID, database_id::AccountId,
    endpoints,
};

/// The state needed to change the default account.
#[derive(Debug, Clone)]
pub struct DefaultAccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DefaultAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Make the account in the path the user's default account and reload the accounts page.
pub async fn set_default_account_endpoint(
    State(state): State<DefaultAccountState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_default_account(user_id, account_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingAccount) => Error::UpdateMissingAccount.into_alert_response(),
        Err(error) => {
            tracing::error!("could not set default account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}
