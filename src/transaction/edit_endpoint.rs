//! Defines the endpoint for saving changes to a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    activity::ActivityAction,
    auth::UserID,
    database_id::TransactionId,
    endpoints,
    transaction::{
        TransactionState,
        flow::{FormEvent, check_acknowledged},
        form::TransactionFormData,
        ledger::{record_outcome_activity, update_transaction},
        review_endpoint::validate_form,
    },
};

/// A route handler for replacing a transaction with a reviewed draft,
/// redirects to the transactions view on success.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    // The path decides which transaction is edited, not the hidden input.
    let form = TransactionFormData {
        transaction_id: Some(transaction_id),
        ..form
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let review = match validate_form(user_id, &form, FormEvent::Submit, &connection) {
        Ok((review, _)) => review,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = check_acknowledged(&review, form.acknowledged) {
        return error.into_alert_response();
    }

    let outcome =
        match update_transaction(user_id, transaction_id, &review.transaction, &connection) {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(
                    "could not update transaction {transaction_id} for user {user_id}: {error}"
                );
                return error.into_alert_response();
            }
        };

    record_outcome_activity(
        user_id,
        ActivityAction::TransactionUpdated,
        &outcome,
        &connection,
    );

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
