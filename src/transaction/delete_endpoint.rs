use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    activity::{ActivityAction, record_activity},
    alert::Alert,
    auth::UserID,
    database_id::TransactionId,
    transaction::{TransactionState, ledger::delete_transaction},
};

/// A route handler for deleting a transaction and reversing its effects.
///
/// The status code has to be 200 OK or HTMX will not delete the table row.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(user_id, transaction_id, &connection) {
        Ok(transaction) => {
            record_activity(
                user_id,
                ActivityAction::TransactionDeleted,
                transaction.id,
                &format!("{} of {:.2}", transaction.type_, transaction.amount),
                &connection,
            );

            (
                StatusCode::OK,
                Alert::Success {
                    message: "Transaction deleted".to_owned(),
                }
                .into_html(),
            )
                .into_response()
        }
        Err(Error::DeleteMissingTransaction) => {
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        activity::get_recent_activity,
        goal::{GoalStatus, get_goal},
        test_utils::assert_alert_message,
        transaction::{
            TransactionType,
            form::TransactionFormData,
            get_transactions,
            ledger::record_transaction,
            test_utils::{Fixture, fixture},
            validation::{ReferenceData, validate_transaction},
        },
    };

    use super::delete_transaction_endpoint;

    fn record(fixture: &Fixture, form: TransactionFormData) -> i64 {
        let connection = fixture.state.db_connection.lock().unwrap();
        let draft = form.to_draft().unwrap();
        let reference = ReferenceData::load(fixture.user_id, &connection).unwrap();
        let review = validate_transaction(&draft, &reference).unwrap();
        record_transaction(fixture.user_id, &review.transaction, &connection)
            .unwrap()
            .transaction
            .id
    }

    #[tokio::test]
    async fn deletes_expense_and_refunds_account() {
        let fixture = fixture();
        let transaction_id = record(&fixture, fixture.expense_form(120.0));
        assert_eq!(fixture.balance(), 380.0);

        let response = delete_transaction_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.user_id),
            Path(transaction_id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_alert_message(response, "Transaction deleted").await;
        assert_eq!(fixture.balance(), 500.0);
        let connection = fixture.state.db_connection.lock().unwrap();
        assert!(
            get_transactions(fixture.user_id, &connection)
                .unwrap()
                .is_empty()
        );
        let activity = get_recent_activity(fixture.user_id, 1, &connection).unwrap();
        assert_eq!(activity[0].action, "transaction_deleted");
    }

    #[tokio::test]
    async fn deleting_contribution_reopens_goal() {
        let fixture = fixture();
        let income = TransactionFormData {
            type_: TransactionType::Income,
            category: Some(fixture.salary),
            ..fixture.expense_form(1000.0)
        };
        record(&fixture, income);
        let transaction_id = record(
            &fixture,
            TransactionFormData {
                type_: TransactionType::Contribution,
                category: None,
                goal_id: Some(fixture.goal_id),
                ..fixture.expense_form(800.0)
            },
        );

        let response = delete_transaction_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.user_id),
            Path(transaction_id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(fixture.balance(), 1500.0);
        let connection = fixture.state.db_connection.lock().unwrap();
        let goal = get_goal(fixture.goal_id, &connection).unwrap();
        assert_eq!(goal.current_amount, 100.0);
        assert_eq!(goal.status, GoalStatus::InProgress);
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let fixture = fixture();

        let response = delete_transaction_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.user_id),
            Path(42),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_alert_message(response, "Could not delete transaction").await;
    }
}
