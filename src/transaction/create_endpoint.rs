//! Defines the endpoint for submitting a reviewed transaction.

use axum::{
    Extension,
    extract::State,
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
    endpoints,
    transaction::{
        TransactionState,
        flow::{FormEvent, check_acknowledged},
        form::TransactionFormData,
        ledger::{record_outcome_activity, record_transaction},
        review_endpoint::validate_form,
    },
};

/// A route handler for recording a reviewed transaction, redirects to the
/// transactions view on success.
///
/// The draft is validated again since balances may have changed since the
/// review step was rendered.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionFormData>,
) -> Response {
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

    let outcome = match record_transaction(user_id, &review.transaction, &connection) {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!("could not record transaction for user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    record_outcome_activity(
        user_id,
        ActivityAction::TransactionCreated,
        &outcome,
        &connection,
    );
    tracing::info!(
        "user {user_id} recorded {} transaction {} of {:.2}",
        outcome.transaction.type_,
        outcome.transaction.id,
        outcome.transaction.amount
    );

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;

    use crate::{
        activity::get_unread_notifications,
        endpoints,
        goal::{GoalStatus, get_goal},
        test_utils::{assert_alert_message, assert_hx_redirect},
        transaction::{
            TransactionType,
            flow::FormStep,
            form::TransactionFormData,
            get_transactions,
            test_utils::{Fixture, fixture},
        },
    };

    use super::create_transaction_endpoint;

    async fn submit(fixture: &Fixture, form: TransactionFormData) -> axum::response::Response {
        create_transaction_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.user_id),
            Form(form),
        )
        .await
    }

    #[tokio::test]
    async fn records_expense_rounded_to_centavos() {
        let fixture = fixture();

        let response = submit(&fixture, fixture.expense_form(150.005)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let transactions = get_transactions(
            fixture.user_id,
            &fixture.state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 150.01);
        assert_eq!(fixture.balance(), 349.99);
    }

    #[tokio::test]
    async fn contribution_over_remaining_needs_acknowledgement() {
        let fixture = fixture();
        let income = TransactionFormData {
            type_: TransactionType::Income,
            category: Some(fixture.salary),
            ..fixture.expense_form(1000.0)
        };
        assert_eq!(submit(&fixture, income).await.status(), StatusCode::SEE_OTHER);
        let contribution = TransactionFormData {
            type_: TransactionType::Contribution,
            category: None,
            goal_id: Some(fixture.goal_id),
            ..fixture.expense_form(1000.0)
        };

        let response = submit(&fixture, contribution.clone()).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_alert_message(response, "Confirmation required").await;
        assert_eq!(fixture.balance(), 1500.0);

        let response = submit(
            &fixture,
            TransactionFormData {
                acknowledged: true,
                ..contribution
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(fixture.balance(), 500.0);
        let connection = fixture.state.db_connection.lock().unwrap();
        let goal = get_goal(fixture.goal_id, &connection).unwrap();
        assert_eq!(goal.current_amount, 1100.0);
        assert_eq!(goal.status, GoalStatus::Completed);
        let notifications = get_unread_notifications(fixture.user_id, &connection).unwrap();
        assert!(
            notifications
                .iter()
                .any(|notification| notification.title == "Goal completed"),
            "want a goal completed notification, got {notifications:?}"
        );
    }

    #[tokio::test]
    async fn budget_near_limit_needs_acknowledgement() {
        let fixture = fixture();
        let form = TransactionFormData {
            budget_id: Some(fixture.budget_id),
            ..fixture.expense_form(100.0)
        };

        let response = submit(&fixture, form).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_alert_message(response, "Confirmation required").await;
        assert_eq!(fixture.balance(), 500.0);
    }

    #[tokio::test]
    async fn rejects_category_type_mismatch() {
        let fixture = fixture();
        // Income and expense categories are numbered separately.
        assert_eq!(fixture.food.id, fixture.salary.id);
        let form = TransactionFormData {
            type_: TransactionType::Income,
            ..fixture.expense_form(100.0)
        };

        let response = submit(&fixture, form).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_alert_message(response, "Invalid transaction").await;
        assert_eq!(fixture.balance(), 500.0);
    }

    #[tokio::test]
    async fn rejects_unreviewed_submit() {
        let fixture = fixture();
        let form = TransactionFormData {
            step: FormStep::Form,
            ..fixture.expense_form(100.0)
        };

        let response = submit(&fixture, form).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_alert_message(response, "Form out of date").await;
    }
}
