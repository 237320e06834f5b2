//! Defines the route handler for the page for editing a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, peso_input_styles},
    navigation::NavBar,
    transaction::{
        TransactionState,
        core::get_transaction,
        form::{TransactionFormData, transaction_form_view},
        validation::ReferenceData,
    },
};

/// Renders the transaction form prefilled with a stored transaction.
///
/// Responds with 404 if the user has no such transaction.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let (transaction, reference) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transaction = get_transaction(transaction_id, user_id, &connection)?;
        let reference = ReferenceData::load_for_form(user_id, Some(transaction_id), &connection)
            .inspect_err(|error| {
                tracing::error!(
                    "Failed to retrieve reference data for editing transaction {transaction_id}: {error}"
                )
            })?;

        (transaction, reference)
    };

    let form = TransactionFormData::from_transaction(&transaction);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Edit Transaction" }

            div id="transaction-form-container" class="w-full"
            {
                (transaction_form_view(&form, &reference))
            }
        }
    };

    Ok(base("Edit Transaction", &[peso_input_styles()], &content).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document},
        transaction::{
            ledger::record_transaction,
            test_utils::{assert_transaction_type_inputs, fixture},
            validation::{ReferenceData, validate_transaction},
        },
    };

    use super::get_edit_transaction_page;

    #[tokio::test]
    async fn prefills_stored_transaction() {
        let fixture = fixture();
        let transaction_id = {
            let connection = fixture.state.db_connection.lock().unwrap();
            let draft = fixture.expense_form(75.0).to_draft().unwrap();
            let reference = ReferenceData::load(fixture.user_id, &connection).unwrap();
            let review = validate_transaction(&draft, &reference).unwrap();
            record_transaction(fixture.user_id, &review.transaction, &connection)
                .unwrap()
                .transaction
                .id
        };

        let response = get_edit_transaction_page(
            State(fixture.state),
            Extension(fixture.user_id),
            Path(transaction_id),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::REVIEW_TRANSACTION, "hx-post");
        assert_transaction_type_inputs(&form, "expense");
        let value_of = |name: &str| {
            form.select(&Selector::parse(&format!("input[name={name}]")).unwrap())
                .next()
                .and_then(|input| input.value().attr("value"))
                .map(str::to_owned)
        };
        assert_eq!(value_of("amount"), Some("75.00".to_owned()));
        assert_eq!(value_of("transaction_id"), Some(transaction_id.to_string()));
        assert_eq!(value_of("date"), Some("2026-10-15".to_owned()));
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let fixture = fixture();

        let response =
            get_edit_transaction_page(State(fixture.state), Extension(fixture.user_id), Path(999))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
