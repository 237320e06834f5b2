//! Defines the route handler for the page for creating a new transaction.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error,
    auth::UserID,
    endpoints,
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base, peso_input_styles},
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        TransactionState,
        form::{TransactionFormData, transaction_form_view},
        validation::ReferenceData,
    },
};

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let reference = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        ReferenceData::load(user_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve reference data for new transaction page: {error}")
        })?
    };

    let form = TransactionFormData::new(today, &reference);
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "New Transaction" }

            @if reference.accounts.is_empty() {
                p
                {
                    "You need an account before you can record transactions. Create one "
                    a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE) { "here" }
                    "."
                }
            } @else {
                div id="transaction-form-container" class="w-full"
                {
                    (transaction_form_view(&form, &reference))
                }
            }
        }
    };

    Ok(base("Create Transaction", &[peso_input_styles()], &content).into_response())
}
