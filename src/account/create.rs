//! Account creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    account::{NewAccount, create_account},
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        base, peso_input_styles,
    },
    money::{DEFAULT_CURRENCY, MAX_AMOUNT, round_to_centavos},
    name::Name,
    navigation::NavBar,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating an account.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountForm {
    pub name: String,
    /// The opening balance in pesos.
    pub balance: f64,
    #[serde(default)]
    pub currency: String,
}

/// Render the account creation page.
pub async fn get_new_account_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_ACCOUNT_VIEW).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (new_account_form_view("")) }
    };

    base("Create Account", &[peso_input_styles()], &content).into_response()
}

/// A route handler for creating a new account, redirects to the accounts view on success.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<AccountForm>,
) -> Response {
    let name = match Name::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return new_account_form_view(&format!("Error: {error}")).into_response();
        }
    };

    if !form.balance.is_finite() || form.balance.abs() > MAX_AMOUNT {
        return Error::InvalidAmount(format!("{} is not a valid balance", form.balance))
            .into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_account = NewAccount {
        name,
        balance: round_to_centavos(form.balance),
        currency: form.currency,
    };

    match create_account(user_id, new_account, &connection) {
        Ok(account) => {
            tracing::info!("User {user_id} created account {}", account.id);
            (
                HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ (Error::DuplicateAccountName(_) | Error::InvalidCurrency(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an account: {error}");
            error.into_alert_response()
        }
    }
}

fn new_account_form_view(error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::ACCOUNTS_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Account Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. GCash"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="balance" class=(FORM_LABEL_STYLE) { "Opening Balance" }

                div class="input-wrapper w-full"
                {
                    input
                        id="balance"
                        type="number"
                        name="balance"
                        step="0.01"
                        value="0"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                input
                    id="currency"
                    type="text"
                    name="currency"
                    value=(DEFAULT_CURRENCY)
                    minlength="3"
                    maxlength="3"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Account" }
        }
    }
}

#[cfg(test)]
mod new_account_page_tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_new_account_page;

    #[tokio::test]
    async fn render_page() {
        let response = get_new_account_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::ACCOUNTS_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "balance", "number");
        assert_form_submit_button(&form);
    }
}
