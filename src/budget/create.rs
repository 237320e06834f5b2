//! Budget creation page and endpoint.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    activity::{ActivityAction, record_activity},
    auth::UserID,
    budget::{BudgetState, DEFAULT_ALERT_THRESHOLD, NewBudget, create_budget},
    category::{Category, CategoryKind, get_categories},
    database_id::CategoryId,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        base, peso_input_styles,
    },
    name::Name,
    navigation::NavBar,
    timezone::{local_today, parse_date_input},
};

/// The form data for a new budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetForm {
    pub name: String,
    /// The ID of an expense category, or empty for a budget across all spending.
    #[serde(default)]
    pub expense_category_id: String,
    pub amount: f64,
    /// The alert threshold as a percentage, e.g. 80.
    pub alert_threshold: f64,
    pub start_date: String,
    pub end_date: String,
}

/// Render the budget creation page, defaulting the period to the current month.
pub async fn get_new_budget_page(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, CategoryKind::Expense, &connection)
        .inspect_err(|error| tracing::error!("could not get expense categories: {error}"))?;

    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (new_budget_form_view(&categories, today, "")) }
    };

    Ok(base("Create Budget", &[peso_input_styles()], &content).into_response())
}

/// Handle budget creation form submission.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let (start_date, end_date) = match (
        parse_date_input(&form.start_date),
        parse_date_input(&form.end_date),
    ) {
        (Ok(start_date), Ok(end_date)) => (start_date, end_date),
        (Err(error), _) | (_, Err(error)) => return error.into_alert_response(),
    };

    let expense_category_id = match form.expense_category_id.trim() {
        "" => None,
        raw_id => match raw_id.parse::<CategoryId>() {
            Ok(id) => Some(id),
            Err(error) => {
                tracing::debug!("invalid expense category ID {raw_id}: {error}");
                return Error::NotFound.into_alert_response();
            }
        },
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let name = match Name::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            let categories = match get_categories(user_id, CategoryKind::Expense, &connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_alert_response(),
            };
            return new_budget_form_view(&categories, start_date, &format!("Error: {error}"))
                .into_response();
        }
    };

    let new_budget = NewBudget {
        name,
        expense_category_id,
        amount: form.amount,
        alert_threshold: form.alert_threshold / 100.0,
        start_date,
        end_date,
    };

    match create_budget(user_id, new_budget, &connection) {
        Ok(budget) => {
            tracing::info!("User {user_id} created budget {}", budget.id);
            record_activity(
                user_id,
                ActivityAction::BudgetCreated,
                budget.id,
                budget.name.as_ref(),
                &connection,
            );
            (
                HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(
            error @ (Error::InvalidAmount(_)
            | Error::InvalidThreshold(_)
            | Error::InvalidDateRange
            | Error::NotFound),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");
            error.into_alert_response()
        }
    }
}

fn month_bounds(date: Date) -> (Date, Date) {
    let days_in_month = date.month().length(date.year());

    (
        date.replace_day(1).unwrap_or(date),
        date.replace_day(days_in_month).unwrap_or(date),
    )
}

fn new_budget_form_view(categories: &[Category], today: Date, error_message: &str) -> Markup {
    let (start_date, end_date) = month_bounds(today);
    let default_threshold = format!("{:.0}", DEFAULT_ALERT_THRESHOLD * 100.0);

    html! {
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Budget Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Groceries"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="expense_category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    id="expense_category_id"
                    name="expense_category_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All spending" }

                    @for category in categories {
                        option value=(category.id)
                        {
                            @if let Some(icon) = &category.icon { (icon) " " }
                            (category.name)
                        }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Limit" }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="alert_threshold" class=(FORM_LABEL_STYLE) { "Alert at (% of limit)" }

                input
                    id="alert_threshold"
                    type="number"
                    name="alert_threshold"
                    min="1"
                    max="100"
                    step="1"
                    value=(default_threshold)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="grid grid-cols-2 gap-4"
            {
                div
                {
                    label for="start_date" class=(FORM_LABEL_STYLE) { "Start Date" }

                    input
                        id="start_date"
                        type="date"
                        name="start_date"
                        value=(start_date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="end_date" class=(FORM_LABEL_STYLE) { "End Date" }

                    input
                        id="end_date"
                        type="date"
                        name="end_date"
                        value=(end_date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Budget" }
        }
    }
}
