//! The review step of the transaction form and the way back to the form.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, WARNING_BADGE_STYLE, currency,
        loading_spinner,
    },
    transaction::{
        TransactionState,
        flow::{FormEvent, FormStep},
        form::{TransactionFormData, transaction_form_view},
        validation::{Review, ReferenceData, validate_transaction},
    },
};

/// Check that `event` may happen at the form's current step and validate the draft.
///
/// When editing, the stored transaction's effects are taken out of the
/// reference data before validating.
pub(super) fn validate_form(
    user_id: UserID,
    form: &TransactionFormData,
    event: FormEvent,
    connection: &Connection,
) -> Result<(Review, ReferenceData), Error> {
    form.step.transition(event)?;
    let draft = form.to_draft()?;
    let reference = ReferenceData::load_for_form(user_id, form.transaction_id, connection)?;
    let review = validate_transaction(&draft, &reference)?;

    Ok((review, reference))
}

/// Validate the draft and render the review step, or respond with an alert
/// explaining why the draft is invalid.
pub async fn review_transaction_endpoint(
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

    match validate_form(user_id, &form, FormEvent::Review, &connection) {
        Ok((review, reference)) => {
            review_view(form.transaction_id, &review, &reference).into_response()
        }
        Err(error) => {
            tracing::debug!("transaction draft from user {user_id} failed review: {error}");
            error.into_alert_response()
        }
    }
}

/// Go back from the review step to the form, keeping the entered values.
pub async fn back_to_form_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    if let Err(error) = form.step.transition(FormEvent::Back) {
        return error.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let reference = match ReferenceData::load_for_form(user_id, form.transaction_id, &connection)
    {
        Ok(reference) => reference,
        Err(error) => return error.into_alert_response(),
    };

    let form = TransactionFormData {
        step: FormStep::Form,
        acknowledged: false,
        ..form
    };

    transaction_form_view(&form, &reference).into_response()
}

fn name_of<'a, T>(
    items: &'a [T],
    id: Option<i64>,
    get_id: impl Fn(&T) -> i64,
    get_name: impl Fn(&'a T) -> &'a str,
) -> Option<&'a str> {
    let id = id?;
    items.iter().find(|item| get_id(item) == id).map(get_name)
}

fn review_view(
    transaction_id: Option<i64>,
    review: &Review,
    reference: &ReferenceData,
) -> Markup {
    let transaction = &review.transaction;
    let account_name = name_of(
        &reference.accounts,
        Some(transaction.account_id),
        |account| account.id,
        |account| account.name.as_ref(),
    );
    let category_name = name_of(
        reference.categories_for(transaction.type_),
        transaction.category_id,
        |category| category.id,
        |category| category.name.as_ref(),
    );
    let goal_name = name_of(
        &reference.goals,
        transaction.goal_id,
        |goal| goal.id,
        |goal| goal.name.as_ref(),
    );
    let budget_name = name_of(
        &reference.budgets,
        transaction.budget_id,
        |budget| budget.id,
        |budget| budget.name.as_ref(),
    );
    let submit_post = transaction_id
        .is_none()
        .then_some(endpoints::TRANSACTIONS_API.to_owned());
    let submit_put = transaction_id.map(|id| format_endpoint(endpoints::TRANSACTION, id));
    let spinner = loading_spinner();

    html! {
        form
            id="review-form"
            hx-post=[submit_post]
            hx-put=[submit_put]
            hx-target="#transaction-form-container"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            input type="hidden" name="step" value=(FormStep::Review);
            @if let Some(transaction_id) = transaction_id {
                input type="hidden" name="transaction_id" value=(transaction_id);
            }
            input type="hidden" name="type_" value=(transaction.type_);
            input type="hidden" name="amount" value=(format!("{:.2}", transaction.amount));
            input type="hidden" name="date" value=(transaction.date);
            input type="hidden" name="description" value=(transaction.description);
            input type="hidden" name="account_id" value=(transaction.account_id);
            input type="hidden" name="category" value=[transaction.category()];
            input type="hidden" name="goal_id" value=[transaction.goal_id];
            input type="hidden" name="budget_id" value=[transaction.budget_id];

            h3 class="text-lg font-semibold" { "Review Transaction" }

            dl id="review-summary" class="grid grid-cols-2 gap-2 text-sm"
            {
                dt class="font-medium" { "Type" }
                dd class="capitalize" { (transaction.type_) }

                dt class="font-medium" { "Amount" }
                dd { (currency(transaction.amount)) }

                dt class="font-medium" { "Date" }
                dd { time datetime=(transaction.date) { (transaction.date) } }

                dt class="font-medium" { "Account" }
                dd { (account_name.unwrap_or("-")) }

                dt class="font-medium" { "Category" }
                dd { (category_name.unwrap_or("-")) }

                @if let Some(goal_name) = goal_name {
                    dt class="font-medium" { "Goal" }
                    dd { (goal_name) }
                }

                @if let Some(budget_name) = budget_name {
                    dt class="font-medium" { "Budget" }
                    dd { (budget_name) }
                }

                @if !transaction.description.is_empty() {
                    dt class="font-medium" { "Description" }
                    dd { (transaction.description) }
                }
            }

            @if review.needs_confirmation() {
                section id="confirmations" class="space-y-2"
                {
                    ul class="space-y-2"
                    {
                        @for confirmation in &review.confirmations {
                            li class=(WARNING_BADGE_STYLE) { (confirmation.to_string()) }
                        }
                    }

                    div class="flex items-center gap-2"
                    {
                        input id="acknowledged" type="checkbox" name="acknowledged" value="true" required;
                        label for="acknowledged" class="text-sm"
                        {
                            "I understand, record this transaction anyway"
                        }
                    }
                }
            }

            div class="flex gap-4"
            {
                button
                    type="button"
                    hx-post=(endpoints::TRANSACTION_FORM)
                    hx-target="#transaction-form-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Back"
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Submit"
                }
            }
        }
    }
}
