//! Goal creation page and endpoint.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    activity::{ActivityAction, record_activity},
    auth::UserID,
    endpoints,
    family::{FamilyAction, get_membership, is_allowed},
    goal::{GoalState, NewGoal, create_goal},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        base, peso_input_styles,
    },
    name::Name,
    navigation::NavBar,
    timezone::parse_date_input,
};

/// The form data for a new goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoalForm {
    pub name: String,
    pub target_amount: f64,
    /// An ISO date, or empty for no target date.
    #[serde(default)]
    pub target_date: String,
    /// Checkbox, set when the goal is shared with the family.
    pub is_family_goal: Option<String>,
}

/// Render the goal creation page.
///
/// The family checkbox is only shown to users who may create family goals.
pub async fn get_new_goal_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let role = get_membership(user_id, &connection)?.map(|membership| membership.role);
    let can_share = is_allowed(role, FamilyAction::CreateFamilyGoal);

    let nav_bar = NavBar::new(endpoints::NEW_GOAL_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (new_goal_form_view(can_share, "")) }
    };

    Ok(base("Create Goal", &[peso_input_styles()], &content).into_response())
}

/// Handle goal creation form submission.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GoalForm>,
) -> Response {
    let is_family_goal = form.is_family_goal.is_some();

    let target_date = match form.target_date.trim() {
        "" => None,
        raw_date => match parse_date_input(raw_date) {
            Ok(date) => Some(date),
            Err(error) => return error.into_alert_response(),
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
            let can_share = match get_membership(user_id, &connection) {
                Ok(membership) => is_allowed(
                    membership.map(|membership| membership.role),
                    FamilyAction::CreateFamilyGoal,
                ),
                Err(error) => return error.into_alert_response(),
            };
            return new_goal_form_view(can_share, &format!("Error: {error}")).into_response();
        }
    };

    let new_goal = NewGoal {
        name,
        target_amount: form.target_amount,
        target_date,
        is_family_goal,
    };

    match create_goal(user_id, new_goal, &connection) {
        Ok(goal) => {
            tracing::info!("User {user_id} created goal {}", goal.id);
            record_activity(
                user_id,
                ActivityAction::GoalCreated,
                goal.id,
                goal.name.as_ref(),
                &connection,
            );
            (
                HxRedirect(endpoints::GOALS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ (Error::InvalidAmount(_) | Error::PermissionDenied(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a goal: {error}");
            error.into_alert_response()
        }
    }
}

fn new_goal_form_view(can_share: bool, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::GOALS_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Goal Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Emergency Fund"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="target_amount" class=(FORM_LABEL_STYLE) { "Target Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        id="target_amount"
                        type="number"
                        name="target_amount"
                        step="0.01"
                        min="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="target_date" class=(FORM_LABEL_STYLE) { "Target Date (optional)" }

                input
                    id="target_date"
                    type="date"
                    name="target_date"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if can_share {
                div class="flex items-center gap-2"
                {
                    input id="is_family_goal" type="checkbox" name="is_family_goal";
                    label for="is_family_goal" class="text-sm" { "Share with my family" }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Goal" }
        }
    }
}
