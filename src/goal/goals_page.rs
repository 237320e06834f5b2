//! Lists the goals a user can see, with their progress.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    auth::UserID,
    endpoints,
    goal::{Goal, GoalState, GoalStatus, get_visible_goals},
    html::{
        BADGE_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, WARNING_BADGE_STYLE, base,
        currency, progress_bar,
    },
    navigation::NavBar,
};

/// A card with the goal's name, progress bar and amounts.
pub fn goal_card(goal: &Goal) -> Markup {
    let status_style = match goal.status {
        GoalStatus::InProgress => BADGE_STYLE,
        GoalStatus::Completed | GoalStatus::Cancelled => WARNING_BADGE_STYLE,
    };

    html! {
        li class=(CARD_STYLE) data-goal-id=(goal.id)
        {
            div class="flex justify-between items-start gap-2 mb-2"
            {
                h3 class="font-semibold" { (goal.name) }

                div class="flex gap-1"
                {
                    @if goal.is_family_goal() {
                        span class=(BADGE_STYLE) { "Family" }
                    }
                    span class=(status_style) { (goal.status) }
                }
            }

            (progress_bar(goal.progress_percentage(), 100.0))

            p class="mt-2 text-sm"
            {
                (currency(goal.current_amount)) " of " (currency(goal.target_amount))
                @if goal.status == GoalStatus::InProgress {
                    " · " (currency(goal.remaining())) " to go"
                }
            }

            @if let Some(target_date) = goal.target_date {
                p class="text-xs text-gray-500 dark:text-gray-400"
                {
                    "Target date: " time datetime=(target_date) { (target_date) }
                }
            }
        }
    }
}

/// Render the goals page.
pub async fn get_goals_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_visible_goals(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get goals: {error}"))?;

    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-3xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Goals" }

                    a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "Add Goal" }
                }

                ul class="space-y-4"
                {
                    @for goal in &goals {
                        (goal_card(goal))
                    }
                }

                @if goals.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        "No goals yet. Create a goal "
                        a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "here" }
                        "."
                    }
                }
            }
        }
    };

    Ok(base("Goals", &[], &content).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        goal::{GoalState, NewGoal, adjust_goal_progress, create_goal},
        name::Name,
        test_utils::{
            assert_valid_html, create_test_user, get_test_connection, parse_html_document,
        },
    };

    use super::get_goals_page;

    #[tokio::test]
    async fn lists_goals_with_remaining_amount() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        let goal = create_goal(
            user_id,
            NewGoal {
                name: Name::new_unchecked("Bike"),
                target_amount: 900.0,
                target_date: None,
                is_family_goal: false,
            },
            &connection,
        )
        .unwrap();
        adjust_goal_progress(goal.id, 100.0, &connection).unwrap();
        let state = GoalState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_goals_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let card = html
            .select(&Selector::parse("li[data-goal-id]").unwrap())
            .next()
            .expect("no goal card")
            .text()
            .collect::<String>();
        assert!(card.contains("Bike"), "got {card}");
        assert!(card.contains("800.00 to go"), "got {card}");
    }
}
