//! Lists the user's budgets with how much of each has been spent.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetState, BudgetStatus, get_budgets},
    endpoints,
    html::{
        BADGE_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, WARNING_BADGE_STYLE, base,
        currency, progress_bar,
    },
    navigation::NavBar,
};

/// A card with the budget's name, period, spending bar and status.
pub fn budget_card(budget: &Budget) -> Markup {
    let percentage = budget.percentage();
    let (status_text, status_style) = match budget.status() {
        BudgetStatus::OnTrack => ("On track", BADGE_STYLE),
        BudgetStatus::NearLimit => ("Near limit", WARNING_BADGE_STYLE),
        BudgetStatus::OverBudget => ("Over budget", WARNING_BADGE_STYLE),
    };

    html! {
        li class=(CARD_STYLE) data-budget-id=(budget.id)
        {
            div class="flex justify-between items-start gap-2 mb-2"
            {
                div
                {
                    h3 class="font-semibold" { (budget.name) }
                    p class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        time datetime=(budget.start_date) { (budget.start_date) }
                        " to "
                        time datetime=(budget.end_date) { (budget.end_date) }
                    }
                }

                span class=(status_style) data-status=(status_text) { (status_text) }
            }

            (progress_bar(percentage, budget.alert_threshold * 100.0))

            p class="mt-2 text-sm"
            {
                (currency(budget.spent)) " of " (currency(budget.amount))
                " (" (format!("{percentage:.0}")) "%)"
            }
        }
    }
}

/// Render the budgets page.
pub async fn get_budgets_page(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get budgets: {error}"))?;

    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-3xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }

                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "Add Budget" }
                }

                ul class="space-y-4"
                {
                    @for budget in &budgets {
                        (budget_card(budget))
                    }
                }

                @if budgets.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        "No budgets yet. Create a budget "
                        a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "here" }
                        "."
                    }
                }
            }
        }
    };

    Ok(base("Budgets", &[], &content).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        budget::{BudgetState, DEFAULT_ALERT_THRESHOLD, NewBudget, adjust_budget_spent, create_budget},
        name::Name,
        test_utils::{
            assert_valid_html, create_test_user, get_test_connection, parse_html_document,
        },
    };

    use super::get_budgets_page;

    #[tokio::test]
    async fn shows_near_limit_budget() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        let budget = create_budget(
            user_id,
            NewBudget {
                name: Name::new_unchecked("Groceries"),
                expense_category_id: None,
                amount: 1000.0,
                alert_threshold: DEFAULT_ALERT_THRESHOLD,
                start_date: date!(2026 - 10 - 01),
                end_date: date!(2026 - 10 - 31),
            },
            &connection,
        )
        .unwrap();
        adjust_budget_spent(budget.id, 850.0, &connection).unwrap();
        let state = BudgetState {
            local_timezone: "Asia/Manila".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_budgets_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let card = html
            .select(&Selector::parse("li[data-budget-id]").unwrap())
            .next()
            .expect("no budget card");
        let status = card
            .select(&Selector::parse("span[data-status]").unwrap())
            .next()
            .expect("no status badge");
        assert_eq!(status.value().attr("data-status"), Some("Near limit"));
        let text = card.text().collect::<String>();
        assert!(text.contains("(85%)"), "got {text}");
    }

    #[tokio::test]
    async fn shows_empty_message() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        let state = BudgetState {
            local_timezone: "Asia/Manila".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_budgets_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No budgets yet"), "got {text}");
    }
}
