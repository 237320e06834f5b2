//! Dashboard route handler and view rendering.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    Error,
    account::get_total_account_balance,
    activity::{
        Activity, Notification, get_recent_activity, get_unread_notifications, notifications_panel,
    },
    auth::UserID,
    budget::{Budget, budget_card, get_budgets},
    category::{CategoryKind, get_categories},
    dashboard::{DashboardState, insights_view::insights_section},
    endpoints,
    goal::{Goal, GoalStatus, get_visible_goals, goal_card},
    html::{CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, currency},
    insights::{DataQuality, FinancialProfile, Insight, assess_data_quality, generate_insights},
    navigation::NavBar,
    transaction::get_transactions,
};

const RECENT_ACTIVITY_LIMIT: u32 = 5;

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    total_balance: f64,
    budgets: Vec<Budget>,
    goals: Vec<Goal>,
    notifications: Vec<Notification>,
    recent_activity: Vec<Activity>,
    data_quality: DataQuality,
    insights: Vec<Insight>,
}

/// Fetches and builds all data needed for the dashboard display.
///
/// # Errors
/// Returns an error if any of the database queries fail.
fn build_dashboard_data(user_id: UserID, connection: &Connection) -> Result<DashboardData, Error> {
    let total_balance = get_total_account_balance(user_id, connection)?;
    let budgets = get_budgets(user_id, connection)?;
    let goals = get_visible_goals(user_id, connection)?
        .into_iter()
        .filter(|goal| goal.status == GoalStatus::InProgress)
        .collect();
    let notifications = get_unread_notifications(user_id, connection)?;
    let recent_activity = get_recent_activity(user_id, RECENT_ACTIVITY_LIMIT, connection)?;

    let transactions = get_transactions(user_id, connection)?;
    let expense_categories = get_categories(user_id, CategoryKind::Expense, connection)?;
    let data_quality = assess_data_quality(&transactions);
    let insights = if data_quality.is_sufficient() {
        let profile = FinancialProfile::from_transactions(&transactions, &expense_categories);
        generate_insights(&profile)
    } else {
        Vec::new()
    };

    Ok(DashboardData {
        total_balance,
        budgets,
        goals,
        notifications,
        recent_activity,
        data_quality,
        insights,
    })
}

fn section_header(title: &str, link_url: &str, link_text: &str) -> Markup {
    html! {
        header class="flex justify-between flex-wrap items-end"
        {
            h2 class="text-lg font-semibold" { (title) }
            a href=(link_url) class=(LINK_STYLE) { (link_text) }
        }
    }
}

fn recent_activity_view(activity: &[Activity]) -> Markup {
    html! {
        section id="recent-activity" class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Recent Activity" }

            @if activity.is_empty() {
                p class="text-sm" { "Nothing yet." }
            } @else {
                ul class="space-y-1 text-sm"
                {
                    @for entry in activity {
                        li
                        {
                            span class="font-medium" { (entry.action.replace('_', " ")) }
                            @if !entry.details.is_empty() {
                                ": " (entry.details)
                            }
                        }
                    }
                }
            }
        }
    }
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="space-y-8 w-full lg:max-w-5xl"
            {
                (notifications_panel(&data.notifications))

                section id="total-balance" class=(CARD_STYLE)
                {
                    h2 class="text-sm text-gray-600 dark:text-gray-300" { "Total balance" }
                    p class="text-3xl font-bold" { (currency(data.total_balance)) }
                }

                section id="budgets" class="space-y-4"
                {
                    (section_header("Budgets", endpoints::BUDGETS_VIEW, "View all"))

                    @if data.budgets.is_empty() {
                        p class="text-sm"
                        {
                            "No budgets yet. "
                            a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "Create a budget" }
                            "."
                        }
                    } @else {
                        ul class="grid gap-4 md:grid-cols-2"
                        {
                            @for budget in &data.budgets {
                                (budget_card(budget))
                            }
                        }
                    }
                }

                section id="goals" class="space-y-4"
                {
                    (section_header("Goals", endpoints::GOALS_VIEW, "View all"))

                    @if data.goals.is_empty() {
                        p class="text-sm"
                        {
                            "No goals in progress. "
                            a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "Set a goal" }
                            "."
                        }
                    } @else {
                        ul class="grid gap-4 md:grid-cols-2"
                        {
                            @for goal in &data.goals {
                                (goal_card(goal))
                            }
                        }
                    }
                }

                (insights_section(&data.data_quality, &data.insights))

                (recent_activity_view(&data.recent_activity))
            }
        }
    };

    base("Dashboard", &[], &content)
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let data = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        build_dashboard_data(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not build dashboard for user {user_id}: {error}")
        })?
    };

    Ok(dashboard_view(&data).into_response())
}
