//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}/edit', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing accounts.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The page for creating an account.
pub const NEW_ACCOUNT_VIEW: &str = "/accounts/new";
/// The page for listing income and expense categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for listing savings goals.
pub const GOALS_VIEW: &str = "/goals";
/// The page for creating a savings goal.
pub const NEW_GOAL_VIEW: &str = "/goals/new";
/// The page for listing budgets.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for creating a budget.
pub const NEW_BUDGET_VIEW: &str = "/budgets/new";
/// The page for managing the user's family.
pub const FAMILY_VIEW: &str = "/family";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route that validates a draft transaction and renders the review step.
pub const REVIEW_TRANSACTION: &str = "/api/transactions/review";
/// The route that renders the form step again with the draft's values.
pub const TRANSACTION_FORM: &str = "/api/transactions/form";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create accounts.
pub const ACCOUNTS_API: &str = "/api/accounts";
/// The route to make an account the default account.
pub const DEFAULT_ACCOUNT: &str = "/api/accounts/{account_id}/default";
/// The route to create categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to create goals.
pub const GOALS_API: &str = "/api/goals";
/// The route to create budgets.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to create a family.
pub const FAMILY_API: &str = "/api/family";
/// The route to add family members.
pub const FAMILY_MEMBERS: &str = "/api/family/members";
/// The route to change the role of, or remove, a family member.
pub const FAMILY_MEMBER: &str = "/api/family/members/{user_id}";
/// The route to mark all of the user's notifications as read.
pub const READ_NOTIFICATIONS: &str = "/api/notifications/read";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
