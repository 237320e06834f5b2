//! Budgets cap spending in an expense category over a period.

mod budgets_page;
mod core;
mod create;

pub use budgets_page::{budget_card, get_budgets_page};
pub use core::{
    Budget, BudgetStatus, DEFAULT_ALERT_THRESHOLD, NewBudget, adjust_budget_spent, create_budget,
    create_budget_table, get_budget, get_budgets, percentage_of, status_at,
};
pub use create::{create_budget_endpoint, get_new_budget_page};

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

/// The state needed by the budget pages and endpoint.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Manila".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}
