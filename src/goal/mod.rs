//! Personal and family savings goals.

mod core;
mod create;
mod goals_page;

pub use core::{
    Goal, GoalStatus, NewGoal, adjust_goal_progress, create_goal, create_goal_table, get_goal,
    get_visible_goals,
};
pub use create::{create_goal_endpoint, get_new_goal_page};
pub use goals_page::{get_goals_page, goal_card};

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

/// The state needed by the goal pages and endpoint.
#[derive(Debug, Clone)]
pub struct GoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
