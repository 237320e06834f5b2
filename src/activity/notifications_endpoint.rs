//! The dashboard's notification panel and the endpoint that dismisses it.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    activity::{Notification, mark_notifications_read},
    auth::UserID,
    endpoints,
    html::{CARD_STYLE, LINK_STYLE},
};

/// The state needed to mark notifications as read.
#[derive(Debug, Clone)]
pub struct NotificationsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NotificationsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A card listing `notifications` with a button that marks them all as read.
///
/// Renders nothing when there are no notifications.
pub fn notifications_panel(notifications: &[Notification]) -> Markup {
    html! {
        @if !notifications.is_empty() {
            section id="notifications" class=(CARD_STYLE)
            {
                header class="flex justify-between items-center mb-2"
                {
                    h2 class="text-lg font-semibold" { "Notifications" }

                    button
                        type="button"
                        hx-post=(endpoints::READ_NOTIFICATIONS)
                        hx-target="#notifications"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        class=(LINK_STYLE)
                    {
                        "Mark all as read"
                    }
                }

                ul class="space-y-2"
                {
                    @for notification in notifications {
                        li
                        {
                            p class="font-medium" { (notification.title) }
                            p class="text-sm text-gray-600 dark:text-gray-300" { (notification.message) }
                        }
                    }
                }
            }
        }
    }
}

/// Mark all of the user's notifications as read and replace the panel with nothing.
pub async fn mark_notifications_read_endpoint(
    State(state): State<NotificationsState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match mark_notifications_read(user_id, &connection) {
        Ok(count) => {
            tracing::debug!("Marked {count} notifications as read for user {user_id}");
            notifications_panel(&[]).into_response()
        }
        Err(error) => {
            tracing::error!("could not mark notifications as read: {error}");
            error.into_alert_response()
        }
    }
}
