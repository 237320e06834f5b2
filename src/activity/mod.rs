//! The audit log and in-app notifications.
//!
//! Writes from the request handlers go through [record_activity] and
//! [send_notification], which log failures instead of returning them so that
//! a broken audit trail never blocks the user's change.

mod core;
mod notifications_endpoint;

pub use core::{
    Activity, ActivityAction, Notification, create_activity_tables, get_recent_activity,
    get_unread_notifications, mark_notifications_read, record_activity, send_notification,
};
pub use notifications_endpoint::{mark_notifications_read_endpoint, notifications_panel};

#[cfg(test)]
pub use core::notify;
