use std::fmt::Display;

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{Error, auth::UserID};

/// Something a user did that is written to the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    TransactionCreated,
    TransactionUpdated,
    TransactionDeleted,
    GoalCreated,
    GoalCompleted,
    BudgetCreated,
    BudgetThresholdCrossed,
    FamilyCreated,
    FamilyDeleted,
    MemberAdded,
    RoleChanged,
    MemberRemoved,
}

impl ActivityAction {
    /// The value stored in the `action` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::TransactionCreated => "transaction_created",
            ActivityAction::TransactionUpdated => "transaction_updated",
            ActivityAction::TransactionDeleted => "transaction_deleted",
            ActivityAction::GoalCreated => "goal_created",
            ActivityAction::GoalCompleted => "goal_completed",
            ActivityAction::BudgetCreated => "budget_created",
            ActivityAction::BudgetThresholdCrossed => "budget_threshold_crossed",
            ActivityAction::FamilyCreated => "family_created",
            ActivityAction::FamilyDeleted => "family_deleted",
            ActivityAction::MemberAdded => "member_added",
            ActivityAction::RoleChanged => "role_changed",
            ActivityAction::MemberRemoved => "member_removed",
        }
    }

    /// The kind of record the action was performed on.
    pub fn entity_type(self) -> &'static str {
        match self {
            ActivityAction::TransactionCreated
            | ActivityAction::TransactionUpdated
            | ActivityAction::TransactionDeleted => "transaction",
            ActivityAction::GoalCreated | ActivityAction::GoalCompleted => "goal",
            ActivityAction::BudgetCreated | ActivityAction::BudgetThresholdCrossed => "budget",
            ActivityAction::FamilyCreated | ActivityAction::FamilyDeleted => "family",
            ActivityAction::MemberAdded
            | ActivityAction::RoleChanged
            | ActivityAction::MemberRemoved => "family_member",
        }
    }
}

impl Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row in the audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: i64,
    pub user_id: UserID,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub details: String,
    pub created_at: OffsetDateTime,
}

/// A message shown to a user on their dashboard until they dismiss it.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub user_id: UserID,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

/// Create the activity log and notification tables.
pub fn create_activity_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS activity_log (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            action TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id INTEGER NOT NULL,
            details TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS notifications (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Append an entry to the audit log.
pub fn log_activity(
    user_id: UserID,
    action: ActivityAction,
    entity_id: i64,
    details: &str,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO activity_log (user_id, action, entity_type, entity_id, details, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id.as_i64(),
            action.as_str(),
            action.entity_type(),
            entity_id,
            details,
            OffsetDateTime::now_utc()
        ],
    )?;

    Ok(())
}

/// Queue a notification for `user_id`.
pub fn notify(
    user_id: UserID,
    title: &str,
    message: &str,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO notifications (user_id, title, message, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![user_id.as_i64(), title, message, OffsetDateTime::now_utc()],
    )?;

    Ok(())
}

/// [log_activity], logging and discarding any error.
pub fn record_activity(
    user_id: UserID,
    action: ActivityAction,
    entity_id: i64,
    details: &str,
    connection: &Connection,
) {
    if let Err(error) = log_activity(user_id, action, entity_id, details, connection) {
        tracing::warn!("could not log {action} for user {user_id}: {error}");
    }
}

/// [notify], logging and discarding any error.
pub fn send_notification(user_id: UserID, title: &str, message: &str, connection: &Connection) {
    if let Err(error) = notify(user_id, title, message, connection) {
        tracing::warn!("could not send notification \"{title}\" to user {user_id}: {error}");
    }
}

fn map_row_to_notification(row: &Row) -> Result<Notification, rusqlite::Error> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        message: row.get(3)?,
        is_read: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Get the user's unread notifications, newest first.
pub fn get_unread_notifications(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Notification>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, message, is_read, created_at FROM notifications
            WHERE user_id = ?1 AND is_read = 0
            ORDER BY id DESC",
        )?
        .query_map([user_id.as_i64()], map_row_to_notification)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Mark all of the user's notifications as read and return how many changed.
pub fn mark_notifications_read(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute(
            "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
            [user_id.as_i64()],
        )
        .map_err(Error::from)
}

/// Get the user's `limit` most recent audit log entries, newest first.
pub fn get_recent_activity(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Activity>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, action, entity_type, entity_id, details, created_at
            FROM activity_log
            WHERE user_id = ?1
            ORDER BY id DESC
            LIMIT ?2",
        )?
        .query_map(params![user_id.as_i64(), limit], |row| {
            Ok(Activity {
                id: row.get(0)?,
                user_id: UserID::new(row.get(1)?),
                action: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                details: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}
