//! Savings goals and their progress.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, params,
    types::{FromSqlError, Type},
};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::{FamilyId, GoalId},
    family::{FamilyAction, check_permission, get_membership},
    money::{MAX_AMOUNT, round_to_centavos},
    name::Name,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
            GoalStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalStatus::InProgress => f.write_str("In progress"),
            GoalStatus::Completed => f.write_str("Completed"),
            GoalStatus::Cancelled => f.write_str("Cancelled"),
        }
    }
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(GoalStatus::InProgress),
            "completed" => Ok(GoalStatus::Completed),
            "cancelled" => Ok(GoalStatus::Cancelled),
            other => Err(format!("unknown goal status \"{other}\"")),
        }
    }
}

/// An amount of money a user, or their family, is saving towards.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: GoalId,
    /// The user that created the goal.
    pub user_id: UserID,
    /// Set for family goals.
    pub family_id: Option<FamilyId>,
    pub name: Name,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: Option<Date>,
    pub status: GoalStatus,
}

impl Goal {
    /// How much is left to save. Negative once the goal is overfunded.
    pub fn remaining(&self) -> f64 {
        round_to_centavos(self.target_amount - self.current_amount)
    }

    /// Progress towards the target as a percentage.
    pub fn progress_percentage(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }

        self.current_amount / self.target_amount * 100.0
    }

    pub fn is_family_goal(&self) -> bool {
        self.family_id.is_some()
    }
}

/// The data needed to create a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub name: Name,
    pub target_amount: f64,
    pub target_date: Option<Date>,
    /// Share the goal with the creator's family.
    pub is_family_goal: bool,
}

pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goals (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            family_id INTEGER REFERENCES families(id) ON DELETE SET NULL,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL CHECK (target_amount > 0),
            current_amount REAL NOT NULL DEFAULT 0,
            target_date TEXT,
            status TEXT NOT NULL DEFAULT 'in_progress'
                CHECK (status IN ('in_progress', 'completed', 'cancelled'))
        )",
        (),
    )?;

    Ok(())
}

const GOAL_COLUMNS: &str =
    "id, user_id, family_id, name, target_amount, current_amount, target_date, status";

fn map_row_to_goal(row: &Row) -> Result<Goal, rusqlite::Error> {
    let raw_name: String = row.get(3)?;
    let raw_status: String = row.get(7)?;
    let status = raw_status.parse().map_err(|error: String| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            Type::Text,
            Box::new(FromSqlError::Other(error.into())),
        )
    })?;

    Ok(Goal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        family_id: row.get(2)?,
        name: Name::new_unchecked(&raw_name),
        target_amount: row.get(4)?,
        current_amount: row.get(5)?,
        target_date: row.get(6)?,
        status,
    })
}

/// Create a goal for `user_id`.
///
/// # Errors
/// - [Error::InvalidAmount] if the target is not a positive amount,
/// - [Error::PermissionDenied] if a family goal is requested and the user may
///   not create family goals.
pub fn create_goal(user_id: UserID, new_goal: NewGoal, connection: &Connection) -> Result<Goal, Error> {
    let target_amount = round_to_centavos(new_goal.target_amount);

    if !target_amount.is_finite() || target_amount <= 0.0 || target_amount > MAX_AMOUNT {
        return Err(Error::InvalidAmount(
            "the target amount must be greater than zero".to_owned(),
        ));
    }

    let family_id = if new_goal.is_family_goal {
        let membership = get_membership(user_id, connection)?;
        check_permission(membership.map(|m| m.role), FamilyAction::CreateFamilyGoal)?;
        membership.map(|m| m.family_id)
    } else {
        None
    };

    connection.execute(
        "INSERT INTO goals (user_id, family_id, name, target_amount, target_date)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id.as_i64(),
            family_id,
            new_goal.name.as_ref(),
            target_amount,
            new_goal.target_date
        ],
    )?;

    Ok(Goal {
        id: connection.last_insert_rowid(),
        user_id,
        family_id,
        name: new_goal.name,
        target_amount,
        current_amount: 0.0,
        target_date: new_goal.target_date,
        status: GoalStatus::InProgress,
    })
}

/// Get the goals `user_id` can see: their personal goals and their family's goals.
pub fn get_visible_goals(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals
            WHERE (user_id = ?1 AND family_id IS NULL)
                OR family_id = (SELECT family_id FROM family_members WHERE user_id = ?1)
            ORDER BY status = 'in_progress' DESC, name ASC"
        ))?
        .query_map([user_id.as_i64()], map_row_to_goal)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Get a goal regardless of who can see it.
pub fn get_goal(goal_id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .query_row(
            &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"),
            [goal_id],
            map_row_to_goal,
        )
        .map_err(Error::from)
}

/// Add `delta` to the goal's current amount and return the updated goal.
///
/// An in-progress goal that reaches its target is completed, and a completed
/// goal that drops below its target is re-opened. Cancelled goals keep their
/// status.
///
/// # Errors
/// Returns [Error::NotFound] if the goal does not exist.
pub fn adjust_goal_progress(
    goal_id: GoalId,
    delta: f64,
    connection: &Connection,
) -> Result<Goal, Error> {
    let goal = get_goal(goal_id, connection)?;
    let current_amount = round_to_centavos(goal.current_amount + delta);

    let status = match goal.status {
        GoalStatus::InProgress if current_amount >= goal.target_amount => GoalStatus::Completed,
        GoalStatus::Completed if current_amount < goal.target_amount => GoalStatus::InProgress,
        status => status,
    };

    connection.execute(
        "UPDATE goals SET current_amount = ?1, status = ?2 WHERE id = ?3",
        params![current_amount, status.as_str(), goal_id],
    )?;

    Ok(Goal {
        current_amount,
        status,
        ..goal
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        family::{FamilyRole, add_family_member, create_family},
        name::Name,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        Goal, GoalStatus, NewGoal, adjust_goal_progress, create_goal, get_goal, get_visible_goals,
    };

    fn new_goal(name: &str, target_amount: f64, is_family_goal: bool) -> NewGoal {
        NewGoal {
            name: Name::new_unchecked(name),
            target_amount,
            target_date: Some(date!(2026 - 12 - 25)),
            is_family_goal,
        }
    }

    #[test]
    fn creates_personal_goal() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        let goal = create_goal(user_id, new_goal("Bike", 900.0, false), &connection).unwrap();

        assert_eq!(goal.family_id, None);
        assert_eq!(goal.status, GoalStatus::InProgress);
        assert_eq!(goal.remaining(), 900.0);
        assert_eq!(get_goal(goal.id, &connection), Ok(goal));
    }

    #[test]
    fn rejects_non_positive_target() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        let result = create_goal(user_id, new_goal("Bike", 0.0, false), &connection);

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn family_goal_requires_permission() {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.ph", &connection);
        let member = create_test_user("member@example.ph", &connection);
        let loner = create_test_user("loner@example.ph", &connection);
        let family = create_family(Name::new_unchecked("Dela Cruz"), owner, &connection).unwrap();
        add_family_member(owner, "member@example.ph", FamilyRole::Member, &connection).unwrap();

        let goal = create_goal(owner, new_goal("House", 1e6, true), &connection).unwrap();
        assert_eq!(goal.family_id, Some(family.id));

        assert!(matches!(
            create_goal(member, new_goal("Car", 1e5, true), &connection),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            create_goal(loner, new_goal("Car", 1e5, true), &connection),
            Err(Error::PermissionDenied(_))
        ));
    }

    #[test]
    fn visible_goals_include_family_goals_only_for_members() {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.ph", &connection);
        let viewer = create_test_user("viewer@example.ph", &connection);
        let outsider = create_test_user("outsider@example.ph", &connection);
        create_family(Name::new_unchecked("Dela Cruz"), owner, &connection).unwrap();
        add_family_member(owner, "viewer@example.ph", FamilyRole::Viewer, &connection).unwrap();
        let house = create_goal(owner, new_goal("House", 1e6, true), &connection).unwrap();
        let bike = create_goal(viewer, new_goal("Bike", 900.0, false), &connection).unwrap();
        create_goal(outsider, new_goal("Phone", 500.0, false), &connection).unwrap();

        let ids = |goals: Vec<Goal>| goals.into_iter().map(|goal| goal.id).collect::<Vec<_>>();

        assert_eq!(
            ids(get_visible_goals(viewer, &connection).unwrap()),
            vec![bike.id, house.id]
        );
        assert_eq!(
            ids(get_visible_goals(owner, &connection).unwrap()),
            vec![house.id]
        );
        assert_eq!(get_visible_goals(outsider, &connection).unwrap().len(), 1);
    }

    #[test]
    fn reaching_target_completes_and_reversal_reopens() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        let goal = create_goal(user_id, new_goal("Bike", 900.0, false), &connection).unwrap();

        let goal_after = adjust_goal_progress(goal.id, 900.0, &connection).unwrap();
        assert_eq!(goal_after.status, GoalStatus::Completed);
        assert_eq!(goal_after.progress_percentage(), 100.0);

        let goal_after = adjust_goal_progress(goal.id, -100.0, &connection).unwrap();
        assert_eq!(goal_after.status, GoalStatus::InProgress);
        assert_eq!(goal_after.current_amount, 800.0);
        assert_eq!(get_goal(goal.id, &connection), Ok(goal_after));
    }
}
