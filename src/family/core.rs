//! Families, their members and the members' roles.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row, params,
    types::{FromSqlError, Type},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{UserID, get_user_by_email},
    database_id::FamilyId,
    family::permissions::{FamilyAction, PermissionDenied, check_permission, check_role_change},
    name::Name,
};

/// A member's role, from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyRole {
    Viewer,
    Member,
    Admin,
    Owner,
}

impl FamilyRole {
    /// The roles that can be given to a member through the family page.
    pub const ASSIGNABLE: [FamilyRole; 3] =
        [FamilyRole::Viewer, FamilyRole::Member, FamilyRole::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            FamilyRole::Viewer => "viewer",
            FamilyRole::Member => "member",
            FamilyRole::Admin => "admin",
            FamilyRole::Owner => "owner",
        }
    }
}

impl Display for FamilyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FamilyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(FamilyRole::Viewer),
            "member" => Ok(FamilyRole::Member),
            "admin" => Ok(FamilyRole::Admin),
            "owner" => Ok(FamilyRole::Owner),
            other => Err(format!("unknown family role \"{other}\"")),
        }
    }
}

/// A group of users that share savings goals.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    pub id: FamilyId,
    pub name: Name,
    pub created_by: UserID,
    pub created_at: OffsetDateTime,
}

/// A user's place in their family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Membership {
    pub family_id: FamilyId,
    pub role: FamilyRole,
}

/// A row of the family's member list.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyMember {
    pub user_id: UserID,
    pub email: String,
    pub role: FamilyRole,
    pub joined_at: OffsetDateTime,
}

/// Create the families and family_members tables.
pub fn create_family_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS families (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            created_by INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS family_members (
            family_id INTEGER NOT NULL REFERENCES families(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            role TEXT NOT NULL CHECK (role IN ('viewer', 'member', 'admin', 'owner')),
            joined_at TEXT NOT NULL,
            PRIMARY KEY (family_id, user_id)
        )",
        (),
    )?;

    Ok(())
}

fn get_role(row: &Row, index: usize) -> Result<FamilyRole, rusqlite::Error> {
    let raw_role: String = row.get(index)?;

    raw_role.parse().map_err(|error: String| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            Type::Text,
            Box::new(FromSqlError::Other(error.into())),
        )
    })
}

/// Get the family and role of `user_id`, or `None` if they are not in a family.
pub fn get_membership(user_id: UserID, connection: &Connection) -> Result<Option<Membership>, Error> {
    connection
        .query_row(
            "SELECT family_id, role FROM family_members WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| {
                Ok(Membership {
                    family_id: row.get(0)?,
                    role: get_role(row, 1)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
}

pub fn get_family(family_id: FamilyId, connection: &Connection) -> Result<Family, Error> {
    connection
        .query_row(
            "SELECT id, name, created_by, created_at FROM families WHERE id = ?1",
            [family_id],
            |row| {
                let raw_name: String = row.get(1)?;

                Ok(Family {
                    id: row.get(0)?,
                    name: Name::new_unchecked(&raw_name),
                    created_by: UserID::new(row.get(2)?),
                    created_at: row.get(3)?,
                })
            },
        )
        .map_err(Error::from)
}

/// Get the members of a family, most privileged first.
pub fn get_family_members(
    family_id: FamilyId,
    connection: &Connection,
) -> Result<Vec<FamilyMember>, Error> {
    let mut members = connection
        .prepare(
            "SELECT family_members.user_id, users.email, family_members.role, family_members.joined_at
            FROM family_members
            INNER JOIN users ON users.id = family_members.user_id
            WHERE family_members.family_id = ?1
            ORDER BY users.email",
        )?
        .query_map([family_id], |row| {
            Ok(FamilyMember {
                user_id: UserID::new(row.get(0)?),
                email: row.get(1)?,
                role: get_role(row, 2)?,
                joined_at: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    members.sort_by(|a, b| b.role.cmp(&a.role));

    Ok(members)
}

/// Create a family with `creator` as its owner.
///
/// # Errors
/// Returns [Error::AlreadyInFamily] if `creator` is already in a family.
pub fn create_family(name: Name, creator: UserID, connection: &Connection) -> Result<Family, Error> {
    if get_membership(creator, connection)?.is_some() {
        return Err(Error::AlreadyInFamily);
    }

    let created_at = OffsetDateTime::now_utc();
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "INSERT INTO families (name, created_by, created_at) VALUES (?1, ?2, ?3)",
        params![name.as_ref(), creator.as_i64(), created_at],
    )?;
    let family_id = transaction.last_insert_rowid();
    transaction.execute(
        "INSERT INTO family_members (family_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
        params![family_id, creator.as_i64(), FamilyRole::Owner.as_str(), created_at],
    )?;

    transaction.commit()?;

    Ok(Family {
        id: family_id,
        name,
        created_by: creator,
        created_at,
    })
}

/// Add the user registered with `email` to the family of `actor`.
///
/// # Errors
/// - [Error::PermissionDenied] if `actor` may not invite members,
/// - [Error::InvalidRoleChange] if `role` is owner, or admin and `actor` is not the owner,
/// - [Error::UnknownEmail] if nobody is registered with `email`,
/// - [Error::AlreadyInFamily] if the invitee is already in a family.
pub fn add_family_member(
    actor: UserID,
    email: &str,
    role: FamilyRole,
    connection: &Connection,
) -> Result<FamilyMember, Error> {
    let membership = get_membership(actor, connection)?;
    check_permission(membership.map(|m| m.role), FamilyAction::InviteMembers)?;
    let Some(membership) = membership else {
        return Err(Error::NotFound);
    };

    if role == FamilyRole::Owner {
        return Err(Error::InvalidRoleChange(
            "nobody can be made the family owner".to_owned(),
        ));
    }

    if role == FamilyRole::Admin && membership.role != FamilyRole::Owner {
        return Err(Error::InvalidRoleChange(
            "only the family owner can add admins".to_owned(),
        ));
    }

    let invitee = get_user_by_email(email, connection)?
        .ok_or_else(|| Error::UnknownEmail(email.trim().to_owned()))?;

    if get_membership(invitee.id, connection)?.is_some() {
        return Err(Error::AlreadyInFamily);
    }

    let joined_at = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT INTO family_members (family_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
        params![membership.family_id, invitee.id.as_i64(), role.as_str(), joined_at],
    )?;

    Ok(FamilyMember {
        user_id: invitee.id,
        email: invitee.email,
        role,
        joined_at,
    })
}

fn get_member_role_in_family(
    family_id: FamilyId,
    user_id: UserID,
    connection: &Connection,
) -> Result<FamilyRole, Error> {
    connection
        .query_row(
            "SELECT role FROM family_members WHERE family_id = ?1 AND user_id = ?2",
            params![family_id, user_id.as_i64()],
            |row| get_role(row, 0),
        )
        .map_err(Error::from)
}

/// Change the role of `target` in the family of `actor`.
///
/// # Errors
/// See [check_role_change]. Returns [Error::NotFound] if `target` is not in
/// the actor's family.
pub fn change_member_role(
    actor: UserID,
    target: UserID,
    new_role: FamilyRole,
    connection: &Connection,
) -> Result<(), Error> {
    let membership = get_membership(actor, connection)?;
    check_permission(membership.map(|m| m.role), FamilyAction::ManageRoles)?;
    let Some(membership) = membership else {
        return Err(Error::NotFound);
    };

    let target_role = get_member_role_in_family(membership.family_id, target, connection)?;
    check_role_change(Some(membership.role), target_role, new_role)?;

    connection.execute(
        "UPDATE family_members SET role = ?1 WHERE family_id = ?2 AND user_id = ?3",
        params![new_role.as_str(), membership.family_id, target.as_i64()],
    )?;

    Ok(())
}

/// Remove `target` from the family of `actor`.
///
/// Members may always remove themselves, except the owner.
///
/// # Errors
/// - [Error::PermissionDenied] if `actor` may not remove members,
/// - [Error::InvalidRoleChange] if `target` is the owner, or an admin and
///   `actor` is not the owner,
/// - [Error::NotFound] if `target` is not in the actor's family.
pub fn remove_family_member(
    actor: UserID,
    target: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(membership) = get_membership(actor, connection)? else {
        return Err(PermissionDenied {
            action: FamilyAction::RemoveMembers,
            role: None,
        }
        .into());
    };

    let target_role = get_member_role_in_family(membership.family_id, target, connection)?;

    if target_role == FamilyRole::Owner {
        return Err(Error::InvalidRoleChange(
            "the family owner cannot be removed".to_owned(),
        ));
    }

    if actor != target {
        check_permission(Some(membership.role), FamilyAction::RemoveMembers)?;

        if target_role == FamilyRole::Admin && membership.role != FamilyRole::Owner {
            return Err(Error::InvalidRoleChange(
                "only the family owner can remove admins".to_owned(),
            ));
        }
    }

    connection.execute(
        "DELETE FROM family_members WHERE family_id = ?1 AND user_id = ?2",
        params![membership.family_id, target.as_i64()],
    )?;

    Ok(())
}

/// Delete the family of `actor`, returning the ids of the former members.
///
/// Family goals become personal goals of the members who created them.
pub fn delete_family(actor: UserID, connection: &Connection) -> Result<Vec<UserID>, Error> {
    let membership = get_membership(actor, connection)?;
    check_permission(membership.map(|m| m.role), FamilyAction::DeleteFamily)?;
    let Some(membership) = membership else {
        return Err(Error::NotFound);
    };

    let members = get_family_members(membership.family_id, connection)?
        .into_iter()
        .map(|member| member.user_id)
        .collect();

    connection.execute("DELETE FROM families WHERE id = ?1", [membership.family_id])?;

    Ok(members)
}
