//! Role-based access control for families.
//!
//! Permissions are a pure function of the user's role and the action, so the
//! caller re-reads the role from the database on every request and role
//! changes apply immediately.

use std::fmt::Display;

use crate::{Error, family::FamilyRole};

/// The things a family member may try to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyAction {
    ViewGoals,
    ContributeToGoal,
    CreateFamilyGoal,
    InviteMembers,
    ManageRoles,
    RemoveMembers,
    DeleteFamily,
}

impl FamilyAction {
    fn description(self) -> &'static str {
        match self {
            FamilyAction::ViewGoals => "view family goals",
            FamilyAction::ContributeToGoal => "contribute to family goals",
            FamilyAction::CreateFamilyGoal => "create family goals",
            FamilyAction::InviteMembers => "add family members",
            FamilyAction::ManageRoles => "change member roles",
            FamilyAction::RemoveMembers => "remove family members",
            FamilyAction::DeleteFamily => "delete the family",
        }
    }

    /// The least privileged role that may perform the action.
    fn minimum_role(self) -> FamilyRole {
        match self {
            FamilyAction::ViewGoals => FamilyRole::Viewer,
            FamilyAction::ContributeToGoal => FamilyRole::Member,
            FamilyAction::CreateFamilyGoal
            | FamilyAction::InviteMembers
            | FamilyAction::ManageRoles
            | FamilyAction::RemoveMembers => FamilyRole::Admin,
            FamilyAction::DeleteFamily => FamilyRole::Owner,
        }
    }
}

/// Whether a user with `role` may perform `action`.
///
/// `None` means the user is not in a family and is denied everything.
pub fn is_allowed(role: Option<FamilyRole>, action: FamilyAction) -> bool {
    match role {
        Some(role) => role >= action.minimum_role(),
        None => false,
    }
}

/// Why a family action was refused.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionDenied {
    pub action: FamilyAction,
    /// The user's role, or `None` if they are not in a family.
    pub role: Option<FamilyRole>,
}

impl PermissionDenied {
    /// What the user can do to get the permission.
    pub fn remediation(&self) -> &'static str {
        if self.role.is_none() {
            return "Create a family or ask a family admin to add you.";
        }

        match self.action.minimum_role() {
            FamilyRole::Viewer | FamilyRole::Member => {
                "Ask a family admin to change your role to member."
            }
            FamilyRole::Admin => "Ask the family owner to make you an admin.",
            FamilyRole::Owner => "Only the family owner can do this.",
        }
    }
}

impl Display for PermissionDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.role {
            Some(role) => write!(
                f,
                "As a family {role} you cannot {}",
                self.action.description()
            ),
            None => write!(
                f,
                "You need to be in a family to {}",
                self.action.description()
            ),
        }
    }
}

/// Check that a user with `role` may perform `action`.
pub fn check_permission(
    role: Option<FamilyRole>,
    action: FamilyAction,
) -> Result<(), PermissionDenied> {
    if is_allowed(role, action) {
        Ok(())
    } else {
        Err(PermissionDenied { action, role })
    }
}

/// Check that a member with `actor_role` may change a member with
/// `target_role` to `new_role`.
///
/// # Errors
/// - [Error::PermissionDenied] if the actor cannot manage roles at all,
/// - [Error::InvalidRoleChange] if the change would assign or remove the owner
///   role, or touches the admin role without the actor being the owner.
pub fn check_role_change(
    actor_role: Option<FamilyRole>,
    target_role: FamilyRole,
    new_role: FamilyRole,
) -> Result<(), Error> {
    check_permission(actor_role, FamilyAction::ManageRoles)?;

    if new_role == FamilyRole::Owner {
        return Err(Error::InvalidRoleChange(
            "nobody can be made the family owner".to_owned(),
        ));
    }

    if target_role == FamilyRole::Owner {
        return Err(Error::InvalidRoleChange(
            "the family owner's role cannot be changed".to_owned(),
        ));
    }

    let touches_admin = target_role == FamilyRole::Admin || new_role == FamilyRole::Admin;
    if touches_admin && actor_role != Some(FamilyRole::Owner) {
        return Err(Error::InvalidRoleChange(
            "only the family owner can promote or demote admins".to_owned(),
        ));
    }

    Ok(())
}
