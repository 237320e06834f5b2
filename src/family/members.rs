//! Endpoints for adding members, changing their roles and removing them.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    activity::{ActivityAction, record_activity, send_notification},
    auth::UserID,
    endpoints,
    family::{
        FamilyRole, FamilyState, add_family_member, change_member_role, remove_family_member,
    },
};

/// The form data for adding a member.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddMemberForm {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: FamilyRole,
}

fn default_role() -> FamilyRole {
    FamilyRole::Member
}

/// The form data for changing a member's role.
#[derive(Debug, Serialize, Deserialize)]
pub struct RoleForm {
    pub role: FamilyRole,
}

fn redirect_to_family_page() -> Response {
    (
        HxRedirect(endpoints::FAMILY_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// Handle an expected family error with an alert and log anything else.
fn family_error_response(error: Error, context: &str) -> Response {
    match error {
        error @ (Error::PermissionDenied(_)
        | Error::InvalidRoleChange(_)
        | Error::AlreadyInFamily
        | Error::UnknownEmail(_)
        | Error::NotFound) => error.into_alert_response(),
        error => {
            tracing::error!("An unexpected error occurred while {context}: {error}");
            error.into_alert_response()
        }
    }
}

/// Add a registered user to the current user's family.
pub async fn add_member_endpoint(
    State(state): State<FamilyState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<AddMemberForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match add_family_member(user_id, &form.email, form.role, &connection) {
        Ok(member) => {
            tracing::info!(
                "User {user_id} added user {} to their family as {}",
                member.user_id,
                member.role
            );
            record_activity(
                user_id,
                ActivityAction::MemberAdded,
                member.user_id.as_i64(),
                &format!("{} as {}", member.email, member.role),
                &connection,
            );
            send_notification(
                member.user_id,
                "You joined a family",
                &format!("You were added to a family as a {}.", member.role),
                &connection,
            );
            redirect_to_family_page()
        }
        Err(error) => family_error_response(error, "adding a family member"),
    }
}

/// Change the role of the member in the path.
pub async fn change_role_endpoint(
    State(state): State<FamilyState>,
    Extension(user_id): Extension<UserID>,
    Path(target): Path<i64>,
    Form(form): Form<RoleForm>,
) -> Response {
    let target = UserID::new(target);
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match change_member_role(user_id, target, form.role, &connection) {
        Ok(()) => {
            tracing::info!("User {user_id} changed the role of user {target} to {}", form.role);
            record_activity(
                user_id,
                ActivityAction::RoleChanged,
                target.as_i64(),
                form.role.as_str(),
                &connection,
            );
            send_notification(
                target,
                "Your family role changed",
                &format!("You are now a family {}.", form.role),
                &connection,
            );
            redirect_to_family_page()
        }
        Err(error) => family_error_response(error, "changing a member's role"),
    }
}

/// Remove the member in the path from the current user's family.
pub async fn remove_member_endpoint(
    State(state): State<FamilyState>,
    Extension(user_id): Extension<UserID>,
    Path(target): Path<i64>,
) -> Response {
    let target = UserID::new(target);
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match remove_family_member(user_id, target, &connection) {
        Ok(()) => {
            tracing::info!("User {user_id} removed user {target} from their family");
            record_activity(
                user_id,
                ActivityAction::MemberRemoved,
                target.as_i64(),
                "",
                &connection,
            );
            if target != user_id {
                send_notification(
                    target,
                    "Removed from family",
                    "You are no longer a member of your family.",
                    &connection,
                );
            }
            redirect_to_family_page()
        }
        Err(error) => family_error_response(error, "removing a family member"),
    }
}
