//! Endpoints for creating and deleting a family.

use axum::{
    Extension, Form,
    extract::State,
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
    family::{FamilyState, create_family, delete_family, get_membership},
    name::Name,
};

/// The form data for a new family.
#[derive(Debug, Serialize, Deserialize)]
pub struct FamilyForm {
    pub name: String,
}

/// Create a family with the current user as its owner.
pub async fn create_family_endpoint(
    State(state): State<FamilyState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<FamilyForm>,
) -> Response {
    let name = match Name::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_family(name, user_id, &connection) {
        Ok(family) => {
            tracing::info!("User {user_id} created family {}", family.id);
            record_activity(
                user_id,
                ActivityAction::FamilyCreated,
                family.id,
                family.name.as_ref(),
                &connection,
            );
            (
                HxRedirect(endpoints::FAMILY_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::AlreadyInFamily) => Error::AlreadyInFamily.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a family: {error}");
            error.into_alert_response()
        }
    }
}

/// Delete the current user's family. Only the owner may do this.
pub async fn delete_family_endpoint(
    State(state): State<FamilyState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let family_id = match get_membership(user_id, &connection) {
        Ok(membership) => membership.map(|membership| membership.family_id),
        Err(error) => return error.into_alert_response(),
    };

    match delete_family(user_id, &connection) {
        Ok(former_members) => {
            tracing::info!("User {user_id} deleted their family");
            record_activity(
                user_id,
                ActivityAction::FamilyDeleted,
                family_id.unwrap_or_default(),
                "",
                &connection,
            );
            for member in former_members.into_iter().filter(|member| *member != user_id) {
                send_notification(
                    member,
                    "Family deleted",
                    "The owner deleted your family. Shared goals are now personal goals of \
                    the members who created them.",
                    &connection,
                );
            }
            (
                HxRedirect(endpoints::FAMILY_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::PermissionDenied(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting a family: {error}");
            error.into_alert_response()
        }
    }
}
