//! Families share savings goals under role-based access control.

mod core;
mod family_page;
mod lifecycle;
mod members;
mod permissions;

pub use core::{
    Family, FamilyMember, FamilyRole, Membership, add_family_member, change_member_role,
    create_family, create_family_tables, delete_family, get_family, get_family_members,
    get_membership, remove_family_member,
};
pub use family_page::get_family_page;
pub use lifecycle::{create_family_endpoint, delete_family_endpoint};
pub use members::{add_member_endpoint, change_role_endpoint, remove_member_endpoint};
pub use permissions::{FamilyAction, PermissionDenied, check_permission, is_allowed};

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

/// The state needed by the family page and endpoints.
#[derive(Debug, Clone)]
pub struct FamilyState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for FamilyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
