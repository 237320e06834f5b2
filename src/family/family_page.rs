//! The family page: create a family, or see and manage its members.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    family::{
        Family, FamilyAction, FamilyMember, FamilyRole, FamilyState, Membership, get_family,
        get_family_members, get_membership, is_allowed,
    },
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
};

/// Render the family page for the current user.
pub async fn get_family_page(
    State(state): State<FamilyState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let content = match get_membership(user_id, &connection)? {
        None => no_family_view(),
        Some(membership) => {
            let family = get_family(membership.family_id, &connection)?;
            let members = get_family_members(membership.family_id, &connection)?;
            family_view(user_id, membership, &family, &members)
        }
    };

    let nav_bar = NavBar::new(endpoints::FAMILY_VIEW).into_html();
    let page = html! {
        (nav_bar)
        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-3xl" { (content) }
        }
    };

    Ok(base("Family", &[], &page).into_response())
}

fn no_family_view() -> Markup {
    html! {
        h1 class="text-xl font-bold" { "Family" }

        p
        {
            "You are not in a family yet. Create one to share savings goals, or ask a family \
            admin to add you using the email you registered with."
        }

        form
            hx-post=(endpoints::FAMILY_API)
            hx-target-error="#alert-container"
            class="space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Family Name" }
                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Dela Cruz Family"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Family" }
        }
    }
}

fn role_options(actor_role: FamilyRole) -> &'static [FamilyRole] {
    if actor_role == FamilyRole::Owner {
        &FamilyRole::ASSIGNABLE
    } else {
        &FamilyRole::ASSIGNABLE[..2]
    }
}

fn role_select(id: &str, selected: FamilyRole, options: &[FamilyRole]) -> Markup {
    html! {
        select id=(id) name="role" class=(FORM_TEXT_INPUT_STYLE)
        {
            @for role in options {
                option value=(role) selected[*role == selected] { (role) }
            }
        }
    }
}

/// Whether the member row gets role and remove controls.
fn can_manage(actor_role: FamilyRole, member: &FamilyMember) -> bool {
    member.role != FamilyRole::Owner
        && is_allowed(Some(actor_role), FamilyAction::ManageRoles)
        && (member.role != FamilyRole::Admin || actor_role == FamilyRole::Owner)
}

fn member_row(user_id: UserID, actor_role: FamilyRole, member: &FamilyMember) -> Markup {
    let member_url = format_endpoint(endpoints::FAMILY_MEMBER, member.user_id.as_i64());
    let is_self = member.user_id == user_id;

    html! {
        tr class=(TABLE_ROW_STYLE) data-member-id=(member.user_id)
        {
            th scope="row" class="px-6 py-4 font-medium text-gray-900 dark:text-white"
            {
                (member.email)
                @if is_self { " (you)" }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if can_manage(actor_role, member) && !is_self {
                    form
                        hx-put=(member_url)
                        hx-trigger="change"
                        hx-target-error="#alert-container"
                    {
                        (role_select(
                            &format!("role-{}", member.user_id),
                            member.role,
                            role_options(actor_role),
                        ))
                    }
                } @else {
                    span class=(BADGE_STYLE) { (member.role) }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if is_self && member.role != FamilyRole::Owner {
                    button
                        type="button"
                        hx-delete=(member_url)
                        hx-confirm="Leave this family? You will lose access to its goals."
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    { "Leave" }
                } @else if can_manage(actor_role, member) {
                    button
                        type="button"
                        hx-delete=(member_url)
                        hx-confirm=(format!("Remove {} from the family?", member.email))
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    { "Remove" }
                }
            }
        }
    }
}

fn add_member_form(actor_role: FamilyRole) -> Markup {
    html! {
        form
            hx-post=(endpoints::FAMILY_MEMBERS)
            hx-target-error="#alert-container"
            class=(format!("{CARD_STYLE} space-y-4"))
        {
            h2 class="text-lg font-semibold" { "Add a member" }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }
                input
                    id="email"
                    type="email"
                    name="email"
                    placeholder="name@example.com"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="new-member-role" class=(FORM_LABEL_STYLE) { "Role" }
                (role_select("new-member-role", FamilyRole::Member, role_options(actor_role)))
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Member" }
        }
    }
}

fn family_view(
    user_id: UserID,
    membership: Membership,
    family: &Family,
    members: &[FamilyMember],
) -> Markup {
    let role = membership.role;

    html! {
        header class="flex justify-between flex-wrap items-end gap-2"
        {
            h1 class="text-xl font-bold" { (family.name) }
            span class=(BADGE_STYLE) { "You are the " (role) }
        }

        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Member" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Role" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                }
            }

            tbody
            {
                @for member in members {
                    (member_row(user_id, role, member))
                }
            }
        }

        @if is_allowed(Some(role), FamilyAction::InviteMembers) {
            (add_member_form(role))
        }

        @if is_allowed(Some(role), FamilyAction::DeleteFamily) {
            button
                id="delete-family"
                type="button"
                hx-delete=(endpoints::FAMILY_API)
                hx-confirm="Delete this family? Family goals become personal goals of their creators."
                hx-target-error="#alert-container"
                class=(BUTTON_DELETE_STYLE)
            { "Delete family" }
        }
    }
}
