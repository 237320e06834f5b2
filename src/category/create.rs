//! Category creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    category::{CategoryKind, create_category},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    name::Name,
    navigation::NavBar,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for a new category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub kind: CategoryKind,
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view("");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Category", &[], &content).into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let name = match Name::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return new_category_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(user_id, name, Some(&form.icon), form.kind, &connection) {
        Ok(category) => {
            tracing::info!(
                "User {user_id} created {} category {}",
                category.kind,
                category.id
            );
            (
                HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::DuplicateCategoryName(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");
            error.into_alert_response()
        }
    }
}

fn kind_radio(kind: CategoryKind, label: &str, checked: bool) -> Markup {
    let id = format!("kind-{kind}");

    html! {
        div class="flex items-center gap-2"
        {
            input
                id=(id)
                type="radio"
                name="kind"
                value=(kind)
                required
                checked[checked]
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    }
}

fn new_category_form_view(error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="icon" class=(FORM_LABEL_STYLE) { "Icon (optional)" }

                input
                    id="icon"
                    type="text"
                    name="icon"
                    placeholder="🍚"
                    maxlength="8"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset class=(FORM_RADIO_GROUP_STYLE)
            {
                legend class=(FORM_LABEL_STYLE) { "Kind" }
                (kind_radio(CategoryKind::Expense, "Expense", true))
                (kind_radio(CategoryKind::Income, "Income", false))
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}


#[cfg(test)]
mod create_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};

    use crate::{
        auth::UserID,
        category::{CategoryKind, get_categories},
        endpoints,
        test_utils::{
            assert_alert_message, assert_form_error_message, assert_hx_redirect,
            create_test_user, get_test_connection, must_get_form, parse_html_fragment,
        },
    };

    use super::{CategoryForm, CreateCategoryState, create_category_endpoint};

    fn get_state() -> (CreateCategoryState, UserID) {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        (
            CreateCategoryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
        )
    }

    fn form(name: &str, kind: CategoryKind) -> CategoryForm {
        CategoryForm {
            name: name.to_owned(),
            icon: "🍚".to_owned(),
            kind,
        }
    }

    #[tokio::test]
    async fn can_create_category() {
        let (state, user_id) = get_state();

        let response = create_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form("Food", CategoryKind::Expense)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        let categories = get_categories(
            user_id,
            CategoryKind::Expense,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name.as_ref(), "Food");
        assert_eq!(categories[0].icon.as_deref(), Some("🍚"));
    }

    #[tokio::test]
    async fn empty_name_renders_form_error() {
        let (state, user_id) = get_state();

        let response = create_category_endpoint(
            State(state),
            Extension(user_id),
            Form(form("  ", CategoryKind::Income)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: name cannot be empty");
    }

    #[tokio::test]
    async fn duplicate_name_returns_alert() {
        let (state, user_id) = get_state();
        create_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form("Food", CategoryKind::Expense)),
        )
        .await;

        let response = create_category_endpoint(
            State(state),
            Extension(user_id),
            Form(form("food", CategoryKind::Expense)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_alert_message(response, "Duplicate Category Name").await;
    }
}
