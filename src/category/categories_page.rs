//! Lists the user's income and expense categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, CategoryKind, get_categories},
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base},
    navigation::NavBar,
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the categories page with one table per kind.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let income = get_categories(user_id, CategoryKind::Income, &connection)
        .inspect_err(|error| tracing::error!("could not get income categories: {error}"))?;
    let expense = get_categories(user_id, CategoryKind::Expense, &connection)
        .inspect_err(|error| tracing::error!("could not get expense categories: {error}"))?;

    Ok(categories_view(&income, &expense).into_response())
}

fn categories_table(title: &str, categories: &[Category]) -> Markup {
    html! {
        section class="space-y-2"
        {
            h2 class="text-lg font-semibold" { (title) }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Icon" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                    }
                }

                tbody
                {
                    @for category in categories {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (category.icon.as_deref().unwrap_or("")) }
                            th
                                scope="row"
                                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                            {
                                (category.name)
                            }
                        }
                    }

                    @if categories.is_empty() {
                        tr
                        {
                            td colspan="2" class="px-6 py-4 text-center"
                            {
                                "No categories yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn categories_view(income: &[Category], expense: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE)
                    {
                        "Add Category"
                    }
                }

                (categories_table("Income", income))
                (categories_table("Expenses", expense))
            }
        }
    };

    base("Categories", &[], &content)
}
