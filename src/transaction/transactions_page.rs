//! Displays the user's transactions with their account, category and goal.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::{Connection, Row, params, types::Type};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, currency,
    },
    navigation::NavBar,
    transaction::{TransactionState, core::TransactionType},
};

/// A transaction joined with the names of the records it refers to.
#[derive(Debug, Clone, PartialEq)]
struct TransactionTableRow {
    id: TransactionId,
    type_: TransactionType,
    amount: f64,
    date: Date,
    description: String,
    account_name: String,
    category_name: Option<String>,
    goal_name: Option<String>,
}

impl TransactionTableRow {
    /// The amount as it affects the account: negative for money going out.
    fn signed_amount(&self) -> f64 {
        self.type_.balance_sign() * self.amount
    }
}

fn map_table_row(row: &Row) -> Result<TransactionTableRow, rusqlite::Error> {
    let raw_type: String = row.get(1)?;
    let type_ = raw_type
        .parse()
        .map_err(|error: String| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, error.into()))?;

    Ok(TransactionTableRow {
        id: row.get(0)?,
        type_,
        amount: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        account_name: row.get(5)?,
        category_name: row.get(6)?,
        goal_name: row.get(7)?,
    })
}

fn get_transaction_table_rows(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<TransactionTableRow>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.type, t.amount, t.date, t.description, a.name,
                COALESCE(ic.name, ec.name), g.name
            FROM transactions t
            INNER JOIN accounts a ON a.id = t.account_id
            LEFT JOIN income_categories ic ON ic.id = t.income_category_id
            LEFT JOIN expense_categories ec ON ec.id = t.expense_category_id
            LEFT JOIN goals g ON g.id = t.goal_id
            WHERE t.user_id = ?1
            ORDER BY t.date DESC, t.id DESC",
        )?
        .query_map(params![user_id.as_i64()], map_table_row)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

fn table_row(row: &TransactionTableRow) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, row.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, row.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(row.id)
        {
            td class=(TABLE_CELL_STYLE) { time datetime=(row.date) { (row.date) } }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(BADGE_STYLE) { (row.type_) }
            }

            td class="px-6 py-4 text-right" { (currency(row.signed_amount())) }

            td class=(TABLE_CELL_STYLE) { (row.description) }

            td class=(TABLE_CELL_STYLE) { (row.account_name) }

            td class=(TABLE_CELL_STYLE)
            {
                (row.category_name.as_deref().unwrap_or("-"))
                @if let Some(goal_name) = &row.goal_name {
                    br;
                    span class="text-xs" { "Goal: " (goal_name) }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                    button
                        hx-delete=(delete_url)
                        hx-confirm="Are you sure you want to delete this transaction? \
                            Its effect on your balances will be reversed."
                        hx-target="closest tr"
                        hx-swap="delete"
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

fn transactions_view(rows: &[TransactionTableRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="7"
                                        data-empty-state
                                        class="px-6 py-4 text-center"
                                    {
                                        "No transactions yet. "
                                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                                        {
                                            "Record your first transaction"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

/// Renders the page listing the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let rows = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction_table_rows(user_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve transactions for user {user_id}: {error}")
        })?
    };

    Ok(transactions_view(&rows).into_response())
}
