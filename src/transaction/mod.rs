//! Income, expenses and contributions to savings goals.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and database functions
//! - Validation of draft transactions against the user's reference data
//! - The two-step form (form, review, submit) and its pages and endpoints
//! - The ledger, which applies a transaction's effects atomically

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod flow;
mod form;
mod ledger;
mod new_transaction_page;
mod review_endpoint;
mod transactions_page;
mod validation;

pub use core::{Transaction, TransactionType, create_transaction_table, get_transactions};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use new_transaction_page::get_new_transaction_page;
pub use review_endpoint::{back_to_form_endpoint, review_transaction_endpoint};
pub use transactions_page::get_transactions_page;
pub use validation::ValidationError;

#[cfg(test)]
pub use core::ValidatedTransaction;
#[cfg(test)]
pub use ledger::record_transaction;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

/// The state needed by the transaction pages and endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Manila".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils;
