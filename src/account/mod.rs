//! Accounts hold the user's money. Transactions move money in and out of them.

mod accounts_page;
mod core;
mod create;
mod default_endpoint;

pub use accounts_page::get_accounts_page;
pub use core::{
    Account, NewAccount, adjust_account_balance, create_account, create_account_table,
    get_accounts, get_total_account_balance, set_default_account,
};
pub use create::{create_account_endpoint, get_new_account_page};
pub use default_endpoint::set_default_account_endpoint;

#[cfg(test)]
pub use core::get_account;
