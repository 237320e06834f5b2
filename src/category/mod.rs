//! Income and expense categories, their list page, and the creation form.

mod categories_page;
mod core;
mod create;

pub use categories_page::get_categories_page;
pub use core::{
    Category, CategoryKind, CategoryRef, create_category, create_category_tables,
    find_contribution_category, get_categories, seed_default_categories,
};
pub use create::{create_category_endpoint, get_new_category_page};

#[cfg(test)]
pub use core::CONTRIBUTION_CATEGORY_NAME;
