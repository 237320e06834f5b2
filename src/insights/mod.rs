//! Rule-based insights into a user's spending and saving.
//!
//! A [FinancialProfile] summarises the user's transactions as monthly
//! averages, [assess_data_quality] decides whether there is enough history to
//! say anything useful, and [generate_insights] turns the profile into short
//! observations with a recommendation each.

mod profile;
mod rules;

pub use profile::{
    DataQuality, FinancialProfile, MINIMUM_DAYS, MINIMUM_TRANSACTIONS, assess_data_quality,
};
pub use rules::{Insight, generate_insights};

#[cfg(test)]
pub use rules::InsightKind;
