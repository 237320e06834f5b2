//! Monthly averages and data sufficiency checks over a user's transactions.

use std::collections::HashMap;

use crate::{
    category::Category,
    database_id::CategoryId,
    money::round_to_centavos,
    transaction::{Transaction, TransactionType},
};

/// The fewest transactions needed before insights are shown.
pub const MINIMUM_TRANSACTIONS: usize = 7;
/// The shortest history, in days, needed before insights are shown.
pub const MINIMUM_DAYS: i64 = 7;

/// Below this many transactions insights are shown with a warning.
const RECOMMENDED_TRANSACTIONS: usize = 30;
/// Below this many days of history insights are shown with a warning.
const RECOMMENDED_DAYS: i64 = 30;
const DAYS_PER_MONTH: f64 = 30.0;

/// The label for expenses without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// A summary of a user's income and spending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinancialProfile {
    pub avg_monthly_income: f64,
    pub avg_monthly_expenses: f64,
    /// `(income - expenses) / income`, or 0 without income.
    pub savings_rate: f64,
    /// Total spent per expense category, largest first.
    pub expense_totals: Vec<(String, f64)>,
    pub transaction_count: usize,
}

impl FinancialProfile {
    /// Summarise `transactions`, naming expense categories from `expense_categories`.
    ///
    /// Contributions move money into goals, so they count as neither income
    /// nor expenses. Totals are averaged over the number of 30 day months the
    /// transactions span, with a minimum of one month.
    pub fn from_transactions(
        transactions: &[Transaction],
        expense_categories: &[Category],
    ) -> Self {
        let category_names: HashMap<CategoryId, &str> = expense_categories
            .iter()
            .map(|category| (category.id, category.name.as_ref()))
            .collect();

        let mut total_income = 0.0;
        let mut total_expenses = 0.0;
        let mut expense_totals: HashMap<&str, f64> = HashMap::new();

        for transaction in transactions {
            match transaction.type_ {
                TransactionType::Income => total_income += transaction.amount,
                TransactionType::Expense => {
                    total_expenses += transaction.amount;

                    let name = transaction
                        .expense_category_id
                        .and_then(|id| category_names.get(&id).copied())
                        .unwrap_or(UNCATEGORIZED_LABEL);
                    *expense_totals.entry(name).or_insert(0.0) += transaction.amount;
                }
                TransactionType::Contribution => {}
            }
        }

        let months = (days_spanned(transactions) as f64 / DAYS_PER_MONTH).max(1.0);
        let avg_monthly_income = round_to_centavos(total_income / months);
        let avg_monthly_expenses = round_to_centavos(total_expenses / months);
        let savings_rate = if avg_monthly_income > 0.0 {
            (avg_monthly_income - avg_monthly_expenses) / avg_monthly_income
        } else {
            0.0
        };

        let mut expense_totals: Vec<(String, f64)> = expense_totals
            .into_iter()
            .map(|(name, total)| (name.to_owned(), round_to_centavos(total)))
            .collect();
        // Ties are broken by name so the order does not depend on the hash map.
        expense_totals.sort_by(|(a_name, a_total), (b_name, b_total)| {
            b_total.total_cmp(a_total).then_with(|| a_name.cmp(b_name))
        });

        Self {
            avg_monthly_income,
            avg_monthly_expenses,
            savings_rate,
            expense_totals,
            transaction_count: transactions.len(),
        }
    }

    /// Average monthly income minus average monthly expenses.
    pub fn net_monthly_flow(&self) -> f64 {
        round_to_centavos(self.avg_monthly_income - self.avg_monthly_expenses)
    }
}

/// The number of whole days between the earliest and latest transaction.
fn days_spanned(transactions: &[Transaction]) -> i64 {
    let earliest = transactions.iter().map(|transaction| transaction.date).min();
    let latest = transactions.iter().map(|transaction| transaction.date).max();

    match (earliest, latest) {
        (Some(earliest), Some(latest)) => (latest - earliest).whole_days(),
        _ => 0,
    }
}

/// Whether a user's history supports insights, and how far to trust them.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuality {
    pub transaction_count: usize,
    pub days_spanned: i64,
    pub income_transactions: usize,
    pub expense_transactions: usize,
    /// Shortcomings that make insights less reliable without ruling them out.
    pub warnings: Vec<String>,
}

impl DataQuality {
    /// Whether there are at least [MINIMUM_TRANSACTIONS] transactions spread
    /// over at least [MINIMUM_DAYS] days.
    pub fn is_sufficient(&self) -> bool {
        self.transaction_count >= MINIMUM_TRANSACTIONS && self.days_spanned >= MINIMUM_DAYS
    }
}

/// Check whether `transactions` are enough to base insights on.
pub fn assess_data_quality(transactions: &[Transaction]) -> DataQuality {
    let count_of = |type_: TransactionType| {
        transactions
            .iter()
            .filter(|transaction| transaction.type_ == type_)
            .count()
    };

    let transaction_count = transactions.len();
    let days_spanned = days_spanned(transactions);
    let income_transactions = count_of(TransactionType::Income);
    let expense_transactions = count_of(TransactionType::Expense);

    let mut warnings = Vec::new();

    if transaction_count < RECOMMENDED_TRANSACTIONS {
        warnings.push(format!(
            "Only {transaction_count} transactions recorded. Insights improve with at least \
            {RECOMMENDED_TRANSACTIONS}."
        ));
    }

    if days_spanned < RECOMMENDED_DAYS {
        warnings.push(format!(
            "Your history covers {days_spanned} days. Monthly averages are more accurate \
            after {RECOMMENDED_DAYS} days."
        ));
    }

    if income_transactions == 0 {
        warnings.push("No income transactions found.".to_owned());
    }

    DataQuality {
        transaction_count,
        days_spanned,
        income_transactions,
        expense_transactions,
        warnings,
    }
}
