//! The transaction form shared by the new and edit pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::{Category, CategoryRef},
    database_id::{AccountId, BudgetId, GoalId, TransactionId},
    endpoints,
    goal::GoalStatus,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
    timezone::parse_date_input,
    transaction::{
        core::{Transaction, TransactionType},
        flow::FormStep,
        validation::{ReferenceData, TransactionDraft},
    },
};

/// The transaction form as submitted from any step.
///
/// Optional IDs are empty strings in the HTML form, so this must be parsed
/// with axum_extra's `Form`, which reads an empty string as `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionFormData {
    #[serde(default)]
    pub step: FormStep,
    /// Set when editing a stored transaction.
    pub transaction_id: Option<TransactionId>,
    #[serde(default)]
    pub type_: TransactionType,
    pub amount: Option<f64>,
    /// An ISO date, e.g. "2026-10-18".
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    pub account_id: Option<AccountId>,
    /// The kind and ID of the category, e.g. "expense:3".
    pub category: Option<CategoryRef>,
    pub goal_id: Option<GoalId>,
    pub budget_id: Option<BudgetId>,
    /// Whether the user ticked the box confirming the review warnings.
    #[serde(default)]
    pub acknowledged: bool,
}

impl TransactionFormData {
    /// A blank form for a new transaction dated `today`.
    pub fn new(today: Date, reference: &ReferenceData) -> Self {
        Self {
            date: today.to_string(),
            account_id: reference.default_account().map(|account| account.id),
            ..Default::default()
        }
    }

    /// The form prefilled with a stored transaction.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            step: FormStep::Form,
            transaction_id: Some(transaction.id),
            type_: transaction.type_,
            amount: Some(transaction.amount),
            date: transaction.date.to_string(),
            description: transaction.description.clone(),
            account_id: Some(transaction.account_id),
            category: transaction.category(),
            goal_id: transaction.goal_id,
            budget_id: transaction.budget_id,
            acknowledged: false,
        }
    }

    /// Parse the form into a draft.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if the date is set but cannot be parsed.
    pub fn to_draft(&self) -> Result<TransactionDraft, Error> {
        let date = match self.date.trim() {
            "" => None,
            raw_date => Some(parse_date_input(raw_date)?),
        };

        Ok(TransactionDraft {
            type_: self.type_,
            amount: self.amount,
            date,
            description: self.description.clone(),
            account_id: self.account_id,
            category: self.category,
            goal_id: self.goal_id,
            budget_id: self.budget_id,
        })
    }
}

fn category_label(category: &Category) -> String {
    match &category.icon {
        Some(icon) => format!("{icon} {}", category.name),
        None => category.name.to_string(),
    }
}

fn type_radio(value: TransactionType, label: &str, checked: TransactionType) -> Markup {
    let id = format!("transaction-type-{value}");

    html! {
        div class="flex items-center gap-3"
        {
            input
                name="type_"
                id=(id)
                type="radio"
                value=(value)
                checked[value == checked]
                required
                tabindex="0"
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    }
}

/// The first step of the transaction form.
///
/// Submitting asks the server to validate the draft and show the review step.
pub fn transaction_form_view(form: &TransactionFormData, reference: &ReferenceData) -> Markup {
    let amount = form.amount.map(|amount| format!("{amount:.2}"));
    let open_goals = reference
        .goals
        .iter()
        .filter(|goal| goal.status == GoalStatus::InProgress || Some(goal.id) == form.goal_id);
    let spinner = loading_spinner();

    html! {
        form
            id="transaction-form"
            hx-post=(endpoints::REVIEW_TRANSACTION)
            hx-target="#transaction-form-container"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            input type="hidden" name="step" value=(FormStep::Form);

            @if let Some(transaction_id) = form.transaction_id {
                input type="hidden" name="transaction_id" value=(transaction_id);
            }

            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Transaction type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    (type_radio(TransactionType::Expense, "Expense", form.type_))
                    (type_radio(TransactionType::Income, "Income", form.type_))
                    (type_radio(TransactionType::Contribution, "Contribution to a goal", form.type_))
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                // w-full needed to ensure input takes the full width when prefilled with a value
                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        placeholder="0.00"
                        min="0.01"
                        required
                        autofocus
                        value=[amount.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="date"
                    value=(form.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

                select name="account_id" id="account_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Select an account" }

                    @for account in &reference.accounts {
                        option value=(account.id) selected[Some(account.id) == form.account_id]
                        {
                            (account.name)
                        }
                    }
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Select a category" }

                    optgroup label="Income"
                    {
                        @for category in &reference.income_categories {
                            option value=(category.reference()) selected[Some(category.reference()) == form.category]
                            {
                                (category_label(category))
                            }
                        }
                    }

                    optgroup label="Expenses"
                    {
                        @for category in &reference.expense_categories {
                            option value=(category.reference()) selected[Some(category.reference()) == form.category]
                            {
                                (category_label(category))
                            }
                        }
                    }
                }
            }

            div
            {
                label for="goal_id" class=(FORM_LABEL_STYLE) { "Goal (contributions only)" }

                select name="goal_id" id="goal_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "No goal" }

                    @for goal in open_goals {
                        option value=(goal.id) selected[Some(goal.id) == form.goal_id]
                        {
                            (goal.name)
                            @if goal.is_family_goal() { " (family)" }
                        }
                    }
                }
            }

            div
            {
                label for="budget_id" class=(FORM_LABEL_STYLE) { "Budget (expenses only)" }

                select name="budget_id" id="budget_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "No budget" }

                    @for budget in &reference.budgets {
                        option value=(budget.id) selected[Some(budget.id) == form.budget_id]
                        {
                            (budget.name)
                        }
                    }
                }
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="Description"
                    value=(form.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="review-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (spinner) }
                " Review"
            }
        }
    }
}
