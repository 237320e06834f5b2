//! Checks a draft transaction against the user's accounts, categories, goals
//! and budgets before anything is written.
//!
//! Validation is a pure function of the draft and the [ReferenceData], so the
//! same rules run when the user asks for a review and again on submit.

use std::fmt::Display;

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    account::{Account, get_accounts},
    auth::UserID,
    budget::{Budget, BudgetStatus, get_budgets, percentage_of, status_at},
    category::{Category, CategoryKind, CategoryRef, find_contribution_category, get_categories},
    database_id::{AccountId, BudgetId, GoalId, TransactionId},
    family::{FamilyAction, FamilyRole, PermissionDenied, check_permission, get_membership},
    goal::{Goal, GoalStatus, get_visible_goals},
    money::{MAX_AMOUNT, format_currency, round_to_centavos},
    transaction::core::{Transaction, TransactionType, ValidatedTransaction, get_transaction},
};

/// The values of the transaction form, before validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionDraft {
    pub type_: TransactionType,
    pub amount: Option<f64>,
    pub date: Option<Date>,
    pub description: String,
    pub account_id: Option<AccountId>,
    pub category: Option<CategoryRef>,
    pub goal_id: Option<GoalId>,
    pub budget_id: Option<BudgetId>,
}

/// Everything a draft is checked against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceData {
    pub accounts: Vec<Account>,
    pub income_categories: Vec<Category>,
    pub expense_categories: Vec<Category>,
    /// The goals visible to the user, personal and family.
    pub goals: Vec<Goal>,
    pub budgets: Vec<Budget>,
    /// `None` if the user is not in a family.
    pub family_role: Option<FamilyRole>,
}

impl ReferenceData {
    /// Load the reference data for `user_id`.
    pub fn load(user_id: UserID, connection: &Connection) -> Result<Self, Error> {
        Ok(Self {
            accounts: get_accounts(user_id, connection)?,
            income_categories: get_categories(user_id, CategoryKind::Income, connection)?,
            expense_categories: get_categories(user_id, CategoryKind::Expense, connection)?,
            goals: get_visible_goals(user_id, connection)?,
            budgets: get_budgets(user_id, connection)?,
            family_role: get_membership(user_id, connection)?.map(|membership| membership.role),
        })
    }

    /// Load the reference data for a form that creates a transaction, or edits
    /// `transaction_id` if it is set.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the user has no transaction `transaction_id`.
    pub fn load_for_form(
        user_id: UserID,
        transaction_id: Option<TransactionId>,
        connection: &Connection,
    ) -> Result<Self, Error> {
        let reference = Self::load(user_id, connection)?;

        match transaction_id {
            Some(transaction_id) => {
                let stored = get_transaction(transaction_id, user_id, connection)?;
                Ok(reference.without_effects_of(&stored))
            }
            None => Ok(reference),
        }
    }

    /// The reference data as it would be had `transaction` never been recorded.
    ///
    /// Used when editing, so the stored transaction's own effects do not count
    /// against the edited version.
    pub fn without_effects_of(mut self, transaction: &Transaction) -> Self {
        let amount = transaction.amount;

        if let Some(account) = self
            .accounts
            .iter_mut()
            .find(|account| account.id == transaction.account_id)
        {
            account.balance =
                round_to_centavos(account.balance - transaction.type_.balance_sign() * amount);
        }

        if transaction.type_ == TransactionType::Contribution {
            for goal in &mut self.goals {
                if Some(goal.id) != transaction.goal_id {
                    continue;
                }

                goal.current_amount = round_to_centavos(goal.current_amount - amount);

                if goal.status == GoalStatus::Completed
                    && goal.current_amount < goal.target_amount
                {
                    goal.status = GoalStatus::InProgress;
                }
            }
        }

        if transaction.type_ == TransactionType::Expense {
            for budget in &mut self.budgets {
                if Some(budget.id) == transaction.budget_id {
                    budget.spent = round_to_centavos(budget.spent - amount);
                }
            }
        }

        self
    }

    /// The categories a transaction of `type_` may use.
    pub fn categories_for(&self, type_: TransactionType) -> &[Category] {
        match type_.category_kind() {
            CategoryKind::Income => &self.income_categories,
            CategoryKind::Expense => &self.expense_categories,
        }
    }

    /// The account preselected in a new transaction form.
    pub fn default_account(&self) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.is_default)
            .or_else(|| self.accounts.first())
    }
}

/// Why a draft cannot be submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The amount is missing, not a number, or not positive after rounding.
    InvalidAmount,
    AmountTooLarge,
    MissingDate,
    MissingAccount,
    MissingCategory(TransactionType),
    UnknownAccount,
    /// The category is of the other kind, or not in the list for the transaction type.
    CategoryTypeMismatch(TransactionType),
    MissingGoal,
    UnknownGoal,
    GoalNotInProgress { goal_name: String, status: GoalStatus },
    UnknownBudget,
    /// Contributions may not overdraw the account.
    InsufficientFunds { account_name: String, balance: f64 },
    /// The user's family role does not allow contributing to a family goal.
    NotAllowed(PermissionDenied),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidAmount => f.write_str("The amount must be greater than zero."),
            ValidationError::AmountTooLarge => write!(
                f,
                "The amount must not be more than {}.",
                format_currency(MAX_AMOUNT)
            ),
            ValidationError::MissingDate => f.write_str("Choose the date of the transaction."),
            ValidationError::MissingAccount => f.write_str("Choose an account."),
            ValidationError::MissingCategory(type_) => {
                write!(f, "Choose a category for this {type_}.")
            }
            ValidationError::UnknownAccount => {
                f.write_str("The selected account could not be found.")
            }
            ValidationError::CategoryTypeMismatch(type_) => write!(
                f,
                "Category type mismatch: the selected category cannot be used for {type_} \
                transactions."
            ),
            ValidationError::MissingGoal => f.write_str("Contributions must be made to a goal."),
            ValidationError::UnknownGoal => f.write_str("The selected goal could not be found."),
            ValidationError::GoalNotInProgress { goal_name, status } => write!(
                f,
                "The goal {goal_name} is {} and no longer accepts contributions.",
                status.to_string().to_lowercase()
            ),
            ValidationError::UnknownBudget => {
                f.write_str("The selected budget could not be found.")
            }
            ValidationError::InsufficientFunds {
                account_name,
                balance,
            } => write!(
                f,
                "Insufficient funds: {account_name} only has {}.",
                format_currency(*balance)
            ),
            ValidationError::NotAllowed(denied) => write!(f, "{denied}."),
        }
    }
}

/// A warning the user must acknowledge before the transaction is submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// A contribution larger than what is left to save for the goal.
    ExceedsGoalRemaining { goal_name: String, excess: f64 },
    /// An expense that takes a budget past its alert threshold but not its limit.
    BudgetThreshold { budget_name: String, percentage: f64 },
    /// An expense that takes a budget to or past its limit.
    OverBudget { budget_name: String, percentage: f64 },
}

impl Display for Confirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confirmation::ExceedsGoalRemaining { goal_name, excess } => write!(
                f,
                "This contribution to {goal_name} exceeds the remaining amount by {}.",
                format_currency(*excess)
            ),
            Confirmation::BudgetThreshold {
                budget_name,
                percentage,
            } => write!(
                f,
                "This expense brings {budget_name} to {percentage:.0}% of its limit."
            ),
            Confirmation::OverBudget {
                budget_name,
                percentage,
            } => write!(
                f,
                "This expense puts {budget_name} over budget at {percentage:.0}% of its limit."
            ),
        }
    }
}

/// A draft that passed validation, along with the warnings it raised.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub transaction: ValidatedTransaction,
    pub confirmations: Vec<Confirmation>,
}

impl Review {
    pub fn needs_confirmation(&self) -> bool {
        !self.confirmations.is_empty()
    }
}

/// Decide whether `draft` may be submitted.
///
/// Hard rules are checked in order and the first failure is returned.
/// Warnings never fail validation, they are collected in [Review::confirmations].
///
/// A draft expense with a goal is treated as a contribution. Contributions
/// without a category are filed under the "Contribution" expense category if
/// the user has one. Goals are dropped from income and expenses, and budgets
/// from income and contributions.
pub fn validate_transaction(
    draft: &TransactionDraft,
    reference: &ReferenceData,
) -> Result<Review, ValidationError> {
    let amount = match draft.amount {
        Some(amount) if amount.is_finite() => round_to_centavos(amount),
        _ => return Err(ValidationError::InvalidAmount),
    };

    if amount <= 0.0 {
        return Err(ValidationError::InvalidAmount);
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge);
    }

    let date = draft.date.ok_or(ValidationError::MissingDate)?;
    let account_id = draft.account_id.ok_or(ValidationError::MissingAccount)?;

    let type_ = match draft.type_ {
        TransactionType::Expense if draft.goal_id.is_some() => TransactionType::Contribution,
        type_ => type_,
    };

    let category = match (type_, draft.category) {
        (_, Some(category)) => Some(category),
        (TransactionType::Contribution, None) => {
            find_contribution_category(&reference.expense_categories).map(Category::reference)
        }
        (type_, None) => return Err(ValidationError::MissingCategory(type_)),
    };

    let account = reference
        .accounts
        .iter()
        .find(|account| account.id == account_id)
        .ok_or(ValidationError::UnknownAccount)?;

    let is_matching_category = |category: CategoryRef| {
        category.kind == type_.category_kind()
            && reference
                .categories_for(type_)
                .iter()
                .any(|candidate| candidate.id == category.id)
    };

    if category.is_some_and(|category| !is_matching_category(category)) {
        return Err(ValidationError::CategoryTypeMismatch(type_));
    }

    let mut confirmations = Vec::new();

    let goal_id = match type_ {
        TransactionType::Contribution => {
            let goal_id = draft.goal_id.ok_or(ValidationError::MissingGoal)?;
            let goal = reference
                .goals
                .iter()
                .find(|goal| goal.id == goal_id)
                .ok_or(ValidationError::UnknownGoal)?;

            if goal.status != GoalStatus::InProgress {
                return Err(ValidationError::GoalNotInProgress {
                    goal_name: goal.name.to_string(),
                    status: goal.status,
                });
            }

            if goal.is_family_goal() {
                check_permission(reference.family_role, FamilyAction::ContributeToGoal)
                    .map_err(ValidationError::NotAllowed)?;
            }

            if account.balance < amount {
                return Err(ValidationError::InsufficientFunds {
                    account_name: account.name.to_string(),
                    balance: account.balance,
                });
            }

            let remaining = goal.remaining();
            if amount > remaining {
                confirmations.push(Confirmation::ExceedsGoalRemaining {
                    goal_name: goal.name.to_string(),
                    excess: round_to_centavos(amount - remaining),
                });
            }

            Some(goal_id)
        }
        TransactionType::Income | TransactionType::Expense => None,
    };

    let budget_id = match (type_, draft.budget_id) {
        (TransactionType::Expense, Some(budget_id)) => {
            let budget = reference
                .budgets
                .iter()
                .find(|budget| budget.id == budget_id)
                .ok_or(ValidationError::UnknownBudget)?;

            let percentage = percentage_of(budget.spent + amount, budget.amount);
            let budget_name = budget.name.to_string();

            match status_at(percentage, budget.alert_threshold) {
                BudgetStatus::OnTrack => {}
                BudgetStatus::NearLimit => confirmations.push(Confirmation::BudgetThreshold {
                    budget_name,
                    percentage,
                }),
                BudgetStatus::OverBudget => confirmations.push(Confirmation::OverBudget {
                    budget_name,
                    percentage,
                }),
            }

            Some(budget_id)
        }
        _ => None,
    };

    Ok(Review {
        transaction: ValidatedTransaction {
            type_,
            amount,
            date,
            description: draft.description.trim().to_owned(),
            account_id,
            category_id: category.map(|category| category.id),
            goal_id,
            budget_id,
        },
        confirmations,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        account::Account,
        auth::UserID,
        budget::{Budget, DEFAULT_ALERT_THRESHOLD},
        category::{CONTRIBUTION_CATEGORY_NAME, Category, CategoryKind, CategoryRef},
        family::{FamilyAction, FamilyRole, PermissionDenied},
        goal::{Goal, GoalStatus},
        name::Name,
        transaction::core::{Transaction, TransactionType},
    };

    use super::{
        Confirmation, ReferenceData, TransactionDraft, ValidationError, validate_transaction,
    };

    const USER: i64 = 1;
    const WALLET: i64 = 10;
    const SALARY: i64 = 20;
    const FOOD: i64 = 30;
    const CONTRIBUTION: i64 = 31;
    const BIKE: i64 = 40;
    const HOUSE: i64 = 41;
    const GROCERIES: i64 = 50;

    fn category(id: i64, name: &str, kind: CategoryKind) -> Category {
        Category {
            id,
            user_id: UserID::new(USER),
            name: Name::new_unchecked(name),
            icon: None,
            kind,
        }
    }

    fn income_category(id: i64) -> Option<CategoryRef> {
        Some(CategoryRef {
            kind: CategoryKind::Income,
            id,
        })
    }

    fn expense_category(id: i64) -> Option<CategoryRef> {
        Some(CategoryRef {
            kind: CategoryKind::Expense,
            id,
        })
    }

    fn goal(id: i64, target_amount: f64, current_amount: f64, family_id: Option<i64>) -> Goal {
        Goal {
            id,
            user_id: UserID::new(USER),
            family_id,
            name: Name::new_unchecked(if id == BIKE { "Bike" } else { "House" }),
            target_amount,
            current_amount,
            target_date: None,
            status: GoalStatus::InProgress,
        }
    }

    fn reference() -> ReferenceData {
        ReferenceData {
            accounts: vec![Account {
                id: WALLET,
                user_id: UserID::new(USER),
                name: Name::new_unchecked("Wallet"),
                balance: 500.0,
                currency: "PHP".to_owned(),
                is_default: true,
            }],
            income_categories: vec![category(SALARY, "Salary", CategoryKind::Income)],
            expense_categories: vec![
                category(FOOD, "Food", CategoryKind::Expense),
                category(CONTRIBUTION, CONTRIBUTION_CATEGORY_NAME, CategoryKind::Expense),
            ],
            goals: vec![goal(BIKE, 900.0, 100.0, None), goal(HOUSE, 1e6, 0.0, Some(7))],
            budgets: vec![Budget {
                id: GROCERIES,
                user_id: UserID::new(USER),
                name: Name::new_unchecked("Groceries"),
                expense_category_id: Some(FOOD),
                amount: 1000.0,
                spent: 750.0,
                alert_threshold: DEFAULT_ALERT_THRESHOLD,
                start_date: date!(2026 - 10 - 01),
                end_date: date!(2026 - 10 - 31),
            }],
            family_role: Some(FamilyRole::Member),
        }
    }

    fn draft(type_: TransactionType, amount: f64) -> TransactionDraft {
        TransactionDraft {
            type_,
            amount: Some(amount),
            date: Some(date!(2026 - 10 - 15)),
            description: "test".to_owned(),
            account_id: Some(WALLET),
            category: match type_ {
                TransactionType::Income => income_category(SALARY),
                TransactionType::Expense => expense_category(FOOD),
                TransactionType::Contribution => None,
            },
            goal_id: None,
            budget_id: None,
        }
    }

    #[test]
    fn rounds_expense_amount_without_confirmations() {
        let review =
            validate_transaction(&draft(TransactionType::Expense, 150.005), &reference()).unwrap();

        assert_eq!(review.transaction.amount, 150.01);
        assert_eq!(review.transaction.category_id, Some(FOOD));
        assert!(!review.needs_confirmation());
    }

    #[test]
    fn rejects_amounts_outside_range() {
        for amount in [0.0, -5.0, 0.004, f64::NAN] {
            assert_eq!(
                validate_transaction(&draft(TransactionType::Expense, amount), &reference()),
                Err(ValidationError::InvalidAmount),
                "amount {amount}"
            );
        }

        assert_eq!(
            validate_transaction(&draft(TransactionType::Expense, 1e11), &reference()),
            Err(ValidationError::AmountTooLarge)
        );
    }

    #[test]
    fn requires_date_account_and_category() {
        let mut no_date = draft(TransactionType::Income, 10.0);
        no_date.date = None;
        let mut no_account = draft(TransactionType::Income, 10.0);
        no_account.account_id = None;
        let mut no_category = draft(TransactionType::Income, 10.0);
        no_category.category = None;

        assert_eq!(
            validate_transaction(&no_date, &reference()),
            Err(ValidationError::MissingDate)
        );
        assert_eq!(
            validate_transaction(&no_account, &reference()),
            Err(ValidationError::MissingAccount)
        );
        assert_eq!(
            validate_transaction(&no_category, &reference()),
            Err(ValidationError::MissingCategory(TransactionType::Income))
        );
    }

    #[test]
    fn rejects_category_of_other_type() {
        let mut income = draft(TransactionType::Income, 10.0);
        income.category = expense_category(FOOD);

        let error = validate_transaction(&income, &reference()).unwrap_err();

        assert_eq!(
            error,
            ValidationError::CategoryTypeMismatch(TransactionType::Income)
        );
        assert!(error.to_string().contains("mismatch"), "got {error}");
    }

    #[test]
    fn rejects_category_of_other_type_when_ids_collide() {
        let mut reference = reference();
        reference.income_categories = vec![category(FOOD, "Salary", CategoryKind::Income)];
        let mut income = draft(TransactionType::Income, 10.0);
        income.category = expense_category(FOOD);
        let mut expense = draft(TransactionType::Expense, 10.0);
        expense.category = income_category(FOOD);

        assert_eq!(
            validate_transaction(&income, &reference),
            Err(ValidationError::CategoryTypeMismatch(TransactionType::Income))
        );
        assert_eq!(
            validate_transaction(&expense, &reference),
            Err(ValidationError::CategoryTypeMismatch(TransactionType::Expense))
        );
    }

    #[test]
    fn contribution_rejects_income_category() {
        let mut reference = reference();
        reference.income_categories = vec![category(CONTRIBUTION, "Salary", CategoryKind::Income)];
        let mut contribution = draft(TransactionType::Contribution, 10.0);
        contribution.goal_id = Some(BIKE);
        contribution.category = income_category(CONTRIBUTION);

        assert_eq!(
            validate_transaction(&contribution, &reference),
            Err(ValidationError::CategoryTypeMismatch(
                TransactionType::Contribution
            ))
        );
    }

    #[test]
    fn rejects_unknown_account() {
        let mut expense = draft(TransactionType::Expense, 10.0);
        expense.account_id = Some(999);

        assert_eq!(
            validate_transaction(&expense, &reference()),
            Err(ValidationError::UnknownAccount)
        );
    }

    #[test]
    fn contribution_requires_goal() {
        assert_eq!(
            validate_transaction(&draft(TransactionType::Contribution, 10.0), &reference()),
            Err(ValidationError::MissingGoal)
        );
    }

    #[test]
    fn contribution_defaults_to_contribution_category() {
        let mut contribution = draft(TransactionType::Contribution, 100.0);
        contribution.goal_id = Some(BIKE);

        let review = validate_transaction(&contribution, &reference()).unwrap();

        assert_eq!(review.transaction.category_id, Some(CONTRIBUTION));
        assert_eq!(review.transaction.goal_id, Some(BIKE));
    }

    #[test]
    fn expense_with_goal_is_treated_as_contribution() {
        let mut expense = draft(TransactionType::Expense, 100.0);
        expense.category = None;
        expense.goal_id = Some(BIKE);

        let review = validate_transaction(&expense, &reference()).unwrap();

        assert_eq!(review.transaction.type_, TransactionType::Contribution);
        assert_eq!(review.transaction.category_id, Some(CONTRIBUTION));
    }

    #[test]
    fn contribution_over_remaining_needs_confirmation() {
        let mut reference = reference();
        reference.accounts[0].balance = 5000.0;
        let mut contribution = draft(TransactionType::Contribution, 1000.0);
        contribution.goal_id = Some(BIKE);

        let review = validate_transaction(&contribution, &reference).unwrap();

        assert_eq!(
            review.confirmations,
            vec![Confirmation::ExceedsGoalRemaining {
                goal_name: "Bike".to_owned(),
                excess: 200.0
            }]
        );
        let message = review.confirmations[0].to_string();
        assert!(
            message.contains("exceeds the remaining amount by ₱200.00"),
            "got {message}"
        );
    }

    #[test]
    fn contribution_cannot_overdraw_account() {
        let mut contribution = draft(TransactionType::Contribution, 600.0);
        contribution.goal_id = Some(BIKE);

        assert_eq!(
            validate_transaction(&contribution, &reference()),
            Err(ValidationError::InsufficientFunds {
                account_name: "Wallet".to_owned(),
                balance: 500.0
            })
        );
    }

    #[test]
    fn expenses_do_not_check_balance() {
        let review =
            validate_transaction(&draft(TransactionType::Expense, 10_000.0), &reference());

        assert!(review.is_ok(), "got {review:?}");
    }

    #[test]
    fn contribution_to_completed_goal_fails() {
        let mut reference = reference();
        reference.goals[0].status = GoalStatus::Completed;
        let mut contribution = draft(TransactionType::Contribution, 10.0);
        contribution.goal_id = Some(BIKE);

        assert!(matches!(
            validate_transaction(&contribution, &reference),
            Err(ValidationError::GoalNotInProgress { .. })
        ));
    }

    #[test]
    fn viewer_cannot_contribute_to_family_goal() {
        let mut reference = reference();
        reference.family_role = Some(FamilyRole::Viewer);
        let mut contribution = draft(TransactionType::Contribution, 10.0);
        contribution.goal_id = Some(HOUSE);

        assert_eq!(
            validate_transaction(&contribution, &reference),
            Err(ValidationError::NotAllowed(PermissionDenied {
                action: FamilyAction::ContributeToGoal,
                role: Some(FamilyRole::Viewer),
            }))
        );
    }

    #[test]
    fn member_can_contribute_to_family_goal() {
        let mut contribution = draft(TransactionType::Contribution, 10.0);
        contribution.goal_id = Some(HOUSE);

        assert!(validate_transaction(&contribution, &reference()).is_ok());
    }

    #[test]
    fn expense_past_budget_threshold_needs_confirmation() {
        let mut expense = draft(TransactionType::Expense, 100.0);
        expense.budget_id = Some(GROCERIES);

        let review = validate_transaction(&expense, &reference()).unwrap();

        assert_eq!(
            review.confirmations,
            vec![Confirmation::BudgetThreshold {
                budget_name: "Groceries".to_owned(),
                percentage: 85.0
            }]
        );
    }

    #[test]
    fn expense_past_budget_limit_needs_confirmation() {
        let mut expense = draft(TransactionType::Expense, 250.0);
        expense.budget_id = Some(GROCERIES);

        let review = validate_transaction(&expense, &reference()).unwrap();

        assert!(matches!(
            review.confirmations.as_slice(),
            [Confirmation::OverBudget { .. }]
        ));
    }

    #[test]
    fn income_ignores_goal_and_budget() {
        let mut income = draft(TransactionType::Income, 100.0);
        income.budget_id = Some(GROCERIES);

        let review = validate_transaction(&income, &reference()).unwrap();

        assert_eq!(review.transaction.budget_id, None);
        assert_eq!(review.transaction.goal_id, None);
    }

    #[test]
    fn editing_does_not_count_stored_contribution_twice() {
        let mut reference = reference();
        reference.goals[0].current_amount = 900.0;
        reference.goals[0].status = GoalStatus::Completed;
        reference.accounts[0].balance = 0.0;
        let stored = Transaction {
            id: 1,
            user_id: UserID::new(USER),
            type_: TransactionType::Contribution,
            amount: 800.0,
            date: date!(2026 - 10 - 01),
            description: String::new(),
            account_id: WALLET,
            income_category_id: None,
            expense_category_id: Some(CONTRIBUTION),
            goal_id: Some(BIKE),
            budget_id: None,
        };
        let mut edited = draft(TransactionType::Contribution, 700.0);
        edited.goal_id = Some(BIKE);

        let review =
            validate_transaction(&edited, &reference.without_effects_of(&stored)).unwrap();

        assert!(!review.needs_confirmation());
        assert_eq!(review.transaction.amount, 700.0);
    }
}
