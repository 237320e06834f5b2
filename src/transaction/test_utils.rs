use std::sync::{Arc, Mutex};

use scraper::ElementRef;
use time::macros::date;

use crate::{
    NewAccount, create_account,
    auth::UserID,
    budget::{DEFAULT_ALERT_THRESHOLD, NewBudget, create_budget},
    account::get_accounts,
    category::{CategoryKind, CategoryRef, get_categories, seed_default_categories},
    database_id::{AccountId, BudgetId, GoalId},
    goal::{NewGoal, create_goal},
    name::Name,
    test_utils::{create_test_user, get_test_connection},
    transaction::{
        TransactionState, TransactionType, flow::FormStep, form::TransactionFormData,
    },
};

/// A user with a ₱500 wallet, the default categories, a ₱900 goal with ₱100
/// saved and a ₱1,000 budget with ₱750 spent.
pub struct Fixture {
    pub state: TransactionState,
    pub user_id: UserID,
    pub account_id: AccountId,
    pub salary: CategoryRef,
    pub food: CategoryRef,
    pub goal_id: GoalId,
    pub budget_id: BudgetId,
}

pub fn fixture() -> Fixture {
    let connection = get_test_connection();
    let user_id = create_test_user("juan@example.ph", &connection);
    seed_default_categories(user_id, &connection).unwrap();

    let account_id = create_account(
        user_id,
        NewAccount {
            name: Name::new_unchecked("Wallet"),
            balance: 500.0,
            currency: String::new(),
        },
        &connection,
    )
    .unwrap()
    .id;

    let category = |kind, name: &str| {
        get_categories(user_id, kind, &connection)
            .unwrap()
            .into_iter()
            .find(|category| category.name.as_ref() == name)
            .unwrap()
            .reference()
    };
    let salary = category(CategoryKind::Income, "Salary");
    let food = category(CategoryKind::Expense, "Food");

    let goal_id = create_goal(
        user_id,
        NewGoal {
            name: Name::new_unchecked("Bike"),
            target_amount: 900.0,
            target_date: None,
            is_family_goal: false,
        },
        &connection,
    )
    .unwrap()
    .id;
    crate::goal::adjust_goal_progress(goal_id, 100.0, &connection).unwrap();

    let budget_id = create_budget(
        user_id,
        NewBudget {
            name: Name::new_unchecked("Groceries"),
            expense_category_id: Some(food.id),
            amount: 1000.0,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            start_date: date!(2026 - 10 - 01),
            end_date: date!(2026 - 10 - 31),
        },
        &connection,
    )
    .unwrap()
    .id;
    crate::budget::adjust_budget_spent(budget_id, 750.0, &connection).unwrap();

    Fixture {
        state: TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Asia/Manila".to_owned(),
        },
        user_id,
        account_id,
        salary,
        food,
        goal_id,
        budget_id,
    }
}

impl Fixture {
    /// A reviewed expense form for `amount` filed under Food.
    pub fn expense_form(&self, amount: f64) -> TransactionFormData {
        TransactionFormData {
            step: FormStep::Review,
            transaction_id: None,
            type_: TransactionType::Expense,
            amount: Some(amount),
            date: "2026-10-15".to_owned(),
            description: "Palengke".to_owned(),
            account_id: Some(self.account_id),
            category: Some(self.food),
            goal_id: None,
            budget_id: None,
            acknowledged: false,
        }
    }

    pub fn balance(&self) -> f64 {
        get_accounts(self.user_id, &self.state.db_connection.lock().unwrap())
            .unwrap()
            .into_iter()
            .find(|account| account.id == self.account_id)
            .unwrap()
            .balance
    }
}

#[track_caller]
pub fn assert_transaction_type_inputs(form: &ElementRef, checked_type: &str) {
    let selector = scraper::Selector::parse("input[type=radio][name=type_]").unwrap();
    let inputs = form.select(&selector).collect::<Vec<_>>();

    let mut values = inputs
        .iter()
        .filter_map(|input| input.value().attr("value"))
        .collect::<Vec<_>>();
    values.sort_unstable();
    assert_eq!(
        values,
        vec!["contribution", "expense", "income"],
        "want transaction type values to be contribution/expense/income, got {values:?}"
    );

    let checked = inputs
        .iter()
        .filter(|input| input.value().attr("checked").is_some())
        .filter_map(|input| input.value().attr("value"))
        .collect::<Vec<_>>();
    assert_eq!(
        checked,
        vec![checked_type],
        "want exactly {checked_type} checked, got {checked:?}"
    );
}
