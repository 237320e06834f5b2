//! Income and expense categories.
//!
//! The two kinds live in separate tables so that a transaction's category
//! foreign key always points at a category of the matching kind.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, ErrorCode, Row, params};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, database_id::CategoryId, name::Name};

/// The expense category that contributions to savings goals are filed under.
pub const CONTRIBUTION_CATEGORY_NAME: &str = "Contribution";

/// The income categories every new user starts with.
pub const DEFAULT_INCOME_CATEGORIES: [(&str, &str); 5] = [
    ("Salary", "💼"),
    ("Business", "🏪"),
    ("Freelance", "💻"),
    ("Gifts", "🎁"),
    ("Other Income", "💰"),
];

/// The expense categories every new user starts with.
pub const DEFAULT_EXPENSE_CATEGORIES: [(&str, &str); 9] = [
    ("Food", "🍚"),
    ("Transportation", "🚌"),
    ("Utilities", "💡"),
    ("Rent", "🏠"),
    ("Shopping", "🛍️"),
    ("Entertainment", "🎬"),
    ("Healthcare", "🩺"),
    ("Education", "📚"),
    (CONTRIBUTION_CATEGORY_NAME, "🎯"),
];

/// Whether a category is for money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Categories for income transactions.
    Income,
    /// Categories for expense and contribution transactions.
    Expense,
}

impl CategoryKind {
    fn table(self) -> &'static str {
        match self {
            CategoryKind::Income => "income_categories",
            CategoryKind::Expense => "expense_categories",
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryKind::Income => f.write_str("income"),
            CategoryKind::Expense => f.write_str("expense"),
        }
    }
}

/// A user's income or expense category.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserID,
    pub name: Name,
    /// An emoji shown next to the name.
    pub icon: Option<String>,
    pub kind: CategoryKind,
}

impl Category {
    pub fn reference(&self) -> CategoryRef {
        CategoryRef {
            kind: self.kind,
            id: self.id,
        }
    }
}

/// A category named by its kind and ID. IDs are only unique within a kind.
///
/// Written as `<kind>:<id>` in forms, e.g. "expense:3".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryRef {
    pub kind: CategoryKind,
    pub id: CategoryId,
}

impl Display for CategoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for CategoryRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("\"{s}\" is not a valid category");

        let (kind, id) = s.split_once(':').ok_or_else(invalid)?;
        let kind = match kind {
            "income" => CategoryKind::Income,
            "expense" => CategoryKind::Expense,
            _ => return Err(invalid()),
        };
        let id = id.parse().map_err(|_| invalid())?;

        Ok(Self { kind, id })
    }
}

impl TryFrom<String> for CategoryRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryRef> for String {
    fn from(category: CategoryRef) -> Self {
        category.to_string()
    }
}

/// Create the income and expense category tables.
pub fn create_category_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for kind in [CategoryKind::Income, CategoryKind::Expense] {
        connection.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    icon TEXT,
                    UNIQUE(user_id, name COLLATE NOCASE)
                )",
                kind.table()
            ),
            (),
        )?;
    }

    Ok(())
}

fn map_row_to_category(row: &Row, kind: CategoryKind) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: Name::new_unchecked(&raw_name),
        icon: row.get(3)?,
        kind,
    })
}

/// Create a category of `kind` for `user_id`.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category
/// of the same kind with that name, ignoring case.
pub fn create_category(
    user_id: UserID,
    name: Name,
    icon: Option<&str>,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Category, Error> {
    let icon = icon.map(str::trim).filter(|icon| !icon.is_empty());

    connection
        .execute(
            &format!(
                "INSERT INTO {} (user_id, name, icon) VALUES (?1, ?2, ?3)",
                kind.table()
            ),
            params![user_id.as_i64(), name.as_ref(), icon],
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref message))
                if sql_error.code == ErrorCode::ConstraintViolation
                    && message.contains(&format!("{}.name", kind.table())) =>
            {
                Error::DuplicateCategoryName(name.to_string())
            }
            error => error.into(),
        })?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        user_id,
        name,
        icon: icon.map(str::to_owned),
        kind,
    })
}

/// Get all of the user's categories of `kind`, sorted by name.
pub fn get_categories(
    user_id: UserID,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT id, user_id, name, icon FROM {} WHERE user_id = ?1 ORDER BY name COLLATE NOCASE",
            kind.table()
        ))?
        .query_map([user_id.as_i64()], |row| map_row_to_category(row, kind))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Find the expense category named [CONTRIBUTION_CATEGORY_NAME] in `categories`, ignoring case.
pub fn find_contribution_category(categories: &[Category]) -> Option<&Category> {
    categories.iter().find(|category| {
        category.kind == CategoryKind::Expense
            && category
                .name
                .as_ref()
                .eq_ignore_ascii_case(CONTRIBUTION_CATEGORY_NAME)
    })
}

/// Give a new user the default income and expense categories.
pub fn seed_default_categories(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let defaults = DEFAULT_INCOME_CATEGORIES
        .iter()
        .map(|category| (category, CategoryKind::Income))
        .chain(
            DEFAULT_EXPENSE_CATEGORIES
                .iter()
                .map(|category| (category, CategoryKind::Expense)),
        );

    for ((name, icon), kind) in defaults {
        create_category(user_id, Name::new_unchecked(name), Some(icon), kind, connection)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        name::Name,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        CONTRIBUTION_CATEGORY_NAME, CategoryKind, CategoryRef, DEFAULT_EXPENSE_CATEGORIES,
        DEFAULT_INCOME_CATEGORIES, create_category, find_contribution_category, get_categories,
        seed_default_categories,
    };

    #[test]
    fn create_and_list_categories_by_kind() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        let food = create_category(
            user_id,
            Name::new_unchecked("Food"),
            Some("🍚"),
            CategoryKind::Expense,
            &connection,
        )
        .unwrap();
        let salary = create_category(
            user_id,
            Name::new_unchecked("Salary"),
            None,
            CategoryKind::Income,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_categories(user_id, CategoryKind::Expense, &connection),
            Ok(vec![food])
        );
        assert_eq!(
            get_categories(user_id, CategoryKind::Income, &connection),
            Ok(vec![salary])
        );
    }

    #[test]
    fn same_name_in_both_kinds_is_allowed() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        for kind in [CategoryKind::Income, CategoryKind::Expense] {
            create_category(user_id, Name::new_unchecked("Other"), None, kind, &connection)
                .unwrap();
        }
    }

    #[test]
    fn duplicate_name_is_rejected_ignoring_case() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        create_category(
            user_id,
            Name::new_unchecked("Food"),
            None,
            CategoryKind::Expense,
            &connection,
        )
        .unwrap();

        let result = create_category(
            user_id,
            Name::new_unchecked("FOOD"),
            None,
            CategoryKind::Expense,
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateCategoryName("FOOD".to_owned())));
    }

    #[test]
    fn users_do_not_see_each_others_categories() {
        let connection = get_test_connection();
        let juan = create_test_user("juan@example.ph", &connection);
        let maria = create_test_user("maria@example.ph", &connection);
        create_category(
            juan,
            Name::new_unchecked("Food"),
            None,
            CategoryKind::Expense,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_categories(maria, CategoryKind::Expense, &connection),
            Ok(vec![])
        );
    }

    #[test]
    fn seeds_defaults_including_contribution() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);

        seed_default_categories(user_id, &connection).unwrap();

        let income = get_categories(user_id, CategoryKind::Income, &connection).unwrap();
        let expense = get_categories(user_id, CategoryKind::Expense, &connection).unwrap();
        assert_eq!(income.len(), DEFAULT_INCOME_CATEGORIES.len());
        assert_eq!(expense.len(), DEFAULT_EXPENSE_CATEGORIES.len());
        let contribution = find_contribution_category(&expense).unwrap();
        assert_eq!(contribution.name.as_ref(), CONTRIBUTION_CATEGORY_NAME);
    }

    #[test]
    fn finds_contribution_category_ignoring_case() {
        let connection = get_test_connection();
        let user_id = create_test_user("juan@example.ph", &connection);
        let category = create_category(
            user_id,
            Name::new_unchecked("contribution"),
            None,
            CategoryKind::Expense,
            &connection,
        )
        .unwrap();

        assert_eq!(find_contribution_category(&[category.clone()]), Some(&category));
    }

    #[test]
    fn category_ref_is_written_with_its_kind() {
        let food = CategoryRef {
            kind: CategoryKind::Expense,
            id: 1,
        };

        assert_eq!(food.to_string(), "expense:1");
        assert_eq!("expense:1".parse(), Ok(food));
        assert_eq!(
            "income:1".parse::<CategoryRef>().map(|category| category.kind),
            Ok(CategoryKind::Income)
        );
    }

    #[test]
    fn bare_or_unknown_category_ref_is_rejected() {
        for raw in ["1", "savings:1", "expense:", "expense:abc", ""] {
            assert!(raw.parse::<CategoryRef>().is_err(), "parsed {raw:?}");
        }
    }
}
