//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, money::check_max_amount};

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hex color of the form `#rrggbb`, stored in lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// The color used when the user does not pick one.
    pub const DEFAULT: &str = "#3b82f6";

    /// Parse a `#rrggbb` hex color.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCategoryColor] for anything else, including the
    /// three digit shorthand.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim();

        let is_hex_color = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());

        if is_hex_color {
            Ok(Self(color.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidCategoryColor(color.to_owned()))
        }
    }

    /// Create a color without validation.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }
}

impl Default for CategoryColor {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl AsRef<str> for CategoryColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The amount of the monthly income set aside for a category. Never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct BudgetAmount(Decimal);

impl BudgetAmount {
    /// # Errors
    ///
    /// Returns [Error::NegativeBudget] if `amount` is below zero, or
    /// [Error::AmountTooLarge] if it is above [crate::MAX_AMOUNT].
    pub fn new(amount: Decimal) -> Result<Self, Error> {
        if amount.is_sign_negative() && !amount.is_zero() {
            Err(Error::NegativeBudget)
        } else {
            check_max_amount(amount).map(Self)
        }
    }

    /// Create a budget amount without validation.
    pub fn new_unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

/// A spending bucket with a monthly budget allocation (e.g., 'Groceries').
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserID,
    pub name: CategoryName,
    pub color: CategoryColor,
    pub budget_amount: BudgetAmount,
    pub created_at: OffsetDateTime,
}

/// The validated fields needed to insert a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub user_id: UserID,
    pub name: CategoryName,
    pub color: CategoryColor,
    pub budget_amount: BudgetAmount,
}

/// Form data for category creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub color: String,
    pub budget_amount: Decimal,
}

impl CategoryFormData {
    /// Validate every field of the form.
    pub fn validate(&self) -> Result<(CategoryName, CategoryColor, BudgetAmount), Error> {
        Ok((
            CategoryName::new(&self.name)?,
            CategoryColor::new(&self.color)?,
            BudgetAmount::new(self.budget_amount)?,
        ))
    }
}

/// A category that can be added in one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetCategory {
    pub name: &'static str,
    pub color: &'static str,
}

/// Common household spending categories.
pub const PRESET_CATEGORIES: [PresetCategory; 12] = [
    PresetCategory { name: "Rent/Mortgage", color: "#3b82f6" },
    PresetCategory { name: "Groceries", color: "#10b981" },
    PresetCategory { name: "Transportation", color: "#f59e0b" },
    PresetCategory { name: "Utilities", color: "#8b5cf6" },
    PresetCategory { name: "Internet", color: "#06b6d4" },
    PresetCategory { name: "Phone", color: "#84cc16" },
    PresetCategory { name: "Insurance", color: "#f97316" },
    PresetCategory { name: "Entertainment", color: "#ec4899" },
    PresetCategory { name: "Dining Out", color: "#ef4444" },
    PresetCategory { name: "Healthcare", color: "#14b8a6" },
    PresetCategory { name: "Clothing", color: "#a855f7" },
    PresetCategory { name: "Savings", color: "#22c55e" },
];

/// The swatches offered by the category form.
pub const CATEGORY_PALETTE: [&str; 14] = [
    "#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#06b6d4", "#84cc16", "#f97316", "#ec4899",
    "#ef4444", "#14b8a6", "#a855f7", "#22c55e", "#6366f1", "#d946ef",
];



#[cfg(test)]
mod budget_amount_tests {
    use rust_decimal::Decimal;

    use crate::{Error, MAX_AMOUNT, category::BudgetAmount};

    #[test]
    fn rejects_amount_above_limit() {
        assert!(BudgetAmount::new(MAX_AMOUNT).is_ok());
        assert_eq!(BudgetAmount::new(Decimal::MAX), Err(Error::AmountTooLarge));
    }

    #[test]
    fn rejects_negative_amount() {
        assert_eq!(
            BudgetAmount::new(Decimal::new(-1, 2)),
            Err(Error::NegativeBudget)
        );
    }

    #[test]
    fn accepts_zero() {
        let amount = BudgetAmount::new(Decimal::ZERO).unwrap();

        assert_eq!(amount.as_decimal(), Decimal::ZERO);
    }
}
