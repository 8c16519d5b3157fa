//! Groups expenses into per month, per category spending totals.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, UtcOffset};

use crate::{
    Error,
    auth::UserID,
    category::CategoryId,
    expense::{DateWindow, Expense, ExpenseStore},
};

time::serde::format_description!(month_format, Date, "[year]-[month]-[day]");

/// The display details of a category needed for summaries and charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMetadata {
    pub name: String,
    /// A hex color like `#10b981`.
    pub color: String,
}

/// The spending in one category during one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummaryRow {
    pub user_id: UserID,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_color: String,
    /// The first day of the month.
    #[serde(with = "month_format")]
    pub month: Date,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
    pub transaction_count: usize,
}

/// The first day of the UTC month that `expense` was created in.
fn month_key(expense: &Expense) -> Result<Date, Error> {
    let date = expense.created_at.to_offset(UtcOffset::UTC).date();

    date.replace_day(1)
        .map_err(|error| Error::InvalidDate(error.to_string()))
}

/// Produce one row per (month, category) pair found in `expenses`.
///
/// Months are UTC calendar months. Totals are summed exactly. The order of the
/// returned rows is unspecified, see [sort_summary_rows].
///
/// # Errors
///
/// Returns [Error::MissingCategoryMetadata] if an expense's category is not
/// in `categories`, or [Error::AmountOverflow] if a total does not fit in a
/// [Decimal]. No partial result is returned.
pub fn aggregate_monthly_spending(
    expenses: &[Expense],
    categories: &HashMap<CategoryId, CategoryMetadata>,
) -> Result<Vec<MonthlySummaryRow>, Error> {
    let mut groups: BTreeMap<(Date, CategoryId), MonthlySummaryRow> = BTreeMap::new();

    for expense in expenses {
        let month = month_key(expense)?;
        let category = categories
            .get(&expense.category_id)
            .ok_or(Error::MissingCategoryMetadata(expense.category_id))?;

        let row = groups
            .entry((month, expense.category_id))
            .or_insert_with(|| MonthlySummaryRow {
                user_id: expense.user_id,
                category_id: expense.category_id,
                category_name: category.name.clone(),
                category_color: category.color.clone(),
                month,
                total_spent: Decimal::ZERO,
                transaction_count: 0,
            });

        row.total_spent = row
            .total_spent
            .checked_add(expense.amount.as_decimal())
            .ok_or(Error::AmountOverflow)?;
        row.transaction_count += 1;
    }

    Ok(groups.into_values().collect())
}

/// Fetch `user`'s expenses in `window` from `store` and aggregate them.
///
/// The category metadata comes from the store's join, so an expense whose
/// category has since disappeared fails the whole summary.
pub fn monthly_spending_summary(
    store: &dyn ExpenseStore,
    user: Option<UserID>,
    window: Option<DateWindow>,
) -> Result<Vec<MonthlySummaryRow>, Error> {
    let rows = store.get_expenses(user, window)?;

    let mut categories = HashMap::new();
    let mut expenses = Vec::with_capacity(rows.len());

    for row in rows {
        if let Some(category) = row.category {
            categories.insert(row.expense.category_id, category);
        }
        expenses.push(row.expense);
    }

    aggregate_monthly_spending(&expenses, &categories)
}

/// Sort rows by month ascending, then by category name.
pub fn sort_summary_rows(rows: &mut [MonthlySummaryRow]) {
    rows.sort_by(|a, b| {
        a.month
            .cmp(&b.month)
            .then_with(|| a.category_name.cmp(&b.category_name))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
}
