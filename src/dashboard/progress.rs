//! Spending versus budget for each category in a month.

use std::collections::HashMap;

use maud::{Markup, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    Error,
    analytics::MonthlySummaryRow,
    category::{Category, CategoryId},
    html::{CARD_STYLE, category_badge, format_currency},
};

/// How much of a category's budget has been spent.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategoryProgress {
    pub category_id: CategoryId,
    pub name: String,
    pub color: String,
    pub budget: Decimal,
    pub spent: Decimal,
    /// The share of the budget spent as a percentage, zero when the budget is zero.
    pub percent_used: Decimal,
}

impl CategoryProgress {
    pub fn is_over_budget(&self) -> bool {
        self.percent_used > Decimal::ONE_HUNDRED
    }
}

/// Pair each category with the amount spent against it in `rows`.
///
/// Categories are returned in the order given. Rows for categories not in
/// `categories` are ignored.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if a total or percentage does not fit in a
/// [Decimal].
pub(super) fn category_progress(
    categories: &[Category],
    rows: &[MonthlySummaryRow],
) -> Result<Vec<CategoryProgress>, Error> {
    let mut spent_by_category: HashMap<CategoryId, Decimal> = HashMap::new();

    for row in rows {
        let spent = spent_by_category.entry(row.category_id).or_default();
        *spent = spent
            .checked_add(row.total_spent)
            .ok_or(Error::AmountOverflow)?;
    }

    categories
        .iter()
        .map(|category| {
            let budget = category.budget_amount.as_decimal();
            let spent = spent_by_category
                .get(&category.id)
                .copied()
                .unwrap_or_default();

            Ok(CategoryProgress {
                category_id: category.id,
                name: category.name.to_string(),
                color: category.color.to_string(),
                budget,
                spent,
                percent_used: percent_used(spent, budget)?,
            })
        })
        .collect()
}

fn percent_used(spent: Decimal, budget: Decimal) -> Result<Decimal, Error> {
    if budget.is_zero() {
        return Ok(Decimal::ZERO);
    }

    spent
        .checked_div(budget)
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(Error::AmountOverflow)
}

pub(super) fn progress_card(progress: &CategoryProgress) -> Markup {
    let bar_width = progress
        .percent_used
        .min(Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or_default();
    let bar_color = if progress.is_over_budget() {
        "bg-red-600"
    } else {
        "bg-blue-600"
    };

    html!(
        div class=(CARD_STYLE) data-category-progress=(progress.category_id)
        {
            div class="flex justify-between items-center mb-2"
            {
                (category_badge(&progress.name, &progress.color))

                @if progress.is_over_budget() {
                    span
                        class="text-xs font-semibold text-red-600 dark:text-red-400"
                        data-over-budget
                    { "Over budget" }
                }
            }

            div class="w-full h-2 rounded-full bg-gray-200 dark:bg-gray-700"
            {
                div
                    class={"h-2 rounded-full " (bar_color)}
                    style={"width: " (bar_width) "%"}
                {}
            }

            p class="mt-2 text-sm text-gray-600 dark:text-gray-400"
            {
                span data-spent { (format_currency(progress.spent)) }
                " of "
                span data-budget { (format_currency(progress.budget)) }
                " ("
                span data-percent-used { (progress.percent_used.round_dp(1).normalize()) "%" }
                ")"
            }
        }
    )
}
