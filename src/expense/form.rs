use maud::{Markup, html};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    category::{Category, CategoryId},
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE},
};

pub(super) struct ExpenseFormDefaults<'a> {
    pub category_id: Option<CategoryId>,
    pub amount: Option<Decimal>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub max_date: Date,
}

pub(super) fn expense_form_fields(
    defaults: &ExpenseFormDefaults<'_>,
    categories: &[Category],
) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{:.2}", amount));

    html! {
        div
        {
            label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

            @if categories.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You need a category before you can log an expense. "
                    a href=(endpoints::BUDGET_VIEW) class=(LINK_STYLE) { "Set up your budget" }
                }
            }

            select
                name="category_id"
                id="category_id"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Select a category" }

                @for category in categories {
                    @if Some(category.id) == defaults.category_id {
                        option value=(category.id) selected { (category.name) }
                    } @else {
                        option value=(category.id) { (category.name) }
                    }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.01"
                    min="0.01"
                    required
                    value=[amount_str.as_deref()]
                    autofocus
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
                max=(defaults.max_date)
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description (optional)" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
