//! The form fields shared by the create and edit category pages.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    category::CATEGORY_PALETTE,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// Render the name, color and budget inputs prefilled with the given values.
pub(super) fn category_form_fields(name: &str, color: &str, budget_amount: Decimal) -> Markup {
    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

            input
                id="name"
                type="text"
                name="name"
                value=(name)
                placeholder="e.g. Groceries"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        fieldset
        {
            legend class=(FORM_LABEL_STYLE) { "Color" }

            div class="flex flex-wrap gap-2"
            {
                @for swatch in CATEGORY_PALETTE {
                    label class="cursor-pointer" title=(swatch)
                    {
                        input
                            type="radio"
                            name="color"
                            value=(swatch)
                            checked[swatch == color]
                            required
                            class="peer sr-only";

                        span
                            class="block w-8 h-8 rounded-full border-2 border-transparent
                                peer-checked:border-gray-900 dark:peer-checked:border-white"
                            style=(format!("background-color: {swatch};"))
                        {}
                    }
                }
            }
        }

        div
        {
            label for="budget_amount" class=(FORM_LABEL_STYLE) { "Monthly Budget" }

            div class="input-wrapper"
            {
                input
                    id="budget_amount"
                    type="number"
                    name="budget_amount"
                    value=(budget_amount)
                    min="0"
                    step="0.01"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}
