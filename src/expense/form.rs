//! The expense form, shared by adding and modifying expenses.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        loading_spinner,
    },
    ledger::{EditTarget, ExpenseForm},
};

/// Render the expense form pre-filled with `form`.
///
/// When `edit_target` points at an entry the form overwrites that entry, otherwise it
/// adds a new one. `error_message` is shown below the inputs if it is not empty.
pub(crate) fn expense_form_view(
    form: &ExpenseForm,
    edit_target: EditTarget,
    error_message: &str,
) -> Markup {
    let (heading, submit_text) = match edit_target {
        EditTarget::None => ("Add Expense".to_owned(), "Add Expense"),
        EditTarget::Editing(position) => (format!("Modify Expense #{position}"), "Save Changes"),
    };
    let update_endpoint = edit_target
        .position()
        .map(|position| endpoints::format_endpoint(endpoints::EXPENSE, position));

    html! {
        form
            id="expense-form"
            hx-post=[update_endpoint.is_none().then_some(endpoints::EXPENSES_API)]
            hx-put=[update_endpoint.as_deref()]
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { (heading) }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        value=(form.amount)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(form.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    id="category"
                    type="text"
                    name="category"
                    placeholder="Groceries"
                    value=(form.category)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="Optional"
                    value=(form.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-500 text-base"
                {
                    (error_message)
                }
            }

            button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                (submit_text)
            }

            @if edit_target != EditTarget::None {
                button
                    type="button"
                    hx-post=(endpoints::DISCARD_EDIT)
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Discard Changes"
                }
            }
        }
    }
}
