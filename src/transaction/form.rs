use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
    transaction::TransactionType,
};

/// The add-transaction form.
///
/// The form has no date field: transactions are always recorded against the
/// current day by the server. Submissions go through htmx; a successful
/// submission redirects to the dashboard (which clears the form), a failed
/// one swaps an alert into the alert container and leaves the inputs as they
/// are.
pub fn add_transaction_form() -> Markup {
    let is_expense = true;

    html! {
        div class=(CARD_STYLE)
        {
            div class="p-6 space-y-4"
            {
                h2 class="text-xl font-bold text-gray-900 dark:text-white" { "Add Transaction" }

                form
                    hx-post=(endpoints::TRANSACTIONS_API)
                    hx-target-error="#alert-container"
                    hx-indicator="#indicator"
                    hx-disabled-elt="#amount, #description, #category, #submit-button"
                    class="space-y-4"
                {
                    fieldset class="space-y-2"
                    {
                        legend class=(FORM_LABEL_STYLE) { "Transaction type" }

                        div class=(FORM_RADIO_GROUP_STYLE)
                        {
                            div class="flex flex-1 items-center gap-3"
                            {
                                input
                                    name="type"
                                    id="transaction-type-expense"
                                    type="radio"
                                    value="expense"
                                    checked[is_expense]
                                    required
                                    tabindex="0"
                                    class=(FORM_RADIO_INPUT_STYLE);

                                label
                                    for="transaction-type-expense"
                                    class=(FORM_RADIO_LABEL_STYLE)
                                {
                                    "Expense"
                                }
                            }

                            div class="flex flex-1 items-center gap-3"
                            {
                                input
                                    name="type"
                                    id="transaction-type-income"
                                    type="radio"
                                    value="income"
                                    checked[!is_expense]
                                    required
                                    tabindex="0"
                                    class=(FORM_RADIO_INPUT_STYLE);

                                label
                                    for="transaction-type-income"
                                    class=(FORM_RADIO_LABEL_STYLE)
                                {
                                    "Income"
                                }
                            }
                        }
                    }

                    div
                    {
                        label
                            for="amount"
                            class=(FORM_LABEL_STYLE)
                        {
                            "Amount"
                        }

                        div class="input-wrapper w-full"
                        {
                            input
                                name="amount"
                                id="amount"
                                type="number"
                                step="0.01"
                                placeholder="0.00"
                                min="0.01"
                                max="999999999.99"
                                required
                                class=(FORM_TEXT_INPUT_STYLE);
                        }
                    }

                    div
                    {
                        label
                            for="description"
                            class=(FORM_LABEL_STYLE)
                        {
                            "Description"
                        }

                        input
                            name="description"
                            id="description"
                            type="text"
                            placeholder="What was this for?"
                            maxlength="200"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label
                            for="category"
                            class=(FORM_LABEL_STYLE)
                        {
                            "Category (Optional)"
                        }

                        input
                            name="category"
                            id="category"
                            type="text"
                            placeholder="e.g., Food, Transport, Salary"
                            maxlength="100"
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button
                        type="submit" id="submit-button" tabindex="0"
                        class=(BUTTON_PRIMARY_STYLE)
                    {
                        span class="inline htmx-indicator" id="indicator"
                        {
                            (loading_spinner())
                        }
                        "Add Transaction"
                    }
                }
            }
        }
    }
}
