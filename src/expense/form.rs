//! The expense form: raw input, validation and the shared HTML.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error, endpoints,
    expense::{
        Amount, Category, Expense, ExpenseFields,
        domain::{NOTE_MAX_LENGTH, SUGGESTED_CATEGORIES, parse_note},
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, field_error, link,
    },
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The raw values submitted with the expense form.
///
/// Fields the form does not define, such as an owner, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseForm {
    pub amount: String,
    pub category: String,
    pub date: String,
    pub note: String,
}

/// Validation messages for each field of an [ExpenseForm].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFormErrors {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub note: Option<String>,
}

impl ExpenseForm {
    /// A blank form with `date` filled in.
    pub fn with_date(date: Date) -> Self {
        Self {
            date: date.to_string(),
            ..Default::default()
        }
    }

    /// Check every field and collect all problems, not just the first.
    pub fn validate(&self) -> Result<ExpenseFields, ExpenseFormErrors> {
        let amount = Amount::new(&self.amount);
        let category = Category::new(&self.category);
        let date = parse_date(&self.date);
        let note = parse_note(&self.note);

        match (amount, category, date, note) {
            (Ok(amount), Ok(category), Ok(date), Ok(note)) => Ok(ExpenseFields {
                amount,
                category,
                date,
                note,
            }),
            (amount, category, date, note) => Err(ExpenseFormErrors {
                amount: amount.err().map(|error| error.to_string()),
                category: category.err().map(|error| error.to_string()),
                date: date.err().map(|error| error.to_string()),
                note: note.err().map(|error| error.to_string()),
            }),
        }
    }
}

impl From<&Expense> for ExpenseForm {
    fn from(expense: &Expense) -> Self {
        Self {
            amount: expense.amount.to_string(),
            category: expense.category.to_string(),
            date: expense.date.to_string(),
            note: expense.note.clone().unwrap_or_default(),
        }
    }
}

fn parse_date(raw_date: &str) -> Result<Date, Error> {
    let trimmed = raw_date.trim();

    Date::parse(trimmed, DATE_FORMAT).map_err(|_| Error::InvalidDate(trimmed.to_owned()))
}

/// The add/edit expense form posting to `action`.
pub fn expense_form_view(
    action: &str,
    submit_label: &str,
    form: &ExpenseForm,
    errors: &ExpenseFormErrors,
) -> Markup {
    html! {
        form
            method="post"
            action=(action)
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

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

                (field_error(errors.amount.as_deref()))
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    id="category"
                    type="text"
                    name="category"
                    list="category-suggestions"
                    maxlength=(Category::MAX_LENGTH)
                    placeholder="Food"
                    value=(form.category)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                datalist id="category-suggestions"
                {
                    @for category in SUGGESTED_CATEGORIES {
                        option value=(category) {}
                    }
                }

                (field_error(errors.category.as_deref()))
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

                (field_error(errors.date.as_deref()))
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note (optional)" }

                textarea
                    id="note"
                    name="note"
                    rows="3"
                    maxlength=(NOTE_MAX_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (form.note)
                }

                (field_error(errors.note.as_deref()))
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }

            p class="text-sm" { (link(endpoints::EXPENSES_VIEW, "Cancel")) }
        }
    }
}
