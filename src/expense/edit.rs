//! Expense editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::{Alert, set_flash_alert},
    auth::UserID,
    endpoints,
    expense::{
        ExpenseId,
        db::{get_expense, update_expense},
        form::{ExpenseForm, ExpenseFormErrors, expense_form_view},
    },
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for editing an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<EditExpenseState> for Key {
    fn from_ref(state: &EditExpenseState) -> Self {
        state.cookie_key.clone()
    }
}

/// Render the edit page for one of the logged-in user's expenses.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(user_id, expense_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve expense {expense_id}: {error}");
        }
    })?;

    let form = ExpenseForm::from(&expense);

    Ok(edit_expense_view(expense_id, &form, &ExpenseFormErrors::default()).into_response())
}

/// Handle expense edit form submission.
pub async fn update_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    // Someone else's expense gets a 404 even when the submitted form is invalid.
    get_expense(user_id, expense_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve expense {expense_id} for update: {error}");
        }
    })?;

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => return Ok(edit_expense_view(expense_id, &form, &errors).into_response()),
    };

    update_expense(user_id, expense_id, &fields, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
        }
    })?;

    let jar = set_flash_alert(jar, Alert::success("Expense updated."));

    Ok((jar, Redirect::to(endpoints::EXPENSES_VIEW)).into_response())
}

fn edit_expense_view(
    expense_id: ExpenseId,
    form: &ExpenseForm,
    errors: &ExpenseFormErrors,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_EXPENSE_VIEW).into_html();
    let action = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense_id);
    let form = expense_form_view(&action, "Save Changes", form, errors);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Edit Expense" }

                (form)
            }
        }
    };

    base("Edit Expense", &[], &content)
}
