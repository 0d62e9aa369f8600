//! Expense deletion confirmation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
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
        Expense, ExpenseId,
        db::{delete_expense, get_expense},
    },
    html::{BUTTON_DELETE_STYLE, FORM_CONTAINER_STYLE, base, format_currency, link},
    navigation::NavBar,
};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<DeleteExpenseState> for Key {
    fn from_ref(state: &DeleteExpenseState) -> Self {
        state.cookie_key.clone()
    }
}

/// Ask the user to confirm deleting one of their expenses.
///
/// Nothing is deleted until the confirmation form is submitted.
pub async fn get_delete_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseState>,
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

    Ok(delete_expense_view(&expense).into_response())
}

/// Handle expense deletion.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_expense(user_id, expense_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
        }
    })?;

    let jar = set_flash_alert(jar, Alert::warning("Expense deleted."));

    Ok((jar, Redirect::to(endpoints::EXPENSES_VIEW)).into_response())
}

fn delete_expense_view(expense: &Expense) -> Markup {
    let nav_bar = NavBar::new(endpoints::DELETE_EXPENSE_VIEW).into_html();
    let action = endpoints::format_endpoint(endpoints::DELETE_EXPENSE_VIEW, expense.id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Delete Expense" }

                p
                {
                    "Are you sure you want to delete this expense? This cannot be undone."
                }

                dl class="grid grid-cols-2 gap-2"
                {
                    dt class="font-medium" { "Date" }
                    dd { (expense.date) }
                    dt class="font-medium" { "Category" }
                    dd { (expense.category) }
                    dt class="font-medium" { "Amount" }
                    dd { (format_currency(expense.amount.as_decimal())) }

                    @if let Some(note) = &expense.note {
                        dt class="font-medium" { "Note" }
                        dd { (note) }
                    }
                }

                form method="post" action=(action) class="space-y-4"
                {
                    button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }

                    p class="text-sm" { (link(endpoints::EXPENSES_VIEW, "Cancel")) }
                }
            }
        }
    };

    base("Delete Expense", &[], &content)
}

#[cfg(test)]
mod delete_expense_page_tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use time::macros::date;

    use crate::{
        endpoints,
        expense::{
            db::get_expense,
            delete::{DeleteExpenseState, get_delete_expense_page},
        },
        test_utils::{
            assert_form_action, assert_form_submit_button_with_text, assert_status_ok,
            assert_valid_html, create_test_user, get_test_app_state, insert_test_expense,
            must_get_form, parse_html_document,
        },
    };

    fn get_state() -> DeleteExpenseState {
        let app_state = get_test_app_state();

        DeleteExpenseState {
            cookie_key: app_state.cookie_key,
            db_connection: app_state.db_connection,
        }
    }

    #[tokio::test]
    async fn confirmation_page_does_not_delete() {
        let state = get_state();
        let (alice, expense) = {
            let connection = state.db_connection.lock().unwrap();
            let alice = create_test_user("alice", &connection);
            let expense =
                insert_test_expense(alice, "10", "Food", date!(2024 - 01 - 05), &connection);
            (alice, expense)
        };

        let response =
            get_delete_expense_page(Path(expense.id), State(state.clone()), Extension(alice))
                .await
                .into_response();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_action(
            &form,
            &endpoints::format_endpoint(endpoints::DELETE_EXPENSE_VIEW, expense.id),
        );
        assert_form_submit_button_with_text(&form, "Delete");
        assert_eq!(
            get_expense(alice, expense.id, &state.db_connection.lock().unwrap()),
            Ok(expense)
        );
    }

    #[tokio::test]
    async fn other_users_expense_is_not_found() {
        let state = get_state();
        let (bob, expense) = {
            let connection = state.db_connection.lock().unwrap();
            let alice = create_test_user("alice", &connection);
            let bob = create_test_user("bob", &connection);
            let expense =
                insert_test_expense(alice, "10", "Food", date!(2024 - 01 - 05), &connection);
            (bob, expense)
        };

        let response = get_delete_expense_page(Path(expense.id), State(state), Extension(bob))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[cfg(test)]
mod delete_expense_endpoint_tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::PrivateCookieJar;
    use time::macros::date;

    use crate::{
        Error, endpoints,
        expense::{
            db::get_expense,
            delete::{DeleteExpenseState, delete_expense_endpoint},
        },
        test_utils::{
            assert_redirect, create_test_user, get_test_app_state, insert_test_expense,
        },
    };

    fn get_state() -> DeleteExpenseState {
        let app_state = get_test_app_state();

        DeleteExpenseState {
            cookie_key: app_state.cookie_key,
            db_connection: app_state.db_connection,
        }
    }

    #[tokio::test]
    async fn can_delete_expense() {
        let state = get_state();
        let (alice, expense) = {
            let connection = state.db_connection.lock().unwrap();
            let alice = create_test_user("alice", &connection);
            let expense =
                insert_test_expense(alice, "10", "Food", date!(2024 - 01 - 05), &connection);
            (alice, expense)
        };
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response =
            delete_expense_endpoint(Path(expense.id), State(state.clone()), Extension(alice), jar)
                .await
                .into_response();

        assert_redirect(&response, endpoints::EXPENSES_VIEW);
        assert_eq!(
            get_expense(alice, expense.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn other_users_expense_is_not_found_and_kept() {
        let state = get_state();
        let (alice, bob, expense) = {
            let connection = state.db_connection.lock().unwrap();
            let alice = create_test_user("alice", &connection);
            let bob = create_test_user("bob", &connection);
            let expense =
                insert_test_expense(alice, "10", "Food", date!(2024 - 01 - 05), &connection);
            (alice, bob, expense)
        };
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response =
            delete_expense_endpoint(Path(expense.id), State(state.clone()), Extension(bob), jar)
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_expense(alice, expense.id, &state.db_connection.lock().unwrap()),
            Ok(expense)
        );
    }
}
