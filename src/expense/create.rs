//! Expense creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
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
        create_expense,
        form::{ExpenseForm, ExpenseFormErrors, expense_form_view},
    },
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub cookie_key: Key,
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<CreateExpenseState> for Key {
    fn from_ref(state: &CreateExpenseState) -> Self {
        state.cookie_key.clone()
    }
}

/// Render the new expense page with today's date filled in.
pub async fn get_new_expense_page(
    State(state): State<CreateExpenseState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let form = ExpenseForm::with_date(today);

    Ok(new_expense_view(&form, &ExpenseFormErrors::default()).into_response())
}

/// Handle expense creation form submission.
///
/// The new expense always belongs to the logged-in user.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseForm>,
) -> Result<Response, Error> {
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => return Ok(new_expense_view(&form, &errors).into_response()),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    create_expense(user_id, &fields, &connection).inspect_err(|error| {
        tracing::error!("An unexpected error occurred while creating an expense: {error}")
    })?;

    let jar = set_flash_alert(jar, Alert::success("Expense added."));

    Ok((jar, Redirect::to(endpoints::EXPENSES_VIEW)).into_response())
}

fn new_expense_view(form: &ExpenseForm, errors: &ExpenseFormErrors) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let form = expense_form_view(endpoints::NEW_EXPENSE_VIEW, "Add Expense", form, errors);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Add Expense" }

                (form)
            }
        }
    };

    base("Add Expense", &[], &content)
}


#[cfg(test)]
mod create_expense_endpoint_tests {
    use axum::{
        Extension, Form, Router, extract::State, http::StatusCode, response::IntoResponse,
        routing::post,
    };
    use axum_extra::extract::PrivateCookieJar;
    use axum_test::TestServer;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        alert::COOKIE_FLASH,
        endpoints,
        expense::{
            create::{CreateExpenseState, create_expense_endpoint},
            form::ExpenseForm,
            list_expenses,
        },
        test_utils::{
            assert_form_error_messages, assert_form_input_with_value, assert_redirect,
            assert_status_ok, assert_valid_html, create_test_user, get_test_app_state,
            must_get_form, parse_html_document,
        },
    };

    fn get_state() -> CreateExpenseState {
        let app_state = get_test_app_state();

        CreateExpenseState {
            cookie_key: app_state.cookie_key,
            local_timezone: app_state.local_timezone,
            db_connection: app_state.db_connection,
        }
    }

    #[tokio::test]
    async fn can_create_expense() {
        let state = get_state();
        let alice = create_test_user("alice", &state.db_connection.lock().unwrap());
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let form = ExpenseForm {
            amount: "12.5".to_owned(),
            category: "Food".to_owned(),
            date: "2024-01-05".to_owned(),
            note: "lunch".to_owned(),
        };

        let response =
            create_expense_endpoint(State(state.clone()), Extension(alice), jar, Form(form))
                .await
                .into_response();

        assert_redirect(&response, endpoints::EXPENSES_VIEW);
        let set_cookie = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>();
        assert!(
            set_cookie
                .iter()
                .any(|cookie| cookie.starts_with(&format!("{COOKIE_FLASH}="))),
            "want a flash cookie, got {set_cookie:?}"
        );

        let expenses = list_expenses(alice, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].owner, alice);
        assert_eq!(expenses[0].amount.as_decimal(), dec!(12.50));
        assert_eq!(expenses[0].category.as_ref(), "Food");
        assert_eq!(expenses[0].date, date!(2024 - 01 - 05));
        assert_eq!(expenses[0].note.as_deref(), Some("lunch"));
    }

    #[tokio::test]
    async fn invalid_form_is_rendered_with_errors_and_not_saved() {
        let state = get_state();
        let alice = create_test_user("alice", &state.db_connection.lock().unwrap());
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let form = ExpenseForm {
            amount: "-3".to_owned(),
            category: "  ".to_owned(),
            date: "2024-01-05".to_owned(),
            note: String::new(),
        };

        let response =
            create_expense_endpoint(State(state.clone()), Extension(alice), jar, Form(form))
                .await
                .into_response();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "amount", "number", "-3");
        assert_form_input_with_value(&form, "date", "date", "2024-01-05");
        assert_form_error_messages(
            &form,
            &["amount cannot be negative", "category cannot be empty"],
        );
        assert!(
            list_expenses(alice, &state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn owner_field_in_form_is_ignored() {
        let state = get_state();
        let (alice, bob) = {
            let connection = state.db_connection.lock().unwrap();
            (
                create_test_user("alice", &connection),
                create_test_user("bob", &connection),
            )
        };
        let app = Router::new()
            .route(endpoints::NEW_EXPENSE_VIEW, post(create_expense_endpoint))
            .layer(Extension(alice))
            .with_state(state.clone());
        let server = TestServer::new(app).expect("Could not create test server.");
        let bob_id = bob.to_string();

        let response = server
            .post(endpoints::NEW_EXPENSE_VIEW)
            .form(&[
                ("amount", "10"),
                ("category", "Food"),
                ("date", "2024-01-05"),
                ("note", ""),
                ("owner", bob_id.as_str()),
                ("owner_id", bob_id.as_str()),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(list_expenses(alice, &connection).unwrap().len(), 1);
        assert!(list_expenses(bob, &connection).unwrap().is_empty());
    }
}
