//! Account registration: the sign-up page and the endpoint that creates the user.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{Username, create_user, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, field_error, link,
        loading_spinner, log_in_register, password_input, username_input,
    },
    internal_server_error::get_internal_server_error_hx_redirect,
};

/// Checked by the browser only. The server relies on the strength check instead.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

const PASSWORD_MISMATCH_MSG: &str = "passwords do not match";

/// The state needed to register a user and log them in.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Messages shown under the registration form fields.
#[derive(Debug, Default, PartialEq)]
struct RegistrationErrors {
    username: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

impl RegistrationErrors {
    fn username(error: &Error) -> Self {
        Self {
            username: Some(error.to_string()),
            ..Default::default()
        }
    }
}

/// Check every field of `form`, reporting all problems at once.
fn validate_registration(
    form: &RegisterForm,
) -> Result<(Username, ValidatedPassword), RegistrationErrors> {
    let username = Username::new(&form.username);
    let password = ValidatedPassword::new(&form.password);
    let passwords_match = form.password == form.confirm_password;

    match (username, password, passwords_match) {
        (Ok(username), Ok(password), true) => Ok((username, password)),
        (username, password, passwords_match) => Err(RegistrationErrors {
            username: username.err().map(|error| error.to_string()),
            password: password.err().map(|error| error.to_string()),
            confirm_password: (!passwords_match).then(|| PASSWORD_MISMATCH_MSG.to_owned()),
        }),
    }
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm password" }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(PASSWORD_INPUT_MIN_LENGTH)
                autofocus[error_message.is_some()];

            (field_error(error_message))
        }
    }
}

fn registration_form(form: &RegisterForm, errors: &RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (username_input(&form.username, errors.username.as_deref()))
            (password_input(&form.password, PASSWORD_INPUT_MIN_LENGTH, errors.password.as_deref()))
            (confirm_password_input(errors.confirm_password.as_deref()))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already registered? " (link(endpoints::LOG_IN_VIEW, "Log in"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let empty_form = RegisterForm {
        username: String::new(),
        password: String::new(),
        confirm_password: String::new(),
    };
    let form = registration_form(&empty_form, &RegistrationErrors::default());
    let content = log_in_register("Create an account", &form);

    base("Register", &[], &content).into_response()
}

/// Create a new user and log them in.
///
/// Invalid input and taken usernames are reported by returning the form with
/// messages under the offending fields.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let (username, password) = match validate_registration(&form) {
        Ok(fields) => fields,
        Err(errors) => return registration_form(&form, &errors).into_response(),
    };

    let password_hash = match PasswordHash::new(password, PasswordHash::DEFAULT_COST) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("could not hash password for new user: {error}");
            return get_internal_server_error_hx_redirect();
        }
    };

    let created_user = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| create_user(username, password_hash, &connection));

    let user = match created_user {
        Ok(user) => user,
        Err(error @ Error::DuplicateUsername(_)) => {
            return registration_form(&form, &RegistrationErrors::username(&error))
                .into_response();
        }
        Err(error) => {
            tracing::error!("could not create user: {error}");
            return get_internal_server_error_hx_redirect();
        }
    };

    tracing::info!("registered user {} with ID {}", user.username, user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not set auth cookie for new user {}: {error}", user.id);
            get_internal_server_error_hx_redirect()
        }
    }
}


#[cfg(test)]
mod get_register_page_tests {
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_form_error_messages, assert_form_input,
            assert_form_submit_button_with_text, assert_status_ok, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_register_page;

    #[tokio::test]
    async fn displays_empty_form() {
        let response = get_register_page().await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let title = document
            .select(&Selector::parse("h1").unwrap())
            .next()
            .expect("No h1 found")
            .text()
            .collect::<String>();
        assert_eq!(title.trim(), "Create an account");

        let form = must_get_form(&document);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::USERS));
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
        assert_form_submit_button_with_text(&form, "Create account");
        assert_form_error_messages(&form, &[]);

        let log_in_link = form
            .select(&Selector::parse("a[href]").unwrap())
            .next()
            .expect("No log-in link found");
        assert_eq!(log_in_link.value().attr("href"), Some(endpoints::LOG_IN_VIEW));
    }
}

#[cfg(test)]
mod register_user_tests {
    use axum::{
        Form, Router,
        body::Body,
        extract::{FromRef, State},
        http::{Response, StatusCode},
        routing::post,
    };
    use axum_extra::extract::PrivateCookieJar;
    use axum_htmx::HX_REDIRECT;
    use axum_test::TestServer;

    use crate::{
        endpoints,
        auth::{COOKIE_TOKEN, Username, get_user_by_username},
        test_utils::{
            assert_form_error_messages, create_test_user, get_test_app_state, must_get_form,
            parse_html_fragment,
        },
    };

    use super::{PASSWORD_MISMATCH_MSG, RegisterForm, RegistrationState, register_user};

    const STRONG_PASSWORD: &str = "iamtestingwhethericancreateanewuser";

    fn get_test_state() -> RegistrationState {
        RegistrationState::from_ref(&get_test_app_state())
    }

    fn register_form(username: &str, password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn register(state: &RegistrationState, form: RegisterForm) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        register_user(State(state.clone()), jar, Form(form)).await
    }

    async fn assert_form_errors(response: Response<Body>, want_errors: &[&str]) {
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_fragment(response).await;
        let form = must_get_form(&document);
        assert_form_error_messages(&form, want_errors);
    }

    #[tokio::test]
    async fn new_user_is_logged_in_and_sent_to_dashboard() {
        let state = get_test_state();
        let app = Router::new()
            .route(endpoints::USERS, post(register_user))
            .with_state(state.clone());
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::USERS)
            .form(&register_form("alice", STRONG_PASSWORD, STRONG_PASSWORD))
            .await;

        response.assert_status_see_other();
        response.assert_header(HX_REDIRECT, endpoints::DASHBOARD_VIEW);
        assert_eq!(response.cookie(COOKIE_TOKEN).path(), Some("/"));
        let user = get_user_by_username(
            &Username::new_unchecked("alice"),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not find new user");
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn taken_username_is_reported_on_username_field() {
        let state = get_test_state();
        create_test_user("alice", &state.db_connection.lock().unwrap());

        let response = register(
            &state,
            register_form("alice", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_form_errors(response, &["the username \"alice\" is already taken"]).await;
    }

    #[tokio::test]
    async fn invalid_username_is_reported() {
        let state = get_test_state();

        let response = register(
            &state,
            register_form("al ice", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_form_errors(response, &["username cannot contain spaces"]).await;
    }

    #[tokio::test]
    async fn mismatched_passwords_are_reported() {
        let state = get_test_state();

        let response = register(
            &state,
            register_form("alice", STRONG_PASSWORD, "thisisadifferentpassword"),
        )
        .await;

        assert_form_errors(response, &[PASSWORD_MISMATCH_MSG]).await;
    }

    #[tokio::test]
    async fn weak_password_is_rejected_and_no_user_created() {
        let state = get_test_state();

        let response = register(&state, register_form("alice", "foo", "foo")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_fragment(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("password is too weak"), "got {text}");
        let lookup = get_user_by_username(
            &Username::new_unchecked("alice"),
            &state.db_connection.lock().unwrap(),
        );
        assert!(lookup.is_err());
    }
}
