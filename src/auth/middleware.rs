//! The guard in front of every page that needs a logged-in user.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How far past the current request a valid session is extended.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Send the client to the log-in page, asking it to come back to the page in `request`.
fn redirect_to_log_in(request: &Request) -> Response {
    let log_in_url = build_log_in_redirect_url(request)
        .or_else(|| build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW))
        .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned());

    Redirect::to(&log_in_url).into_response()
}

/// Copy the `Set-Cookie` headers that `jar` would send onto `headers`.
fn append_cookie_headers(jar: PrivateCookieJar, headers: &mut HeaderMap) {
    let jar_response = jar.into_response();

    for value in jar_response.headers().get_all(SET_COOKIE) {
        headers.append(SET_COOKIE, value.clone());
    }
}

/// Let the request through only if it carries a valid auth cookie.
///
/// The owner's [UserID](crate::UserID) is put in the request extensions, so handlers
/// behind this guard take `Extension(user_id): Extension<UserID>` and never read it
/// from the request body. Requests without a valid cookie are redirected to the log-in
/// page with the requested page in its `redirect_url` query parameter.
///
/// Each authenticated response also pushes the cookie expiry out by the session duration.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::<Key>::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not read cookie jar: {error:?}");
            return redirect_to_log_in(&Request::from_parts(parts, body));
        }
    };

    let token = match get_token_from_cookies(&jar) {
        Ok(token) => token,
        Err(error) => {
            tracing::debug!("rejecting {} {}: {error}", parts.method, parts.uri);
            return redirect_to_log_in(&Request::from_parts(parts, body));
        }
    };

    parts.extensions.insert(token.user_id);
    let mut response = next.run(Request::from_parts(parts, body)).await;

    let jar = extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration)
        .unwrap_or_else(|error| {
            tracing::error!("could not extend auth cookie for user {}: {error}", token.user_id);
            jar
        });
    append_cookie_headers(jar, response.headers_mut());

    response
}
