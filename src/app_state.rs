//! The state shared by every request handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize};

/// Everything the handlers need, cloned into each request.
///
/// Handlers take narrower state structs built from this one with [FromRef].
#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts the auth and flash cookies.
    pub cookie_key: Key,

    /// How long a session lasts after the most recent request.
    pub cookie_duration: Duration,

    /// Canonical timezone name, e.g. "Pacific/Auckland", used for the default expense date.
    pub local_timezone: String,

    /// The one SQLite connection, shared by all requests.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create the tables in `db_connection` if needed and wrap it for sharing.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables could not be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie key from `secret`, so the same secret survives restarts.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
