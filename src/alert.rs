//! One-shot alert messages that survive a redirect.
//!
//! Handlers that redirect after a successful change store an [Alert] in a
//! private cookie with [set_flash_alert]. The next page to render takes it
//! out again with [take_flash_alert] and shows it once.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// The name of the cookie holding the pending alert.
pub(crate) const COOKIE_FLASH: &str = "flash";

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    Success,
    Warning,
}

/// A message for the user about the outcome of their last action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn success(message: &str) -> Self {
        Self {
            level: AlertLevel::Success,
            message: message.to_owned(),
        }
    }

    pub fn warning(message: &str) -> Self {
        Self {
            level: AlertLevel::Warning,
            message: message.to_owned(),
        }
    }

    pub fn into_html(self) -> Markup {
        let style = match self.level {
            AlertLevel::Success => {
                "p-4 mb-4 text-sm rounded text-green-800 bg-green-50 \
                dark:bg-gray-800 dark:text-green-400"
            }
            AlertLevel::Warning => {
                "p-4 mb-4 text-sm rounded text-yellow-800 bg-yellow-50 \
                dark:bg-gray-800 dark:text-yellow-300"
            }
        };

        html! {
            div class=(style) role="alert" data-alert-level=(self.level.as_str())
            {
                (self.message)
            }
        }
    }
}

impl AlertLevel {
    fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Success => "success",
            AlertLevel::Warning => "warning",
        }
    }
}

/// Store `alert` in `jar` so the next page can show it.
///
/// The alert is dropped with a logged error if it cannot be serialized.
pub(crate) fn set_flash_alert(jar: PrivateCookieJar, alert: Alert) -> PrivateCookieJar {
    match serde_json::to_string(&alert) {
        Ok(value) => jar.add(
            Cookie::build((COOKIE_FLASH, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Strict)
                .secure(true),
        ),
        Err(error) => {
            tracing::error!("Could not serialize flash alert: {error}");
            jar
        }
    }
}

/// Remove the pending alert from `jar` and return it.
pub(crate) fn take_flash_alert(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Alert>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let alert = serde_json::from_str(cookie.value_trimmed())
        .inspect_err(|error| tracing::warn!("Discarding unreadable flash alert: {error}"))
        .ok();
    let jar = jar.remove(Cookie::build(COOKIE_FLASH).path("/"));

    (jar, alert)
}
