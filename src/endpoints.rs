//! Every route the app serves.
//!
//! Routes with an `{expense_id}` parameter are turned into links with [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing the user's expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page and form target for adding an expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page and form target for editing an expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The confirmation page and form target for deleting an expense.
pub const DELETE_EXPENSE_VIEW: &str = "/expenses/{expense_id}/delete";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create users.
pub const USERS: &str = "/api/users";

/// Fill the single `{...}` parameter in `endpoint_path` with `id`.
///
/// Paths without a parameter are returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    match endpoint_path.split_once('{') {
        Some((prefix, rest)) => {
            let suffix = rest.split_once('}').map_or("", |(_, suffix)| suffix);

            format!("{prefix}{id}{suffix}")
        }
        None => endpoint_path.to_owned(),
    }
}
