//! Dashboard HTTP handler and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - The state type used by the handler

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::{UserID, Username, get_user_by_id},
    dashboard::{
        aggregation::{
            category_totals, format_month_labels, monthly_totals, split_category_series,
            split_monthly_series, total_spent,
        },
        charts::{DashboardChart, category_chart, charts_script, charts_view, monthly_chart},
    },
    endpoints,
    expense::list_expenses,
    html::{HeadElement, base, format_currency, link},
    navigation::NavBar,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The aggregated spending of one user, ready for rendering.
struct DashboardData {
    total: Decimal,
    category_labels: Vec<String>,
    category_totals: Vec<f64>,
    months: Vec<u8>,
    monthly_totals: Vec<f64>,
}

/// Display a page with an overview of the user's spending.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;

    let expenses = list_expenses(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not list expenses for user {user_id}: {error}"))?;

    let (category_labels, category_values) = split_category_series(&category_totals(&expenses));
    let (months, monthly_values) = split_monthly_series(&monthly_totals(&expenses));

    let data = DashboardData {
        total: total_spent(&expenses),
        category_labels,
        category_totals: category_values,
        months,
        monthly_totals: monthly_values,
    };

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if expenses.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar, &user.username, &data)?.into_response());
    }

    Ok(dashboard_view(nav_bar, &user.username, &data)?.into_response())
}

/// Creates the dashboard charts from the aggregated series.
///
/// The chart options are serialized to JSON for ECharts consumption.
fn build_dashboard_charts(data: &DashboardData) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "category-chart",
            options: escape_for_script(
                &category_chart(data.category_labels.clone(), data.category_totals.clone())
                    .to_string(),
            ),
        },
        DashboardChart {
            id: "monthly-chart",
            options: escape_for_script(
                &monthly_chart(
                    format_month_labels(&data.months),
                    data.monthly_totals.clone(),
                )
                .to_string(),
            ),
        },
    ]
}

/// Renders `value` as a JSON data block that scripts can read by `id`.
fn json_data_block(id: &str, value: &impl Serialize) -> Result<Markup, Error> {
    let json = serde_json::to_string(value).map_err(|error| {
        tracing::error!("could not serialize dashboard series {id}: {error}");
        Error::JSONSerializationError(error.to_string())
    })?;

    Ok(html! {
        script type="application/json" id=(id) { (PreEscaped(escape_for_script(&json))) }
    })
}

/// The four series blocks, rendered even when they are empty.
fn series_blocks(data: &DashboardData) -> Result<[Markup; 4], Error> {
    Ok([
        json_data_block("category_labels", &data.category_labels)?,
        json_data_block("category_totals", &data.category_totals)?,
        json_data_block("months", &data.months)?,
        json_data_block("monthly_totals", &data.monthly_totals)?,
    ])
}

/// Stops user supplied text, e.g. a category named "</script>", from closing the script tag.
fn escape_for_script(json: &str) -> String {
    json.replace('<', "\\u003c")
}

fn total_spent_view(total: Decimal) -> Markup {
    html! {
        div class="mb-6 text-center"
        {
            p class="text-sm uppercase text-gray-500 dark:text-gray-400" { "Total spent" }
            p id="total-spent" class="text-3xl font-bold" { (format_currency(total)) }
        }
    }
}

/// Renders the dashboard page when the user has no expenses.
fn dashboard_no_data_view(
    nav_bar: NavBar<'_>,
    username: &Username,
    data: &DashboardData,
) -> Result<Markup, Error> {
    let nav_bar = nav_bar.into_html();
    let new_expense_link = link(endpoints::NEW_EXPENSE_VIEW, "adding an expense");
    let series = series_blocks(data)?;

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold mb-4" { "Hi, " (username) }

            (total_spent_view(data.total))

            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you add some expenses.
                Get started by " (new_expense_link) "."
            }

            @for block in &series {
                (block)
            }
        }
    );

    Ok(base("Dashboard", &[], &content))
}

/// Renders the main dashboard page with the total, the chart data and the charts.
fn dashboard_view(
    nav_bar: NavBar<'_>,
    username: &Username,
    data: &DashboardData,
) -> Result<Markup, Error> {
    let nav_bar = nav_bar.into_html();
    let charts = build_dashboard_charts(data);

    let series = series_blocks(data)?;

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold mb-4" { "Hi, " (username) }

            (total_spent_view(data.total))

            (charts_view(&charts))

            @for block in &series {
                (block)
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    Ok(base("Dashboard", &scripts, &content))
}
