//! Dashboard module
//!
//! Provides an overview page showing the user's total spending and charts of
//! their spending by category and by month.

mod aggregation;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
