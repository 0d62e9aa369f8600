//! Expense tracking: the per-user expense store and the pages for managing it.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;

pub use create::{create_expense_endpoint, get_new_expense_page};
pub use db::{create_expense, create_expense_table, list_expenses};
pub use delete::{delete_expense_endpoint, get_delete_expense_page};
pub use domain::{Amount, Category, Expense, ExpenseFields, ExpenseId};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use list::get_expenses_page;
