use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, PasswordHash, UserID, Username,
    auth::create_user,
    expense::{Amount, Category, Expense, ExpenseFields, create_expense},
};

/// An app state backed by a fresh in-memory database.
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "foobar", "Etc/UTC").expect("Could not create app state")
}

#[track_caller]
pub(crate) fn create_test_user(username: &str, connection: &Connection) -> UserID {
    create_user(
        Username::new_unchecked(username),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
    .id
}

#[track_caller]
pub(crate) fn insert_test_expense(
    owner: UserID,
    amount: &str,
    category: &str,
    date: Date,
    connection: &Connection,
) -> Expense {
    let fields = ExpenseFields {
        amount: Amount::new(amount).expect("Invalid test amount"),
        category: Category::new(category).expect("Invalid test category"),
        date,
        note: None,
    };

    create_expense(owner, &fields, connection).expect("Could not create test expense")
}
