//! Database operations for expenses.
//!
//! Every query is scoped to one owner, so an expense that belongs to someone
//! else looks exactly like an expense that does not exist.

use std::str::FromStr;

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;

use crate::{
    Error,
    auth::UserID,
    expense::{Amount, Category, Expense, ExpenseFields, ExpenseId},
};

/// Initialize the expense table and indexes.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            amount TEXT NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            note TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_expense_owner_date ON expense(owner_id, date);",
    )?;

    Ok(())
}

/// Create an expense for `owner` and return it with its generated ID.
pub fn create_expense(
    owner: UserID,
    fields: &ExpenseFields,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "INSERT INTO expense (owner_id, amount, category, date, note) VALUES (?1, ?2, ?3, ?4, ?5);",
        (
            owner.as_i64(),
            fields.amount.to_string(),
            fields.category.as_ref(),
            fields.date,
            fields.note.as_deref(),
        ),
    )?;

    let id = transaction.last_insert_rowid();
    let expense = get_expense(owner, id, &transaction)?;

    transaction.commit()?;

    Ok(expense)
}

/// Retrieve one of `owner`'s expenses.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `owner` has no expense with `expense_id`.
pub fn get_expense(
    owner: UserID,
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, amount, category, date, note FROM expense
            WHERE id = :id AND owner_id = :owner_id;",
        )?
        .query_row(
            &[(":id", &expense_id), (":owner_id", &owner.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of `owner`'s expenses, newest first.
///
/// Expenses on the same date are ordered by ID, most recently created first.
pub fn list_expenses(owner: UserID, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, amount, category, date, note FROM expense
            WHERE owner_id = :owner_id
            ORDER BY date DESC, id DESC;",
        )?
        .query_map(&[(":owner_id", &owner.as_i64())], map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Replace the editable fields of one of `owner`'s expenses.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `owner` has no expense with `expense_id`.
pub fn update_expense(
    owner: UserID,
    expense_id: ExpenseId,
    fields: &ExpenseFields,
    connection: &Connection,
) -> Result<Expense, Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET amount = ?1, category = ?2, date = ?3, note = ?4
        WHERE id = ?5 AND owner_id = ?6",
        (
            fields.amount.to_string(),
            fields.category.as_ref(),
            fields.date,
            fields.note.as_deref(),
            expense_id,
            owner.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_expense(owner, expense_id, connection)
}

/// Permanently delete one of `owner`'s expenses.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `owner` has no expense with `expense_id`.
pub fn delete_expense(
    owner: UserID,
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND owner_id = ?2",
        (expense_id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let owner = UserID::new(row.get(1)?);
    let raw_amount: String = row.get(2)?;
    let amount = Decimal::from_str(&raw_amount)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error)))?;
    let raw_category: String = row.get(3)?;

    Ok(Expense {
        id,
        owner,
        amount: Amount::new_unchecked(amount),
        category: Category::new_unchecked(&raw_category),
        date: row.get(4)?,
        note: row.get(5)?,
    })
}
