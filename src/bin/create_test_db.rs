use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use outlay::{
    Amount, Category, ExpenseFields, PasswordHash, Username, ValidatedPassword, create_expense,
    create_user, initialize_db,
};

/// A utility for creating a test database for the outlay web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (amount, category, days ago, note)
const SAMPLE_EXPENSES: [(&str, &str, i64, &str); 8] = [
    ("12.50", "Food", 1, "Lunch"),
    ("64.20", "Food", 9, "Groceries"),
    ("1800.00", "Housing", 14, "Rent"),
    ("45.00", "Transport", 20, ""),
    ("89.99", "Utilities", 35, "Power bill"),
    ("30.00", "Entertainment", 40, "Movies"),
    ("1800.00", "Housing", 44, "Rent"),
    ("22.75", "Health", 70, "Pharmacy"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user 'test' with password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Username::new("test")?, password_hash, &conn)?;

    println!("Creating sample expenses...");

    let today = OffsetDateTime::now_utc().date();

    for (amount, category, days_ago, note) in SAMPLE_EXPENSES {
        let fields = ExpenseFields {
            amount: Amount::new(amount)?,
            category: Category::new(category)?,
            date: today - Duration::days(days_ago),
            note: (!note.is_empty()).then(|| note.to_owned()),
        };

        create_expense(user.id, &fields, &conn)?;
    }

    println!("Success!");

    Ok(())
}
