//! Core expense domain types.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// Categories suggested in the expense form. Users may type any other label.
pub const SUGGESTED_CATEGORIES: [&str; 7] = [
    "Food",
    "Rent",
    "Transport",
    "Utilities",
    "Entertainment",
    "Health",
    "Other",
];

/// A non-negative amount of money with at most two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Amounts must be strictly less than this, i.e. at most 8 digits before the decimal point.
    pub const UPPER_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

    /// Parse and validate an amount typed by a user, e.g. "12.5".
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::InvalidAmount] if `raw_amount` is not a decimal number,
    /// - [Error::NegativeAmount] if the amount is below zero,
    /// - [Error::TooManyDecimalPlaces] if the amount has fractions of a cent,
    /// - [Error::AmountTooLarge] if the amount is not below [Amount::UPPER_LIMIT].
    pub fn new(raw_amount: &str) -> Result<Self, Error> {
        let trimmed = raw_amount.trim();
        let amount =
            Decimal::from_str(trimmed).map_err(|_| Error::InvalidAmount(trimmed.to_owned()))?;

        Self::from_decimal(amount)
    }

    /// Validate an amount that is already a [Decimal].
    ///
    /// # Errors
    ///
    /// See [Amount::new].
    pub fn from_decimal(amount: Decimal) -> Result<Self, Error> {
        if amount < Decimal::ZERO {
            return Err(Error::NegativeAmount);
        }

        let mut amount = amount.normalize();

        if amount.scale() > 2 {
            return Err(Error::TooManyDecimalPlaces);
        }

        if amount >= Self::UPPER_LIMIT {
            return Err(Error::AmountTooLarge(Self::UPPER_LIMIT.to_string()));
        }

        amount.rescale(2);

        Ok(Self(amount))
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure the amount is non-negative with at most two
    /// decimal places, e.g. it was read back from the database.
    pub fn new_unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-empty expense category label, e.g. "Food".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct Category(String);

impl Category {
    /// The maximum number of characters in a category.
    pub const MAX_LENGTH: usize = 50;

    /// Create a category, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyCategory] if `name` is blank and an
    /// [Error::CategoryTooLong] if it has more than [Category::MAX_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else if name.chars().count() > Self::MAX_LENGTH {
            Err(Error::CategoryTooLong(Self::MAX_LENGTH))
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The maximum number of characters in an expense note.
pub const NOTE_MAX_LENGTH: usize = 500;

/// Trim `raw_note`, treating a blank note as no note.
///
/// # Errors
///
/// Returns an [Error::NoteTooLong] if the trimmed note has more than [NOTE_MAX_LENGTH] characters.
pub fn parse_note(raw_note: &str) -> Result<Option<String>, Error> {
    let note = raw_note.trim();

    if note.is_empty() {
        Ok(None)
    } else if note.chars().count() > NOTE_MAX_LENGTH {
        Err(Error::NoteTooLong(NOTE_MAX_LENGTH))
    } else {
        Ok(Some(note.to_owned()))
    }
}

/// The user-editable fields of an expense, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseFields {
    pub amount: Amount,
    pub category: Category,
    pub date: Date,
    pub note: Option<String>,
}

/// Money a user spent, stored on their behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub owner: UserID,
    pub amount: Amount,
    pub category: Category,
    pub date: Date,
    pub note: Option<String>,
}
