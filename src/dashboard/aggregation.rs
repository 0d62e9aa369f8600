//! Expense aggregation for the dashboard.
//!
//! Provides the total spent, per-category totals and per-month totals of a
//! user's expenses, and turns them into parallel label/value series for charts.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use time::Month;

use crate::expense::Expense;

/// The sum of every expense amount, zero if there are none.
pub(super) fn total_spent(expenses: &[Expense]) -> Decimal {
    expenses
        .iter()
        .map(|expense| expense.amount.as_decimal())
        .sum()
}

/// Sums expenses by category.
///
/// # Returns
/// (category, total) pairs sorted by total, largest first. Categories with the
/// same total are sorted by name.
pub(super) fn category_totals(expenses: &[Expense]) -> Vec<(String, Decimal)> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();

    for expense in expenses {
        *totals
            .entry(expense.category.as_ref())
            .or_insert(Decimal::ZERO) += expense.amount.as_decimal();
    }

    let mut totals = totals
        .into_iter()
        .map(|(category, total)| (category.to_owned(), total))
        .collect::<Vec<_>>();
    totals.sort_by(|(left_name, left_total), (right_name, right_total)| {
        right_total
            .cmp(left_total)
            .then_with(|| left_name.cmp(right_name))
    });

    totals
}

/// Sums expenses by calendar month.
///
/// Only the month of each date is used, so January 2023 and January 2024 share
/// one total.
///
/// # Returns
/// Map from month number (1 to 12) to the total for that month, in month order.
pub(super) fn monthly_totals(expenses: &[Expense]) -> BTreeMap<u8, Decimal> {
    let mut totals = BTreeMap::new();

    for expense in expenses {
        let month = u8::from(expense.date.month());
        *totals.entry(month).or_insert(Decimal::ZERO) += expense.amount.as_decimal();
    }

    totals
}

/// Splits (label, total) pairs into parallel label and value series.
pub(super) fn split_category_series(totals: &[(String, Decimal)]) -> (Vec<String>, Vec<f64>) {
    totals
        .iter()
        .map(|(category, total)| (category.clone(), decimal_to_f64(*total)))
        .unzip()
}

/// Splits monthly totals into parallel month number and value series.
pub(super) fn split_monthly_series(totals: &BTreeMap<u8, Decimal>) -> (Vec<u8>, Vec<f64>) {
    totals
        .iter()
        .map(|(month, total)| (*month, decimal_to_f64(*total)))
        .unzip()
}

/// Formats month numbers as three-letter abbreviations, e.g. 1 becomes "Jan".
pub(super) fn format_month_labels(months: &[u8]) -> Vec<String> {
    let month_to_str = |month: &u8| match Month::try_from(*month) {
        Ok(Month::January) => "Jan",
        Ok(Month::February) => "Feb",
        Ok(Month::March) => "Mar",
        Ok(Month::April) => "Apr",
        Ok(Month::May) => "May",
        Ok(Month::June) => "Jun",
        Ok(Month::July) => "Jul",
        Ok(Month::August) => "Aug",
        Ok(Month::September) => "Sep",
        Ok(Month::October) => "Oct",
        Ok(Month::November) => "Nov",
        Ok(Month::December) => "Dec",
        Err(_) => "?",
    }
    .to_string();

    months.iter().map(month_to_str).collect()
}

fn decimal_to_f64(amount: Decimal) -> f64 {
    // Amounts are capped well within the range of f64.
    amount.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod aggregation_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, macros::date};

    use crate::{
        UserID,
        expense::{Amount, Category, Expense},
    };

    use super::{
        category_totals, format_month_labels, monthly_totals, split_category_series,
        split_monthly_series, total_spent,
    };

    fn expense(id: i64, category: &str, amount: &str, date: Date) -> Expense {
        Expense {
            id,
            owner: UserID::new(1),
            amount: Amount::new(amount).unwrap(),
            category: Category::new_unchecked(category),
            date,
            note: None,
        }
    }

    fn scenario() -> Vec<Expense> {
        vec![
            expense(1, "Food", "10.00", date!(2024 - 01 - 05)),
            expense(2, "Food", "5.00", date!(2024 - 02 - 10)),
            expense(3, "Rent", "800.00", date!(2024 - 01 - 01)),
        ]
    }

    #[test]
    fn scenario_totals() {
        let expenses = scenario();

        assert_eq!(total_spent(&expenses), dec!(815.00));
        assert_eq!(
            category_totals(&expenses),
            vec![
                ("Rent".to_owned(), dec!(800.00)),
                ("Food".to_owned(), dec!(15.00)),
            ]
        );
        let (months, totals) = split_monthly_series(&monthly_totals(&expenses));
        assert_eq!(months, vec![1, 2]);
        assert_eq!(totals, vec![810.0, 5.0]);
    }

    #[test]
    fn no_expenses_gives_zero_and_empty_series() {
        assert_eq!(total_spent(&[]), Decimal::ZERO);
        assert!(category_totals(&[]).is_empty());
        assert!(monthly_totals(&[]).is_empty());
    }

    #[test]
    fn category_ties_are_sorted_by_name() {
        let expenses = vec![
            expense(1, "Transport", "20", date!(2024 - 03 - 01)),
            expense(2, "Health", "20", date!(2024 - 03 - 02)),
            expense(3, "Food", "5", date!(2024 - 03 - 03)),
        ];

        let names = category_totals(&expenses)
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["Health", "Transport", "Food"]);
    }

    #[test]
    fn months_from_different_years_are_merged() {
        let expenses = vec![
            expense(1, "Food", "1.50", date!(2023 - 12 - 31)),
            expense(2, "Food", "2.25", date!(2024 - 12 - 01)),
            expense(3, "Food", "4", date!(2024 - 03 - 15)),
        ];

        let totals = monthly_totals(&expenses);

        assert_eq!(
            totals.into_iter().collect::<Vec<_>>(),
            vec![(3, dec!(4.00)), (12, dec!(3.75))]
        );
    }

    #[test]
    fn category_and_month_sums_equal_total() {
        let expenses = vec![
            expense(1, "Food", "0.10", date!(2024 - 01 - 05)),
            expense(2, "Food", "0.20", date!(2024 - 02 - 10)),
            expense(3, "Rent", "800.00", date!(2023 - 01 - 01)),
            expense(4, "Health", "12.34", date!(2024 - 07 - 19)),
            expense(5, "Other", "0.01", date!(2024 - 07 - 20)),
        ];
        let total = total_spent(&expenses);

        let category_sum: Decimal = category_totals(&expenses)
            .into_iter()
            .map(|(_, total)| total)
            .sum();
        let month_sum: Decimal = monthly_totals(&expenses).into_values().sum();

        assert_eq!(category_sum, total);
        assert_eq!(month_sum, total);
    }

    #[test]
    fn category_series_are_parallel() {
        let (labels, values) = split_category_series(&category_totals(&scenario()));

        assert_eq!(labels, vec!["Rent", "Food"]);
        assert_eq!(values, vec![800.0, 15.0]);
    }

    #[test]
    fn month_labels() {
        assert_eq!(format_month_labels(&[1, 2, 12]), vec!["Jan", "Feb", "Dec"]);
    }
}
