//! Summary arithmetic over a slice of transactions.
//!
//! Everything here is a pure function of the transactions and, where months matter, of `now`.
//! Months are calendar months in `now`'s time zone. Nothing is cached; callers recompute after
//! every change.

use crate::model::{Amount, Category, Transaction};
use chrono::{DateTime, Datelike, TimeZone};
use serde::Serialize;

/// How many months the bar chart covers.
pub const SERIES_MONTHS: usize = 6;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Spending in one category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Amount,
}

/// Spending in one calendar month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthPoint {
    pub year: i32,
    /// 1 through 12.
    pub month: u32,
    /// e.g. `Oct 26`
    pub label: String,
    pub value: Amount,
}

/// The headline numbers shown above the list.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub total_spent: Amount,
    pub month_spent: Amount,
    pub top_category: Option<CategoryTotal>,
    pub count: usize,
}

impl Summary {
    pub fn compute<Tz: TimeZone>(transactions: &[Transaction], now: &DateTime<Tz>) -> Self {
        Self {
            total_spent: total_spent(transactions),
            month_spent: month_spent(transactions, now),
            top_category: top_category(transactions),
            count: transactions.len(),
        }
    }
}

/// The data behind the two charts: spending by category and spending by month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ChartData {
    pub categories: Vec<CategoryTotal>,
    pub months: Vec<MonthPoint>,
}

impl ChartData {
    pub fn compute<Tz: TimeZone>(
        transactions: &[Transaction],
        now: &DateTime<Tz>,
        months: usize,
    ) -> Self {
        Self {
            categories: category_breakdown(transactions),
            months: monthly_series(transactions, now, months),
        }
    }
}

fn expenses(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|t| t.is_expense())
}

/// The `(year, month)` of `t` as seen from `now`'s time zone.
fn year_month<Tz: TimeZone>(t: &Transaction, now: &DateTime<Tz>) -> (i32, u32) {
    let local = t.date().with_timezone(&now.timezone());
    (local.year(), local.month())
}

/// Sum of every expense, whenever it happened.
pub fn total_spent(transactions: &[Transaction]) -> Amount {
    expenses(transactions).map(|t| t.amount()).sum()
}

/// Sum of the expenses dated in the same calendar month as `now`.
pub fn month_spent<Tz: TimeZone>(transactions: &[Transaction], now: &DateTime<Tz>) -> Amount {
    let current = (now.year(), now.month());
    expenses(transactions)
        .filter(|t| year_month(t, now) == current)
        .map(|t| t.amount())
        .sum()
}

/// Expense totals per category, ordered by where each category first appears in
/// `transactions`. Categories without expenses are left out.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for t in expenses(transactions) {
        match totals.iter_mut().find(|c| c.category == t.category()) {
            Some(existing) => existing.total = existing.total + t.amount(),
            None => totals.push(CategoryTotal {
                category: t.category(),
                total: t.amount(),
            }),
        }
    }
    totals
}

/// The category with the largest expense total. On a tie, the category that appears first in
/// `transactions` wins. `None` when there are no expenses.
pub fn top_category(transactions: &[Transaction]) -> Option<CategoryTotal> {
    category_breakdown(transactions)
        .into_iter()
        .fold(None, |best: Option<CategoryTotal>, candidate| match best {
            Some(b) if b.total >= candidate.total => Some(b),
            _ => Some(candidate),
        })
}

/// One point per calendar month for the `months` months ending with `now`'s month, oldest
/// first. Months without expenses are present with a zero value.
pub fn monthly_series<Tz: TimeZone>(
    transactions: &[Transaction],
    now: &DateTime<Tz>,
    months: usize,
) -> Vec<MonthPoint> {
    let current = i64::from(now.year()) * 12 + i64::from(now.month0());
    (0..months as i64)
        .rev()
        .map(|back| {
            let index = current - back;
            let year = index.div_euclid(12) as i32;
            let month = index.rem_euclid(12) as u32 + 1;
            let value: Amount = expenses(transactions)
                .filter(|t| year_month(t, now) == (year, month))
                .map(|t| t.amount())
                .sum();
            MonthPoint {
                year,
                month,
                label: month_label(year, month),
                value,
            }
        })
        .collect()
}

/// `monthly_series` over the default six months.
pub fn six_month_series<Tz: TimeZone>(
    transactions: &[Transaction],
    now: &DateTime<Tz>,
) -> Vec<MonthPoint> {
    monthly_series(transactions, now, SERIES_MONTHS)
}

fn month_label(year: i32, month: u32) -> String {
    let abbr = MONTH_ABBR
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("???");
    format!("{abbr} {:02}", year.rem_euclid(100))
}
