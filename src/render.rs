//! Plain-text views of the transaction list, the summary and the two charts.

use crate::aggregate::{ChartData, Summary};
use crate::model::{Amount, KeywordTable, Transaction};
use chrono::TimeZone;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt::Write;

/// Shown in place of a top category when nothing has been spent.
pub const NO_TOP_CATEGORY: &str = "—";

/// Shown in place of the list when the store is empty.
pub const EMPTY_LIST: &str = "No transactions yet";

const BAR_WIDTH: u32 = 30;
const BAR: char = '█';

/// Upper-cases the first character: `food` becomes `Food`.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// e.g. `₹1,23,456.5`
pub fn format_currency(amount: Amount, symbol: &str) -> String {
    amount.format_with(symbol)
}

/// One line per transaction, newest insertion first, with dates shown in `tz`.
pub fn list<Tz>(transactions: &[Transaction], tz: &Tz, symbol: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if transactions.is_empty() {
        return EMPTY_LIST.to_string();
    }
    let mut out = String::new();
    for t in transactions {
        let when = t.date().with_timezone(tz).format("%d/%m/%Y, %H:%M:%S");
        let _ = write!(
            out,
            "{:<13} {}  {:<8} {}{:>12}  {}",
            t.category().label(),
            when,
            capitalize(&t.r#type().to_string()),
            t.r#type().sign(),
            format_currency(t.amount(), symbol),
            t.id(),
        );
        if !t.note().is_empty() {
            let _ = write!(out, "\n    {}", t.note());
        }
        out.push('\n');
    }
    out.truncate(out.trim_end().len());
    out
}

/// The headline numbers.
pub fn summary(summary: &Summary, symbol: &str) -> String {
    let top = match &summary.top_category {
        Some(top) => format!(
            "{} ({})",
            top.category.label(),
            format_currency(top.total, symbol)
        ),
        None => NO_TOP_CATEGORY.to_string(),
    };
    format!(
        "Total spent:  {}\nThis month:   {}\nTop category: {}\nTransactions: {}",
        format_currency(summary.total_spent, symbol),
        format_currency(summary.month_spent, symbol),
        top,
        summary.count
    )
}

/// The category breakdown followed by the monthly bars.
pub fn charts(data: &ChartData, symbol: &str) -> String {
    let mut out = String::from("Spending by category\n");
    if data.categories.is_empty() {
        out.push_str("  (no expenses)\n");
    }
    let category_max = data.categories.iter().map(|c| c.total).max();
    for c in &data.categories {
        let _ = writeln!(
            out,
            "  {:<13} {:<w$} {}",
            c.category.label(),
            bar(c.total, category_max),
            format_currency(c.total, symbol),
            w = BAR_WIDTH as usize,
        );
    }

    out.push_str("Spending by month\n");
    let month_max = data.months.iter().map(|m| m.value).max();
    for m in &data.months {
        let _ = writeln!(
            out,
            "  {:<6} {:<w$} {}",
            m.label,
            bar(m.value, month_max),
            format_currency(m.value, symbol),
            w = BAR_WIDTH as usize,
        );
    }
    out.truncate(out.trim_end().len());
    out
}

/// The active keyword table, one category per line.
pub fn keywords(table: &KeywordTable) -> String {
    table
        .entries()
        .iter()
        .map(|(category, words)| {
            let words = if words.is_empty() {
                "(catch-all)".to_string()
            } else {
                words.join(", ")
            };
            format!("{:<13} {}", category.label(), words)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A bar whose length is `value` scaled against `max`.
fn bar(value: Amount, max: Option<Amount>) -> String {
    let max = match max {
        Some(m) if m.is_positive() => m.value(),
        _ => return String::new(),
    };
    // value <= max, so dividing first keeps every step in range
    let len = value
        .value()
        .checked_div(max)
        .and_then(|share| share.checked_mul(Decimal::from(BAR_WIDTH)))
        .and_then(|scaled| scaled.round().to_usize())
        .unwrap_or(0);
    std::iter::repeat(BAR).take(len).collect()
}
