//! Turns a free-text transcript such as "spent 250 on pizza yesterday" into a `NewTransaction`.

use crate::model::{Amount, KeywordTable, NewTransaction, TransactionType};
use crate::ParseError;
use chrono::{DateTime, Days, Duration, TimeZone, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

/// Any of these anywhere in the text, even inside another word, makes the transaction income.
const INCOME_MARKERS: [&str; 3] = ["got", "received", "credited"];

/// The only relative date that is understood.
const YESTERDAY: &str = "yesterday";

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+(?:[.,][0-9]+)?)").expect("amount regex"))
}

/// Parses `transcript` into a transaction dated relative to `now`.
///
/// The transcript is expected to be lower-cased already. It is kept verbatim as the note.
///
/// # Errors
/// - `ParseError::AmountMissing` when no number is found, or the first number found is zero or
///   contains a comma.
/// - `ParseError::AmountTooLarge` when the number is above `Amount::limit()`.
pub fn parse<Tz>(
    transcript: &str,
    now: &DateTime<Tz>,
    table: &KeywordTable,
) -> Result<NewTransaction, ParseError>
where
    Tz: TimeZone,
{
    let amount = extract_amount(transcript)
        .filter(|a| !a.is_zero())
        .map(Amount::new)
        .ok_or(ParseError::AmountMissing)?;
    if !amount.is_within_limit() {
        return Err(ParseError::AmountTooLarge);
    }

    Ok(NewTransaction {
        amount,
        r#type: polarity(transcript),
        category: table.classify(transcript),
        date: resolve_date(transcript, now),
        note: transcript.to_string(),
    })
}

/// Returns the first number in `text`, reading left to right.
///
/// Only `.` is a decimal point. A match holding a comma, as in `1,500` or `12,5`, is not a number
/// and gives `None`; the text is not searched any further.
pub fn extract_amount(text: &str) -> Option<Decimal> {
    let m = amount_re().find(text)?.as_str();
    if m.contains(',') {
        return None;
    }
    Decimal::from_str(m).ok()
}

/// `Income` if any income marker is contained in `text`, otherwise `Expense`.
pub fn polarity(text: &str) -> TransactionType {
    if INCOME_MARKERS.iter().any(|marker| text.contains(marker)) {
        TransactionType::Income
    } else {
        TransactionType::Expense
    }
}

/// `now`, or one calendar day before it when the text says "yesterday".
fn resolve_date<Tz>(text: &str, now: &DateTime<Tz>) -> DateTime<Utc>
where
    Tz: TimeZone,
{
    if !text.contains(YESTERDAY) {
        return now.with_timezone(&Utc);
    }
    now.clone()
        .checked_sub_days(Days::new(1))
        // A skipped or repeated local hour has no single answer; fall back to 24 hours
        .unwrap_or_else(|| now.clone() - Duration::days(1))
        .with_timezone(&Utc)
}
