use crate::model::{Amount, Category};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Whether money left or arrived.
#[derive(
    Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// The verb used in confirmations: `Spent` or `Received`.
    pub fn verb(&self) -> &'static str {
        match self {
            TransactionType::Expense => "Spent",
            TransactionType::Income => "Received",
        }
    }

    /// The sign shown in front of an amount in the list view.
    pub fn sign(&self) -> &'static str {
        match self {
            TransactionType::Expense => "- ",
            TransactionType::Income => "+ ",
        }
    }
}

/// A transaction that has not been stored yet, so it has no id.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: Amount,
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    pub category: Category,
    #[serde(serialize_with = "serialize_date")]
    pub date: DateTime<Utc>,
    pub note: String,
}

impl NewTransaction {
    /// Attaches `id`, producing the stored form.
    pub(crate) fn with_id(self, id: String) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            r#type: self.r#type,
            category: self.category,
            date: self.date,
            note: self.note,
        }
    }
}

/// A stored transaction. Immutable once created.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: String,
    amount: Amount,
    #[serde(rename = "type")]
    r#type: TransactionType,
    #[serde(default)]
    category: Category,
    #[serde(serialize_with = "serialize_date", deserialize_with = "deserialize_date")]
    date: DateTime<Utc>,
    #[serde(default)]
    note: String,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn is_expense(&self) -> bool {
        self.r#type == TransactionType::Expense
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// Writes dates the way browsers do for `toISOString`: millisecond precision with a `Z`.
fn serialize_date<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Reads any RFC 3339 timestamp, whatever its offset, into UTC.
fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{s}': {e}")))
}
