//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod transaction;

pub use amount::{Amount, AmountError, DEFAULT_CURRENCY_SYMBOL};
pub use category::{Category, KeywordTable};
pub use transaction::{NewTransaction, Transaction, TransactionType};
