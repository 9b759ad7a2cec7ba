//! These structs provide the CLI interface for the expenses CLI.

use crate::aggregate::SERIES_MONTHS;
use crate::model::{Amount, Category, TransactionType};
use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A personal expense tracker you can talk to.
///
/// Record what you spend or receive either field by field with `add`, or as a phrase with `say`
/// or `listen`, e.g. "spent 250 on pizza yesterday". The amount, whether it is income or an
/// expense, the category and the date are worked out from the words.
///
/// `summary` shows how much you have spent in total and this month, your top category and a
/// six month chart.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// Run this once before anything else. The data lives in --expenses-home, which defaults to
    /// $HOME/voice-expenses.
    Init,
    /// Record a transaction field by field.
    Add(AddArgs),
    /// Record a transaction from a phrase, e.g. `expenses say spent 250 on pizza yesterday`.
    Say(SayArgs),
    /// Listen for one phrase and record it. In a terminal, type the phrase and press enter.
    Listen,
    /// Delete transactions by ID. IDs that do not exist are ignored.
    Delete(DeleteArgs),
    /// Delete every transaction.
    Clear(ClearArgs),
    /// List transactions, newest first.
    List,
    /// Show totals, the top category and the charts.
    Summary(SummaryArgs),
    /// Show the keywords used to pick a category.
    Categories,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where data and configuration are held. Defaults to ~/voice-expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expenses_home: PathBuf) -> Self {
        Self {
            log_level,
            expenses_home: expenses_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// Args for the `expenses add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// How much, e.g. 250 or 1,500.50
    #[arg(value_parser = parse_positive_amount)]
    amount: Amount,

    /// "expense" or "income"
    #[arg(long = "type", default_value_t = TransactionType::Expense)]
    r#type: TransactionType,

    /// One of food, travel, shopping, bills, groceries, health, entertainment, other. Empty
    /// means other.
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,

    /// When it happened: 2026-10-01, 2026-10-01T09:30 (local time) or an RFC 3339 timestamp.
    /// Defaults to now.
    #[arg(long)]
    date: Option<String>,

    /// Free text to remember it by.
    #[arg(long)]
    note: Option<String>,
}

impl AddArgs {
    pub fn new(
        amount: Amount,
        r#type: TransactionType,
        category: Option<Category>,
        date: Option<String>,
        note: Option<String>,
    ) -> Self {
        Self {
            amount,
            r#type,
            category,
            date,
            note,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn category(&self) -> Category {
        self.category.unwrap_or_default()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn note(&self) -> &str {
        self.note.as_deref().unwrap_or_default()
    }
}

/// Args for the `expenses say` command.
#[derive(Debug, Parser, Clone)]
pub struct SayArgs {
    /// The phrase, as it would have been heard.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    words: Vec<String>,
}

impl SayArgs {
    pub fn new<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// The words joined with single spaces.
    pub fn transcript(&self) -> String {
        self.words.join(" ")
    }
}

/// Args for the `expenses delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The IDs shown by `expenses list`.
    #[arg(required = true)]
    ids: Vec<String>,
}

impl DeleteArgs {
    pub fn new<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// Args for the `expenses clear` command.
#[derive(Debug, Parser, Clone)]
pub struct ClearArgs {
    /// Do not ask for confirmation.
    #[arg(long, short = 'y')]
    yes: bool,
}

impl ClearArgs {
    pub fn new(yes: bool) -> Self {
        Self { yes }
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Args for the `expenses summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// How many months the monthly chart covers, ending with the current month.
    #[arg(long, default_value_t = SERIES_MONTHS, value_parser = clap::value_parser!(u16).range(1..=120).map(usize::from))]
    months: usize,
}

impl SummaryArgs {
    pub fn new(months: usize) -> Self {
        Self { months }
    }

    pub fn months(&self) -> usize {
        self.months
    }
}

impl Default for SummaryArgs {
    fn default() -> Self {
        Self::new(SERIES_MONTHS)
    }
}

fn parse_positive_amount(s: &str) -> Result<Amount, String> {
    let amount = Amount::from_str(s).map_err(|e| format!("'{s}' is not an amount: {e}"))?;
    if !amount.is_positive() {
        return Err(format!("the amount must be more than zero, got '{s}'"));
    }
    if !amount.is_within_limit() {
        return Err(format!(
            "the amount must be at most {}, got '{s}'",
            Amount::limit()
        ));
    }
    Ok(amount)
}

fn parse_category(s: &str) -> Result<Category, String> {
    let trimmed = s.trim().to_lowercase();
    if trimmed.is_empty() {
        return Ok(Category::Other);
    }
    Category::from_str(&trimmed).map_err(|_| {
        let names: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
        format!("unknown category '{s}', expected one of: {}", names.join(", "))
    })
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("voice-expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("voice-expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
