//! Read-only views over the store and the configuration.

use crate::aggregate::{ChartData, Summary};
use crate::args::SummaryArgs;
use crate::commands::Out;
use crate::model::{KeywordTable, Transaction};
use crate::{render, Config, Result};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::fmt::Display;

/// The numbers behind the `summary` view.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOut {
    pub summary: Summary,
    pub charts: ChartData,
}

/// Lists the transactions, newest first, with dates in the local time zone.
pub async fn list(config: Config) -> Result<Out<Vec<Transaction>>> {
    list_in(config, &Local).await
}

/// `list` with dates shown in `tz`.
pub async fn list_in<Tz>(config: Config, tz: &Tz) -> Result<Out<Vec<Transaction>>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let store = config.open_store().await?;
    let transactions = store.transactions().to_vec();
    let message = render::list(&transactions, tz, config.currency_symbol());
    Ok(Out::new(message, transactions))
}

/// Shows the headline numbers followed by the category and monthly charts.
pub async fn summary(config: Config, args: &SummaryArgs) -> Result<Out<SummaryOut>> {
    summary_at(config, args, &Local::now()).await
}

/// `summary` as of `now`.
pub async fn summary_at<Tz>(
    config: Config,
    args: &SummaryArgs,
    now: &DateTime<Tz>,
) -> Result<Out<SummaryOut>>
where
    Tz: TimeZone,
{
    let store = config.open_store().await?;
    let transactions = store.transactions();
    let out = SummaryOut {
        summary: Summary::compute(transactions, now),
        charts: ChartData::compute(transactions, now, args.months()),
    };
    let symbol = config.currency_symbol();
    let message = format!(
        "{}\n\n{}",
        render::summary(&out.summary, symbol),
        render::charts(&out.charts, symbol)
    );
    Ok(Out::new(message, out))
}

/// Shows the keyword table in use, config overrides included.
pub async fn categories(config: Config) -> Result<Out<KeywordTable>> {
    let table = config.keywords().clone();
    Ok(Out::new(render::keywords(&table), table))
}
