//! The three ways a transaction gets recorded: the manual form (`add`), a transcript (`say`) and
//! a listening session (`listen`).

use crate::args::{AddArgs, SayArgs};
use crate::commands::Out;
use crate::model::{NewTransaction, Transaction};
use crate::speech::{LineEngine, Microphone, SpeechEngine, UnsupportedEngine, STATUS_LISTENING};
use crate::store::TransactionStore;
use crate::{parser, Config, Mode, Result};
use anyhow::{bail, Context};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use tokio::io::BufReader;
use tracing::{debug, info, trace};

/// Records a transaction from the manual entry fields, dated now unless `--date` is given.
pub async fn add(config: Config, args: &AddArgs) -> Result<Out<Transaction>> {
    add_at(config, args, &Local::now()).await
}

/// `add` with the clock pinned to `now`. A local date-time without an offset is read in `now`'s
/// time zone.
pub async fn add_at<Tz>(
    config: Config,
    args: &AddArgs,
    now: &DateTime<Tz>,
) -> Result<Out<Transaction>>
where
    Tz: TimeZone,
{
    let date = match args.date() {
        Some(s) => parse_entry_date(s, &now.timezone())?,
        None => now.with_timezone(&Utc),
    };
    let new = NewTransaction {
        amount: args.amount(),
        r#type: args.r#type(),
        category: args.category(),
        date,
        note: args.note().to_string(),
    };
    let mut store = config.open_store().await?;
    let receipt = store.add(new).await?;
    Ok(Out::new(
        receipt.message(config.currency_symbol()),
        receipt.transaction().clone(),
    ))
}

/// Reads the date of a manually entered transaction.
///
/// Accepts an RFC 3339 timestamp, a date-time without an offset (taken to be in `tz`), or a bare
/// date (taken to be midnight UTC).
pub fn parse_entry_date<Tz>(s: &str, tz: &Tz) -> Result<DateTime<Utc>>
where
    Tz: TimeZone,
{
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("'{s}' does not exist in the local time zone"));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    bail!(
        "Unable to read '{s}' as a date, expected something like 2026-10-01, 2026-10-01T09:30 \
        or 2026-10-01T09:30:00+05:30"
    )
}

/// Records a transaction from the words given on the command line, as if they had been heard.
pub async fn say(config: Config, args: &SayArgs) -> Result<Out<Transaction>> {
    let mut store = config.open_store().await?;
    handle_transcript(&config, &mut store, &args.transcript(), &Local::now()).await
}

/// Runs one listening session and records whatever was heard.
///
/// In `Mode::Live` the phrase is read from stdin. In `Mode::Test` there is no speech engine and
/// the outcome is the unsupported message.
pub async fn listen(config: Config, mode: Mode) -> Result<Out<Transaction>> {
    match mode {
        Mode::Live => {
            let engine = LineEngine::new(BufReader::new(tokio::io::stdin()));
            listen_with(&config, Microphone::new(engine), Local::now).await
        }
        Mode::Test => listen_with(&config, Microphone::new(UnsupportedEngine), Local::now).await,
    }
}

/// `listen` on a given microphone. `clock` is read once a transcript has arrived.
pub async fn listen_with<E, Tz, F>(
    config: &Config,
    mut mic: Microphone<E>,
    clock: F,
) -> Result<Out<Transaction>>
where
    E: SpeechEngine + Send,
    Tz: TimeZone,
    F: FnOnce() -> DateTime<Tz>,
{
    if !mic.is_supported() {
        return Ok(mic.status().into());
    }
    info!("{STATUS_LISTENING}");
    let heard = mic.listen().await?;
    let Some(transcript) = heard else {
        return Ok("Nothing was heard".into());
    };
    let mut store = config.open_store().await?;
    handle_transcript(config, &mut store, &transcript, &clock()).await
}

/// Turns a transcript into a stored transaction.
///
/// The transcript is lower-cased and echoed back as `Heard: ...`. When no usable amount can be
/// found the store is left alone and the outcome says so; this is not an error.
pub async fn handle_transcript<Tz>(
    config: &Config,
    store: &mut TransactionStore,
    transcript: &str,
    now: &DateTime<Tz>,
) -> Result<Out<Transaction>>
where
    Tz: TimeZone,
{
    trace!("transcript {transcript:?}");
    let text = transcript.to_lowercase();
    let heard = format!("Heard: {text}");

    let new = match parser::parse(&text, now, config.keywords()) {
        Ok(new) => new,
        Err(e) => {
            debug!("Nothing recorded: {e}");
            return Ok(format!("{heard}\n{e}").into());
        }
    };
    let receipt = store.add(new).await?;
    Ok(Out::new(
        format!("{heard}\n{}", receipt.message(config.currency_symbol())),
        receipt.transaction().clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category, TransactionType};
    use crate::speech::{ScriptedEngine, STATUS_UNSUPPORTED};
    use crate::test::TestEnv;
    use chrono::FixedOffset;
    use std::str::FromStr;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    fn ist_now() -> DateTime<FixedOffset> {
        ist().with_ymd_and_hms(2026, 10, 19, 9, 15, 0).unwrap()
    }

    fn add_args(amount: &str, date: Option<&str>) -> AddArgs {
        AddArgs::new(
            Amount::from_str(amount).unwrap(),
            TransactionType::Expense,
            None,
            date.map(str::to_string),
            None,
        )
    }

    #[tokio::test]
    async fn test_add_defaults() {
        let env = TestEnv::new().await;
        let out = add_at(env.config(), &add_args("250", None), &ist_now())
            .await
            .unwrap();
        assert_eq!(out.message(), "Spent ₹250");

        let t = out.structure().unwrap();
        assert_eq!(t.category(), Category::Other);
        assert_eq!(t.note(), "");
        assert_eq!(t.date(), ist_now().with_timezone(&Utc));
        assert_eq!(env.stored().await, vec![t.clone()]);
    }

    #[tokio::test]
    async fn test_add_income_with_fields() {
        let env = TestEnv::new().await;
        let args = AddArgs::new(
            Amount::from_str("5000").unwrap(),
            TransactionType::Income,
            Some(Category::Bills),
            Some("2026-10-01T09:30".to_string()),
            Some("refund".to_string()),
        );
        let out = add_at(env.config(), &args, &ist_now()).await.unwrap();
        assert_eq!(out.message(), "Received ₹5,000");

        let t = out.structure().unwrap();
        assert_eq!(t.r#type(), TransactionType::Income);
        assert_eq!(t.category(), Category::Bills);
        assert_eq!(t.note(), "refund");
        assert_eq!(t.date(), Utc.with_ymd_and_hms(2026, 10, 1, 4, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_add_bad_date_stores_nothing() {
        let env = TestEnv::new().await;
        let result = add_at(env.config(), &add_args("10", Some("someday")), &ist_now()).await;
        assert!(result.is_err());
        assert!(env.stored().await.is_empty());
    }

    #[test]
    fn test_parse_entry_date_forms() {
        let tz = ist();
        assert_eq!(
            parse_entry_date("2026-10-01T09:00:00Z", &tz).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap()
        );
        assert_eq!(
            parse_entry_date("2026-10-01T09:00:00+05:30", &tz).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 1, 3, 30, 0).unwrap()
        );
        assert_eq!(
            parse_entry_date("2026-10-01T09:00", &tz).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 1, 3, 30, 0).unwrap()
        );
        assert_eq!(
            parse_entry_date(" 2026-10-01T09:00:30 ", &tz).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 1, 3, 30, 30).unwrap()
        );
        assert_eq!(
            parse_entry_date("2026-10-01", &tz).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_entry_date("01/10/2026", &tz).is_err());
        assert!(parse_entry_date("", &tz).is_err());
    }

    #[tokio::test]
    async fn test_handle_transcript_records() {
        let env = TestEnv::new().await;
        let config = env.config();
        let mut store = config.open_store().await.unwrap();
        let out = handle_transcript(
            &config,
            &mut store,
            "Spent 250 on Pizza yesterday",
            &ist_now(),
        )
        .await
        .unwrap();
        assert_eq!(
            out.message(),
            "Heard: spent 250 on pizza yesterday\nSpent ₹250"
        );

        let t = out.structure().unwrap();
        assert_eq!(t.amount(), Amount::from_str("250").unwrap());
        assert_eq!(t.r#type(), TransactionType::Expense);
        assert_eq!(t.category(), Category::Food);
        assert_eq!(t.note(), "spent 250 on pizza yesterday");
        assert_eq!(
            t.date(),
            ist()
                .with_ymd_and_hms(2026, 10, 18, 9, 15, 0)
                .unwrap()
                .with_timezone(&Utc)
        );
        assert_eq!(store.len(), 1);
        assert_eq!(env.stored().await, vec![t.clone()]);
    }

    #[tokio::test]
    async fn test_handle_transcript_without_amount() {
        let env = TestEnv::new().await;
        let config = env.config();
        let mut store = config.open_store().await.unwrap();
        let out = handle_transcript(&config, &mut store, "Bought Coffee", &ist_now())
            .await
            .unwrap();
        assert_eq!(out.message(), "Heard: bought coffee\nCouldn't detect amount");
        assert!(out.structure().is_none());
        assert!(store.is_empty());
        assert!(env.stored().await.is_empty());
    }

    #[tokio::test]
    async fn test_handle_transcript_rejections_store_nothing() {
        let env = TestEnv::new().await;
        let config = env.config();
        let mut store = config.open_store().await.unwrap();
        let cases = [
            ("spent 1,50,000 on a car", "Couldn't detect amount"),
            ("spent 50000000000000000000000000000 on food", "Amount too large"),
        ];
        for (text, expected) in cases {
            let out = handle_transcript(&config, &mut store, text, &ist_now())
                .await
                .unwrap();
            assert_eq!(out.message(), format!("Heard: {text}\n{expected}"));
            assert!(out.structure().is_none());
        }
        assert!(env.stored().await.is_empty());
    }

    #[tokio::test]
    async fn test_say_income() {
        let env = TestEnv::new().await;
        let out = say(env.config(), &SayArgs::new(["received", "5000", "salary"]))
            .await
            .unwrap();
        assert_eq!(out.message(), "Heard: received 5000 salary\nReceived ₹5,000");
        let stored = env.stored().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].r#type(), TransactionType::Income);
        assert_eq!(stored[0].category(), Category::Other);
    }

    #[tokio::test]
    async fn test_listen_with_scripted_engine() {
        let env = TestEnv::new().await;
        let mic = Microphone::new(ScriptedEngine::hearing("Uber 180 to office"));
        let out = listen_with(&env.config(), mic, ist_now).await.unwrap();
        assert_eq!(out.message(), "Heard: uber 180 to office\nSpent ₹180");
        assert_eq!(out.structure().unwrap().category(), Category::Travel);
        assert_eq!(env.stored().await.len(), 1);
    }

    #[tokio::test]
    async fn test_listen_hears_nothing() {
        let env = TestEnv::new().await;
        let mic = Microphone::new(ScriptedEngine::default());
        let out = listen_with(&env.config(), mic, ist_now).await.unwrap();
        assert_eq!(out.message(), "Nothing was heard");
        assert!(env.stored().await.is_empty());
    }

    #[tokio::test]
    async fn test_listen_in_test_mode_is_unsupported() {
        let env = TestEnv::new().await;
        let out = listen(env.config(), Mode::Test).await.unwrap();
        assert_eq!(out.message(), STATUS_UNSUPPORTED);
        assert!(out.structure().is_none());
    }
}
