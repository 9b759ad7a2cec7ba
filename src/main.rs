use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use voice_expenses::args::{Args, Command};
use voice_expenses::{commands, Config, Mode, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expenses_home().path();

    // When EXPENSES_IN_TEST_MODE is set and non-empty, `listen` runs without a speech engine.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add_args) => commands::add(Config::load(home).await?, add_args)
            .await?
            .print(),

        Command::Say(say_args) => commands::say(Config::load(home).await?, say_args)
            .await?
            .print(),

        Command::Listen => commands::listen(Config::load(home).await?, mode)
            .await?
            .print(),

        Command::Delete(delete_args) => commands::delete(Config::load(home).await?, delete_args)
            .await?
            .print(),

        Command::Clear(clear_args) => commands::clear(Config::load(home).await?, clear_args)
            .await?
            .print(),

        Command::List => commands::list(Config::load(home).await?).await?.print(),

        Command::Summary(summary_args) => {
            commands::summary(Config::load(home).await?, summary_args)
                .await?
                .print()
        }

        Command::Categories => commands::categories(Config::load(home).await?)
            .await?
            .print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => {
            // Only this crate and its binary log at the requested level.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "voice_expenses",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
