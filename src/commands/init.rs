use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its `store` subdirectory and an initial `config.json` with
/// default settings.
///
/// # Arguments
/// - `expenses_home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/voice-expenses`
///
/// # Errors
/// - Returns an error if the directory has already been initialized.
/// - Returns an error if any file operations fail.
pub async fn init(expenses_home: &Path) -> Result<Out<()>> {
    let config = Config::create(expenses_home)
        .await
        .context("Unable to create the data directory and config")?;
    Ok(format!(
        "Successfully created the expenses directory at {}",
        config.root().display()
    )
    .into())
}
