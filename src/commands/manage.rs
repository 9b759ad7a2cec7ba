//! Delete command handlers.

use crate::args::{ClearArgs, DeleteArgs};
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

/// Deletes transactions by ID. IDs that are not in the store are skipped without error.
///
/// The structure holds the IDs that were actually deleted.
pub async fn delete(config: Config, args: &DeleteArgs) -> Result<Out<Vec<String>>> {
    let mut store = config.open_store().await?;
    let mut deleted = Vec::new();
    for id in args.ids() {
        if let Some(t) = store.delete(id).await? {
            deleted.push(t.id().to_string());
        }
    }

    let count = deleted.len();
    let message = format!(
        "Deleted {} transaction{}",
        count,
        if count == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, deleted))
}

/// Deletes every transaction, asking on stdin first unless `--yes` was given.
pub async fn clear(config: Config, args: &ClearArgs) -> Result<Out<usize>> {
    let stdin = BufReader::new(tokio::io::stdin());
    clear_with(config, args, stdin).await
}

/// `clear` with the confirmation answer read from `answers`.
pub async fn clear_with<R>(config: Config, args: &ClearArgs, answers: R) -> Result<Out<usize>>
where
    R: AsyncBufRead + Unpin,
{
    let mut store = config.open_store().await?;
    if store.is_empty() {
        return Ok(Out::new("There are no transactions to clear", 0));
    }
    if !args.yes() {
        let question = format!("Delete all {} transactions?", store.len());
        if !confirm(&question, answers).await? {
            return Ok(Out::new("Nothing was cleared", 0));
        }
    }

    let count = store.clear().await?;
    let message = format!(
        "Cleared {} transaction{}",
        count,
        if count == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, count))
}

/// Writes `question` to stderr and reads one line from `answers`. Only `y` or `yes` agree.
async fn confirm<R>(question: &str, mut answers: R) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let mut stderr = tokio::io::stderr();
    stderr
        .write_all(format!("{question} [y/N] ").as_bytes())
        .await
        .context("Unable to write the confirmation prompt")?;
    stderr.flush().await.context("Unable to flush stderr")?;

    let mut line = String::new();
    answers
        .read_line(&mut line)
        .await
        .context("Unable to read the confirmation")?;
    let answer = line.trim().to_lowercase();
    debug!("confirmation answer {answer:?}");
    Ok(matches!(answer.as_str(), "y" | "yes"))
}
