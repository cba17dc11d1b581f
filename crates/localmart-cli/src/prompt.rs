// Terminal implementation of the restaurant-switch prompt.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use localmart_cart::confirm::{Confirm, ConfirmPrompt};

/// Asks on stdout and reads a `y`/`n` answer from stdin. Anything other than
/// `y` or `yes` counts as no.
pub struct TerminalConfirm;

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        let mut stdout = tokio::io::stdout();
        let question = format!("{} [y/N] ", prompt.message());
        if let Err(e) = stdout.write_all(question.as_bytes()).await {
            warn!("Failed to write prompt: {}", e);
            return false;
        }
        let _ = stdout.flush().await;

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut answer).await {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
