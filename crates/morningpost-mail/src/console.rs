//! Console notifier — prints the message instead of sending it.
//! Stands in for SMTP in preview mode and when no recipients are set.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use morningpost_core::error::{MorningPostError, Result};
use morningpost_core::traits::Notifier;

pub struct ConsoleNotifier<W: Write + Send = std::io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleNotifier {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    async fn deliver(&self, message: &str, to: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| MorningPostError::delivery(to, "console writer poisoned"))?;
        writeln!(out, "<!-- to: {to} -->")?;
        writeln!(out, "{message}")?;
        out.flush()?;
        tracing::debug!("🖨️  Printed message for {to}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_addressed_message() {
        let notifier = ConsoleNotifier::new(Vec::new());
        notifier.deliver("<p>hi</p>", "a@example.com").await.unwrap();
        notifier.deliver("<p>yo</p>", "b@example.com").await.unwrap();
        let text = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(
            text,
            "<!-- to: a@example.com -->\n<p>hi</p>\n<!-- to: b@example.com -->\n<p>yo</p>\n"
        );
    }
}
