use std::future::Future;
use std::pin::Pin;

use geo_riddle_core::Prompt;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Dialogs on the terminal. An empty line or `q` dismisses.
pub struct TerminalPrompt {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    async fn read_line(&self) -> Option<String> {
        let line = self.lines.lock().await.next_line().await.ok().flatten()?;
        let line = line.trim();

        if line.is_empty() || line.eq_ignore_ascii_case("q") {
            return None;
        }

        Some(line.to_string())
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    fn ask<'a>(
        &'a self,
        header: &'a str,
        message: &'a str,
        choices: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Option<usize>> + Send + 'a>> {
        Box::pin(async move {
            println!("\n== {header} ==\n{message}");
            for (i, choice) in choices.iter().enumerate() {
                println!("  {}) {choice}", i + 1);
            }

            loop {
                let line = self.read_line().await?;
                match line.parse::<usize>() {
                    Ok(n) if (1..=choices.len()).contains(&n) => return Some(n - 1),
                    _ => println!("Pick 1-{} (empty line to dismiss)", choices.len()),
                }
            }
        })
    }

    fn ask_text<'a>(
        &'a self,
        header: &'a str,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            println!("\n== {header} ==\n{message}");
            self.read_line().await
        })
    }
}
