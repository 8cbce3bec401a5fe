use super::{OverlayContent, OverlayPresenter};
use crate::error::AppResult;
use async_trait::async_trait;
use tracing::info;

/// Overlay presenter that renders the reminder to the console.
///
/// Stands in for the full-screen window on headless runs.
#[derive(Debug, Default, Clone)]
pub struct ConsoleOverlay;

impl ConsoleOverlay {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OverlayPresenter for ConsoleOverlay {
    async fn show(&self, content: OverlayContent) -> AppResult<()> {
        let banner = "=".repeat(60);
        println!("{}", banner);
        println!("  {}", content.title);
        println!(
            "  {} - {}",
            content.start.format("%Y-%m-%d %H:%M"),
            content.end.format("%H:%M")
        );
        if let Some(url) = &content.conference_url {
            println!("  Join: {}", url);
        }
        println!("{}", banner);

        info!("Reminder shown for '{}'", content.title);
        Ok(())
    }

    async fn hide(&self) -> AppResult<()> {
        info!("Reminder dismissed");
        Ok(())
    }
}
