use clap::{Parser, Subcommand};

/// Calendar reminder daemon: tracks the next upcoming event across your
/// selected calendars and raises a reminder one minute before it starts.
#[derive(Debug, Parser)]
#[command(name = "upnext", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the reminder daemon until interrupted
    Watch,
    /// List calendar sources and their selection state
    Calendars,
    /// Toggle a calendar source in or out of the monitored selection
    Toggle {
        /// Identifier of the calendar source, as shown by `calendars`
        source_id: String,
    },
    /// Request calendar access from the provider
    Connect,
    /// Show the reminder overlay for the current upcoming event
    ShowNow,
    /// Open the upcoming event's conference link in the browser
    Join,
    /// Dismiss the reminder overlay
    Dismiss,
}
