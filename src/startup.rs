use crate::conference;
use crate::config::Config;
use crate::error::Error;
use crate::overlay::{self, ConsoleOverlay};
use crate::provider::{AuthorizationStatus, CalendarProvider, HttpCalendarProvider};
use crate::selection::SelectionStore;
use crate::shutdown;
use crate::tracker::TrackerHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

fn build_provider(config: &Config) -> Arc<dyn CalendarProvider> {
    Arc::new(HttpCalendarProvider::new(config))
}

fn spawn_tracker(config: &Config, provider: Arc<dyn CalendarProvider>) -> TrackerHandle {
    let store = SelectionStore::new(config.selection_path.clone());
    let presenter = Arc::new(ConsoleOverlay::new());

    TrackerHandle::spawn(
        provider,
        store,
        presenter,
        Duration::from_secs(config.poll_interval_secs),
    )
}

/// Run the reminder daemon until a termination signal arrives
pub async fn run_watch(config: Config) -> miette::Result<()> {
    let provider = build_provider(&config);

    if !ensure_access(provider.as_ref()).await? {
        println!("Calendar access was not granted. Run `upnext connect` to try again.");
        return Ok(());
    }

    let tracker = spawn_tracker(&config, Arc::clone(&provider));
    tracker.start_observing().await?;

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_tracker = tracker.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_tracker).await;
    });

    info!("Watching selected calendars, press Ctrl+C to stop");
    let _ = shutdown_recv.await;

    Ok(())
}

/// List calendar sources and their selection state
pub async fn run_calendars(config: Config) -> miette::Result<()> {
    let provider = build_provider(&config);
    let sources = provider.sources().await?;

    let store = SelectionStore::new(config.selection_path.clone());
    let selected = store.load();

    if sources.is_empty() {
        println!("The provider reports no calendar sources.");
        return Ok(());
    }

    for source in sources {
        let marker = if selected.contains(&source.id) {
            "[x]"
        } else {
            "[ ]"
        };
        println!("{} {}  ({})", marker, source.title, source.id);
    }

    Ok(())
}

/// Toggle a calendar source and report the resulting upcoming event
pub async fn run_toggle(config: Config, source_id: &str) -> miette::Result<()> {
    let provider = build_provider(&config);
    let tracker = spawn_tracker(&config, provider);

    let upcoming = tracker.toggle_source(source_id).await?;
    match upcoming {
        Some(event) => println!("Next upcoming event: '{}' at {}", event.title, event.start),
        None => println!("No upcoming event in the next month."),
    }

    tracker.shutdown().await?;
    Ok(())
}

/// Request calendar access from the provider
pub async fn run_connect(config: Config) -> miette::Result<()> {
    let provider = build_provider(&config);

    let granted = provider.request_access().await?;
    if granted {
        println!("Calendar access granted.");
    } else {
        println!("Calendar access denied.");
    }

    Ok(())
}

/// Show the reminder overlay for the current upcoming event, if any
pub async fn run_show_now(config: Config) -> miette::Result<()> {
    let provider = build_provider(&config);
    let tracker = spawn_tracker(&config, provider);

    tracker.recompute().await?;
    let shown = tracker.show_overlay_now().await?;
    if !shown {
        println!("No upcoming event to show.");
    }

    tracker.shutdown().await?;
    Ok(())
}

/// Open the upcoming event's conference link in the browser
pub async fn run_join(config: Config) -> miette::Result<()> {
    let provider = build_provider(&config);
    let tracker = spawn_tracker(&config, provider);

    tracker.recompute().await?;
    let snapshot = tracker.snapshot().await?;
    tracker.shutdown().await?;

    let Some(event) = snapshot.upcoming else {
        println!("No upcoming event.");
        return Ok(());
    };

    match conference::event_conference_url(&event) {
        Some(url) => {
            println!("Opening {}", url);
            overlay::open_conference(&url)?;
        }
        None => println!("'{}' has no detectable conference link.", event.title),
    }

    Ok(())
}

/// Dismiss the reminder overlay
pub async fn run_dismiss(_config: Config) -> miette::Result<()> {
    use crate::overlay::OverlayPresenter;

    ConsoleOverlay::new().hide().await?;
    Ok(())
}

/// Check authorization, prompting for access when it is not yet granted
async fn ensure_access(provider: &dyn CalendarProvider) -> miette::Result<bool> {
    match provider.authorization_status().await? {
        AuthorizationStatus::Granted => Ok(true),
        AuthorizationStatus::Denied => Ok(false),
        AuthorizationStatus::Unknown => {
            info!("Calendar access not yet determined, requesting it");
            Ok(provider.request_access().await?)
        }
    }
}
