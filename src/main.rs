use std::fs::File;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coinsim::CoinsimError;
use coinsim::api::RestClient;
use coinsim::config::fetch_config;
use coinsim::tui::event::{spawn_event_reader, spawn_tick_timer};
use coinsim::tui::{App, Message, Runtime, Tui, render, restore_terminal, setup_terminal, update};
use coinsim::websocket::PriceFeed;

/// UI refresh rate for ticks (notice expiry, "last update" age).
const TICK_INTERVAL_MS: u64 = 250;

#[tokio::main]
async fn main() -> Result<(), CoinsimError> {
    let config = fetch_config()?;

    // The terminal belongs to the UI, so tracing goes to a file.
    let log_file = File::create(&config.log_file)
        .map_err(|e| CoinsimError::Io(format!("failed to open {}: {e}", config.log_file)))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coinsim=info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    info!(api = %config.backend.api_url, ws = %config.stream.websocket_url, "Starting coinsim");

    let api = Arc::new(RestClient::new(&config.backend)?);
    let feed = PriceFeed::new(config.stream.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut app = App::new();
    let mut runtime = Runtime::new(api, feed, tx.clone(), config.poll_interval);

    let mut terminal = setup_terminal()?;
    spawn_event_reader(tx.clone());
    spawn_tick_timer(tx, TICK_INTERVAL_MS);
    runtime.start(&mut app);

    let result = run(&mut terminal, &mut app, &mut runtime, &mut rx).await;

    runtime.shutdown();
    restore_terminal(&mut terminal)?;
    info!("Exiting");
    result
}

async fn run(
    terminal: &mut Tui,
    app: &mut App,
    runtime: &mut Runtime<RestClient>,
    rx: &mut mpsc::UnboundedReceiver<Message>,
) -> Result<(), CoinsimError> {
    while !app.should_quit {
        draw(terminal, app)?;

        let Some(message) = rx.recv().await else {
            break;
        };
        if let Some(action) = update(app, message) {
            runtime.execute(app, action);
        }
    }
    Ok(())
}

fn draw(terminal: &mut Tui, app: &App) -> Result<(), CoinsimError> {
    terminal
        .draw(|frame| render(frame, app))
        .map_err(|e| CoinsimError::Io(format!("failed to draw: {e}")))?;
    Ok(())
}
