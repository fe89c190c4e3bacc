mod api;
mod app;
mod config;
mod present;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::airlines::AirlineDirectory;
use api::schedule::FlightQuery;
use api::ApiClient;
use app::App;
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "flightline")]
#[command(version = "0.1.0")]
#[command(about = "A terminal-friendly flight status lookup for the Amadeus travel APIs")]
struct Args {
    /// Carrier code for a one-shot lookup (e.g. BA); skips the TUI
    #[arg(long)]
    carrier: Option<String>,

    /// Flight number for a one-shot lookup
    #[arg(long)]
    flight: Option<String>,

    /// Scheduled departure date (YYYY-MM-DD) for a one-shot lookup
    #[arg(long)]
    date: Option<String>,

    /// List airlines whose name starts with PREFIX, then exit
    #[arg(long, value_name = "PREFIX")]
    airlines: Option<String>,

    /// OAuth client id (overrides the config file)
    #[arg(long, env = "AMADEUS_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth client secret (overrides the config file)
    #[arg(long, env = "AMADEUS_CLIENT_SECRET")]
    client_secret: Option<String>,

    /// API base URL (overrides the config file)
    #[arg(long, env = "AMADEUS_BASE_URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(client_id) = args.client_id {
        config.client_id = client_id;
    }
    if let Some(client_secret) = args.client_secret {
        config.client_secret = client_secret;
    }

    if !config.has_credentials() {
        let path = AppConfig::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "the config file".to_string());
        anyhow::bail!(
            "No API credentials. Set client_id/client_secret in {} \
             or pass --client-id/--client-secret",
            path
        );
    }

    let client = ApiClient::new(&config);

    // Handle CLI-only commands
    if let Some(prefix) = args.airlines {
        return print_airlines(&client, &prefix).await;
    }

    if args.carrier.is_some() || args.flight.is_some() || args.date.is_some() {
        let query = FlightQuery {
            carrier_code: args.carrier.unwrap_or_default(),
            flight_number: args.flight.unwrap_or_default(),
            departure_date: args.date.unwrap_or_default(),
        };
        return lookup_once(&client, &query).await;
    }

    // Run TUI
    run_tui(client).await
}

/// One-shot flight lookup for scripts: print the times, exit non-zero on failure
async fn lookup_once(client: &ApiClient, query: &FlightQuery) -> Result<()> {
    let status = client.lookup_flight(query).await?;
    let times = present::format_status(&status, present::local_zone());
    println!("Departure Time: {}", times.departure);
    println!("Arrival Time:   {}", times.arrival);
    Ok(())
}

/// Load the directory and print every airline matching the prefix
async fn print_airlines(client: &ApiClient, prefix: &str) -> Result<()> {
    let directory = AirlineDirectory::new(client.fetch_airlines().await?);
    let matches = directory.search(prefix);

    if matches.is_empty() {
        println!("No airlines match {:?}", prefix);
    } else {
        for airline in matches {
            println!("{} ({})", airline.name, airline.iata_code);
        }
    }
    Ok(())
}

async fn run_tui(client: ApiClient) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(client);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('c')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Drain background-task results and advance the throbber
        app.tick();
    }
}
