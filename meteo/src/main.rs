use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use meteo_dispatch::{EffectRuntime, EffectStoreWithMiddleware, LoggingMiddleware};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;

use meteo::TICK_MS;
use meteo::action::Action;
use meteo::api::WeatherClient;
use meteo::components::AppShell;
use meteo::config::{self, CliOverrides, ResolvedConfig};
use meteo::effect::{Effect, EffectHandler, STRIP_REFRESH_SUB, WEATHER_REFRESH_SUB};
use meteo::reducer::reducer;
use meteo::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "meteo", version)]
#[command(about = "Weather lookup in the terminal: search, live panel, popular cities, world map")]
struct Args {
    /// Weather service base URL (env: METEO_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// City shown at startup (env: METEO_CITY)
    #[arg(long, short)]
    city: Option<String>,

    /// Config file [default: <config_dir>/meteo/config.toml]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file; nothing is logged otherwise
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Weather panel refresh interval in seconds
    #[arg(long, short)]
    refresh_interval: Option<u64>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            api_url: self.api_url.clone(),
            city: self.city.clone(),
            log_file: self.log_file.clone(),
            refresh_interval_secs: self.refresh_interval,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = config::load(args.config.as_deref(), &args.overrides())?;

    if let Some(path) = &config.log_file {
        init_logging(path)?;
    }
    tracing::info!(
        api_url = %config.api_url,
        city = %config.default_city,
        "Starting meteo"
    );

    let client = WeatherClient::new(config.api_url.clone())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &config, client).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.context("terminal loop failed")
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install log subscriber: {e}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &ResolvedConfig,
    client: WeatherClient,
) -> io::Result<()> {
    let store = EffectStoreWithMiddleware::new(
        AppState::new(&config.default_city),
        reducer,
        LoggingMiddleware::new().ignore("Tick"),
    );
    let mut runtime: EffectRuntime<AppState, Action, Effect, _> = EffectRuntime::from_store(store);

    let timings = config.timings;
    runtime
        .subscriptions()
        .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick)
        .interval(WEATHER_REFRESH_SUB, timings.weather_refresh, || {
            Action::WeatherFetch
        })
        .interval(STRIP_REFRESH_SUB, timings.strip_refresh, || {
            Action::StripFetchAll
        });

    runtime.enqueue(Action::WeatherFetch);
    runtime.enqueue(Action::StripFetchAll);

    let handler = EffectHandler::new(client, timings.weather_refresh, timings.search_debounce);
    let ui = RefCell::new(AppShell::new());

    runtime
        .run(
            terminal,
            |frame, area, state| ui.borrow_mut().render(frame, area, state, Utc::now()),
            |event, state| ui.borrow_mut().map_event(event, state),
            |action| matches!(action, Action::Quit),
            |effect, ctx| handler.handle(effect, ctx),
        )
        .await
}
