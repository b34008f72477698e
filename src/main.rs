use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use plcwatch::app::App;
use plcwatch::backend::BackendHandle;
use plcwatch::monitor::Monitor;
use plcwatch::telemetry::{TcpTelemetrySource, TelemetryStream};
use plcwatch::ui::Theme;
use plcwatch::{events, settings, ui};
use plcwatch_client::HubClient;

#[derive(Parser, Debug)]
#[command(name = "plcwatch")]
#[command(about = "Live monitoring dashboard for PLC register telemetry")]
struct Args {
    /// Path to a settings file (default: ./plcwatch.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hub REST endpoint, e.g. http://localhost:5000 (overrides config)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Telemetry feed address, e.g. localhost:5001 (overrides config)
    #[arg(short, long)]
    stream: Option<String>,

    /// Write logs to this file (the terminal stays clean otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let mut settings = settings::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        settings.api.endpoint = endpoint;
    }
    if let Some(stream) = args.stream {
        settings.stream.endpoint = stream;
    }

    // Background tasks (REST calls, the telemetry reader) live on this
    // runtime; the UI loop itself stays synchronous.
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let mut builder = HubClient::builder()
        .endpoint(&settings.api.endpoint)
        .timeout(Duration::from_secs(settings.api.timeout_secs));
    if let (Some(username), Some(password)) = (&settings.api.username, &settings.api.password) {
        builder = builder.credentials(username, password);
    }
    let client = Arc::new(builder.build());

    let (backend, outcomes) = BackendHandle::new(client, runtime.handle().clone());
    let source = TcpTelemetrySource::connect(&settings.stream.endpoint);
    let monitor = Monitor::new(backend.clone(), TelemetryStream::new(Box::new(source)));

    let mut app = App::new(monitor, backend, outcomes, Theme::auto_detect());
    app.refresh_devices();

    run_tui(&mut app)
}

/// Run the TUI until the user quits.
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Apply backend completions and any queued telemetry
        app.tick();
    }

    Ok(())
}
