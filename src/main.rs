mod app;
mod config;
mod currency;
mod signal;
mod status;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use signal::SignalClient;
use status::Status;

#[derive(Parser, Debug)]
#[command(name = "fxcheck")]
#[command(version = "0.1.0")]
#[command(about = "A terminal-friendly currency conversion signal checker")]
struct Args {
    /// Run one check and print the result as JSON (for scripts)
    #[arg(short, long)]
    check: bool,

    /// Base currency code (defaults to the configured one)
    #[arg(short, long)]
    base: Option<String>,

    /// Target currency code (defaults to the configured one)
    #[arg(short, long)]
    target: Option<String>,

    /// Signal endpoint URL (overrides the configured one)
    #[arg(short, long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();

    // Handle CLI-only commands
    if args.check {
        return check_once(config, args).await;
    }

    run_tui(config, args.endpoint).await
}

/// One-shot check: JSON on stdout, suitable for scripts and bars.
async fn check_once(config: AppConfig, args: Args) -> Result<()> {
    let base = args
        .base
        .unwrap_or_else(|| config.base.clone())
        .to_ascii_uppercase();
    let target = args
        .target
        .unwrap_or_else(|| config.target.clone())
        .to_ascii_uppercase();

    if base == target {
        anyhow::bail!("pick different currencies (base and target are both {})", base);
    }

    let endpoint = args.endpoint.unwrap_or_else(|| config.endpoint.clone());
    let client = SignalClient::new(endpoint);
    let response = client.fetch(&base, &target).await?;
    let status = Status::from_response(&base, &target, &response);

    let output = serde_json::json!({
        "signal": response.signal.as_str(),
        "label": response.label,
        "latest": response.latest,
        "p50": response.p50,
        "p75": response.p75,
        "days": response.days,
        "details": status.details,
    });
    println!("{}", serde_json::to_string(&output)?);

    if config.notifications {
        notify(&format!("{} → {}", base, target), &response.label)?;
    }
    Ok(())
}

async fn run_tui(config: AppConfig, endpoint_override: Option<String>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config, endpoint_override);

    // Main loop
    let result = run_app(&mut terminal, &mut app);

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

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q')
                        if app.popup == Popup::None && app.open_panel.is_none() =>
                    {
                        return Ok(())
                    }
                    KeyCode::Char('c')
                        if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                    {
                        return Ok(())
                    }
                    _ => app.handle_key(key),
                },
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    app.handle_mouse(mouse, Rect::new(0, 0, size.width, size.height));
                }
                _ => {}
            }
        }

        // Apply finished checks, expire transient messages
        app.tick();
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("dialog-information")
        .show()?;
    Ok(())
}
