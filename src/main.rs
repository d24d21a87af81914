mod app;
mod config;
mod handlers;
mod prefs;
mod store;
mod summary;
mod sync;
mod transport;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;

use app::App;
use config::Config;
use handlers::{handle_key_event, KeyAction};
use transport::memory::{spawn_loopback_watch, ChannelTransport};
use transport::Transport;
use ui::{
    render_connection_status, render_debug_log, render_dialog, render_file_list, render_header,
    render_status_bar,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // Loopback backend: a simulated watch serving match files from a local
    // directory. A real device-pairing backend would slot in behind the
    // same Transport seam.
    let (phone, watch) = ChannelTransport::pair();
    let source_dir = loopback_source_dir(&config)?;
    spawn_loopback_watch(watch, source_dir);
    let transport: Arc<dyn Transport> = Arc::new(phone);

    let mut app = App::new(config, transport)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    app.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{:?}", err);
    }

    Ok(())
}

fn loopback_source_dir(config: &Config) -> Result<PathBuf> {
    let dir = match config.storage.loopback_source_dir.as_deref() {
        Some(dir) => PathBuf::from(dir),
        None => dirs::data_dir()
            .context("Failed to get data directory")?
            .join("bowlsync")
            .join("watch_outbox"),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create watch source dir {}", dir.display()))?;
    Ok(dir)
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    app.refresh().await;
    let refresh_interval = Duration::from_secs(app.config.sync.refresh_interval_secs.max(1));
    let mut last_refresh = std::time::Instant::now();

    loop {
        // Periodic connectivity/file-list refresh; each iteration fully
        // awaits before the next, so ticks never overlap
        if last_refresh.elapsed() >= refresh_interval {
            app.refresh().await;
            last_refresh = std::time::Instant::now();
        }

        app.poll_request_outcomes();
        app.poll_data_events();
        app.clear_expired_status();

        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match handle_key_event(app, key).await {
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Continue => {}
                }
            }
        }
    }
}

fn render_ui(f: &mut Frame, app: &mut App) {
    let mut constraints = vec![
        Constraint::Length(3), // Header
        Constraint::Length(3), // Connection status
    ];
    if app.show_debug {
        constraints.push(Constraint::Percentage(50)); // File list
        constraints.push(Constraint::Percentage(25)); // Debug panel
    } else {
        constraints.push(Constraint::Min(5)); // File list takes the rest
    }
    constraints.push(Constraint::Length(3)); // Status bar

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(f.area());

    render_header(f, app.is_requesting(), chunks[0]);
    render_connection_status(
        f,
        app.screen.connected,
        &app.last_connected_label(),
        chunks[1],
    );
    render_file_list(f, &app.screen, chunks[2]);

    let mut next = 3;
    if app.show_debug {
        render_debug_log(f, app.debug_log.iter(), chunks[next]);
        next += 1;
    }
    render_status_bar(f, app.status_message.as_ref(), chunks[next]);

    render_dialog(f, &app.dialog, f.area());
}
