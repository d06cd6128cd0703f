use std::io;
use std::sync::Arc;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

mod app;
mod ui;
mod views;

use app::App;
use paperchat_client::{config, ApiClient, ClientConfig, RefreshLoop, SessionCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_dir = config::config_dir();
    std::fs::create_dir_all(&config_dir)?;
    let config = ClientConfig::load(&config::config_file_path())?;

    let logs_dir = paperchat_observability::logs_dir_from_root(&config_dir);
    let (_log_guard, log_info) =
        paperchat_observability::init_process_logging(&logs_dir, config.log_retention_days)?;
    tracing::info!(logs_dir = %log_info.logs_dir, server = %config.server_url, "paperchat starting");

    let client = ApiClient::new(config.server_url.clone())?;
    let session = SessionCache::new(client.clone(), config.session_ttl());

    let refresh = Arc::new(RefreshLoop::new());
    let (auth_tx, auth_rx) = mpsc::unbounded_channel();
    refresh
        .start(config.refresh_interval(), Arc::new(client.clone()), auth_tx)
        .await;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, client, session, refresh.clone(), auth_rx);

    let res = run_app(&mut terminal, &mut app).await;

    refresh.stop().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<ApiClient>,
) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = app.handle_key_event(key) {
                        if action == app::Action::Quit {
                            return Ok(());
                        }
                        app.update(action).await?;
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick().await;
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
