//! Terminal setup and the draw/event loop

use crate::app::{App, AppEvent};
use crate::client::ApiClient;
use crate::config::Config;
use crate::views;
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run the interactive client until the user quits
pub async fn run(config: &Config, client: ApiClient) -> Result<()> {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        restore_terminal();
        default_hook(panic);
    }));

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut app = App::new(config, client, tx);
    info!(api_url = app.api_url(), "starting terminal client");

    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    while !app.should_quit {
        terminal.draw(|frame| views::render(frame, &mut app))?;

        while let Ok(event) = rx.try_recv() {
            app.handle_event(event);
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // background tasks run on the runtime's workers
        tokio::task::yield_now().await;
    }

    terminal.show_cursor()?;
    Ok(())
}
