//! Terminal front-end for `livecheck`.
//!
//! One editor pane next to an info panel that shows the checker's goal at the cursor and the
//! diagnostics for the open file. The panel sits beside the editor on wide terminals and
//! below it on tall ones.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p livecheck-tui -- Main.lean
//! cargo run -p livecheck-tui -- --checker lake --checker-arg serve --log-file /tmp/livecheck.log
//! ```
//!
//! # Keys
//!
//! - Arrows / Home / End / PageUp / PageDown: move the cursor
//! - Enter / Backspace / Delete / Tab: edit
//! - Paste: inserted as one edit
//! - Ctrl+S: save
//! - Ctrl+Q or Ctrl+X: quit

mod app;
mod cli;
mod ui;

use app::{App, CheckerLaunch, spawn_checker};
use clap::Parser;
use cli::Cli;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

fn setup_tracing(log_file: Option<&Path>) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    // The terminal belongs to the UI; without a log file, logs are dropped.
    let Some(path) = log_file else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("livecheck=info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.log_file.as_deref());

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = App::new(
        cli.file.clone(),
        cli.autosave,
        cli.cell_aspect,
        terminal::size()?,
    )
    .and_then(|mut app| {
        if !cli.no_checker {
            let launch = CheckerLaunch {
                program: cli.checker.clone(),
                args: cli.checker_args.clone(),
                goal_method: cli.goal_method.clone(),
                language_id: cli.language_id.clone(),
            };
            app.wait_for_checker(spawn_checker(launch, app.path()));
        }
        run_app(&mut terminal, &mut app)
    });

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("error: {err}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui::render(f, app))?;

        if app.should_quit() {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Paste(text) => app.handle_paste(text),
                Event::Resize(cols, rows) => app.resize(cols, rows),
                _ => {}
            }
        }
    }

    Ok(())
}
