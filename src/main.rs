// ============================================================================
// TODOPANE - Searchable, filterable to-do list with a details pane
// ============================================================================
//
// MODULE STRUCTURE:
// 1. task / datetime      - Task record, timestamp parsing and formatting
// 2. storage / store      - Key-value persistence and the owning task store
// 3. filter               - Visible-list derivation and selection resolution
// 4. form / details       - Create/edit form and note draft editing
// 5. app                  - Owned application state with change notification
// 6. input / ui           - Event handling and rendering
// 7. main (this file)     - CLI, tracing, terminal setup and the event loop
// ============================================================================

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use todopane::app::{App, Change};
use todopane::cli::{self, Cli};
use todopane::input::{handle_key, handle_mouse};
use todopane::storage::FileStore;
use todopane::store::TaskStore;
use todopane::ui;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli::resolve_data_dir(
        cli.data_dir.as_deref(),
        std::env::var_os(cli::DATA_DIR_ENV).map(Into::into),
    )?;
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| data_dir.join(cli::LOG_FILE_NAME));
    cli::init_tracing(cli.verbose, cli.quiet, &log_file)?;
    info!(data_dir = %data_dir.display(), "starting todopane");

    let store = TaskStore::load(Box::new(FileStore::open(&data_dir)?));
    let mut app = App::new(store);
    app.subscribe(Box::new(|change: &Change| debug!(?change, "state changed")));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, event::EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        event::DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    info!("todopane exiting");
    res
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        // "Upcoming" is judged against the clock at each redraw
        let now = Local::now();
        app.sync_details(now);
        terminal.draw(|frame| ui::draw(frame, app, now))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));

        if event::poll(timeout)? {
            let now = Local::now();
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(app, key, now)? {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse, now),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}
