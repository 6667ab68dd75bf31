use blankpage::{
    config::{FileConfigStore, Settings},
    controller::Flow,
    error::Result,
    logging,
    runtime::{AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    timer::Strategy,
    ui, WriterBlockApp, TICK_RATE_MS,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::info;

/// scratch pad that wipes your words after five seconds of hesitation
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A blank page that refuses to let you look back: once you stop typing for five seconds, everything you wrote is gone. Press Start, write, keep writing."
)]
pub struct Cli {
    /// how inactivity is detected (default: cooperative, or the config file's choice)
    #[clap(long, value_enum)]
    strategy: Option<Strategy>,

    /// append diagnostics to this file (filter with BLANKPAGE_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = store.load_or_default();
    let settings = Settings::resolve(cli.strategy, cli.log_file, config);
    logging::init(settings.log_file.as_deref())?;
    info!(strategy = %settings.strategy, config = %store.path().display(), "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut app = WriterBlockApp::new(settings.strategy.build(runner.dispatcher()));
    let outcome = start_tui(&mut terminal, &mut app, &runner);

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!(clears = app.session.clears, "exiting");
    outcome
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut WriterBlockApp,
    runner: &Runner<E, T>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);

        if app.handle_event(runner.step(), Instant::now(), area) == Flow::Quit {
            break;
        }
    }

    Ok(())
}
