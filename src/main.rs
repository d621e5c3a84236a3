use std::{
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use rapidtype::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    language::{Language, DEFAULT_LANGUAGE},
    logging,
    runtime::{AppEventSource, ChannelTickScheduler, CrosstermEventSource, FixedTicker, Runner},
    App, Flow, Session,
};

const POLL_RATE_MS: u64 = 250;

/// thirty second typing test for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type the random passage before the clock runs out. The timer starts with your first keystroke; tab restarts with a new passage, esc quits."
)]
pub struct Cli {
    /// number of words in the passage [default: 45, or the saved value]
    #[clap(short = 'w', long = "words")]
    number_of_words: Option<usize>,

    /// length of the test in seconds [default: 30, or the saved value]
    #[clap(short = 's', long = "secs")]
    number_of_secs: Option<u32>,

    /// whitespace separated word list to use instead of the bundled english corpus
    #[clap(long)]
    words_file: Option<PathBuf>,

    /// save the effective settings as the new defaults
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Flags win over the saved config
    fn merge_into(&self, mut cfg: Config) -> Config {
        if let Some(words) = self.number_of_words {
            cfg.number_of_words = words;
        }
        if let Some(secs) = self.number_of_secs {
            cfg.number_of_secs = secs;
        }
        if let Some(ref path) = self.words_file {
            cfg.words_file = Some(path.clone());
        }
        cfg
    }
}

fn load_language(cfg: &Config) -> Result<Language> {
    let language = match cfg.words_file {
        Some(ref path) => Language::from_path(path)?,
        None => Language::new(DEFAULT_LANGUAGE)?,
    };
    Ok(language)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = AppDirs::log_path();
    if let Err(e) = logging::init(&log_path) {
        eprintln!("logging disabled, unable to open {}: {e}", log_path.display());
    }

    let store = FileConfigStore::new();
    let cfg = cli.merge_into(store.load());
    if cli.save {
        store
            .save(&cfg)
            .with_context(|| format!("unable to save config to {}", store.path().display()))?;
        tracing::info!("saved defaults to {}", store.path().display());
    }

    let language = load_language(&cfg)?;
    let corpus_name = language.name.clone();

    let events = CrosstermEventSource::new();
    let scheduler = ChannelTickScheduler::new(events.sender(), FixedTicker::every_second());
    let session = Session::new(language, cfg.session_config(), Box::new(scheduler))?;
    let mut app = App::new(session, corpus_name);
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(POLL_RATE_MS)));

    // Restore the terminal before the default hook prints the panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: AppEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, FixedTicker>,
) -> Result<()> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let Some(event) = runner.step() else {
            continue;
        };

        match app.handle_event(event) {
            Flow::Quit => break,
            Flow::Continue { redraw: true } => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            Flow::Continue { redraw: false } => {}
        }
    }

    tracing::debug!("quitting");
    Ok(())
}
