use calmie::{
    app::{App, Control},
    app_dirs::AppDirs,
    audio::{AmbientPlayer, RodioPlayer, SilentPlayer},
    config::{Config, ConfigStore, FileConfigStore},
    haptics::TerminalBell,
    logging,
    runtime::{CalmEventSource, CrosstermEventSource, FixedTicker, Runner, ThreadDeadline, Ticker},
    session::{SessionLength, SessionTimer, TICK_INTERVAL},
    words::{WordList, DEFAULT_WORD_LIST},
};
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
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::{error, info, warn};

/// calm relaxation timer with cycling words, ambient audio and a progress ring
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Pick a length, press space and breathe. A new word appears every five seconds while an ambient track loops and the ring slowly empties."
)]
pub struct Cli {
    /// session length in minutes (1-10), defaults to the last length used
    #[clap(short = 'm', long, value_parser = clap::value_parser!(u8).range(1..=10))]
    minutes: Option<u8>,

    /// ambient track to loop while a session runs (mp3, wav or ogg)
    #[clap(short = 't', long)]
    track: Option<PathBuf>,

    /// disable ambient audio entirely
    #[clap(long)]
    silent: bool,

    /// do not ring the terminal bell on word changes and completion
    #[clap(long)]
    no_bell: bool,

    /// JSON word list to cycle instead of the bundled one: {"name": "..", "words": [..]}
    #[clap(short = 'w', long)]
    words: Option<PathBuf>,

    /// shuffle the word order for each run
    #[clap(long)]
    shuffle: bool,
}

/// Effective settings after layering CLI flags over the saved config
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    length: SessionLength,
    track: Option<PathBuf>,
    silent: bool,
    bell: bool,
    words: Option<PathBuf>,
    shuffle: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            length: cli
                .minutes
                .map(SessionLength::new)
                .unwrap_or_else(|| config.session_length()),
            track: cli
                .track
                .clone()
                .or_else(|| config.audio_track.clone())
                .or_else(AppDirs::default_track),
            silent: cli.silent,
            bell: config.bell && !cli.no_bell,
            words: cli.words.clone(),
            shuffle: cli.shuffle || config.shuffle,
        }
    }

    fn load_words(&self) -> Result<WordList, Box<dyn Error>> {
        let list = match &self.words {
            Some(path) => WordList::from_path(path)?,
            None => WordList::bundled(DEFAULT_WORD_LIST)?,
        };
        Ok(if self.shuffle { list.shuffled() } else { list })
    }

    fn audio(&self) -> Box<dyn AmbientPlayer> {
        match (&self.track, self.silent) {
            (Some(track), false) => Box::new(RodioPlayer::new(track)),
            _ => Box::new(SilentPlayer::new()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = logging::init();

    let store = FileConfigStore::new();
    let mut config = store.load();
    let settings = Settings::resolve(&cli, &config);
    let words = settings.load_words()?;
    info!(
        minutes = settings.length.minutes(),
        words = words.len(),
        silent = settings.silent,
        "starting calmie"
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let deadline = ThreadDeadline::new(events.sender());
    let mut app = App::new(
        SessionTimer::new(),
        words,
        settings.length,
        settings.audio(),
        Box::new(TerminalBell::new(settings.bell)),
        Box::new(deadline),
    );
    let runner = Runner::new(events, FixedTicker::new(TICK_INTERVAL));

    let result = start_tui(&mut terminal, &mut app, &runner);
    if let Err(err) = &result {
        error!(error = %err, "ui loop failed");
    }
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    config.minutes = app.length.minutes();
    if let Err(err) = store.save(&config) {
        warn!(path = %store.path().display(), error = %err, "could not save config");
    }

    result
}

fn start_tui<B: Backend, E: CalmEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step();
        if app.handle_event(event) == Control::Quit {
            break;
        }
        // ratatui only flushes changed cells, so idle redraws are cheap
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}
