mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use mathdrill::{
    answer_pad::{self, AnswerPad, PadKey},
    app_dirs::AppDirs,
    config::{DisplayScale, FilePreferenceStore, PreferenceStore},
    logging,
    question::Operation,
    runtime::{
        CrosstermEventSource, DrillEvent, EventSource, FixedTicker, Runner, SystemClock,
        ThreadCountdown, Ticker,
    },
    session::{ConfigError, PhaseKind, SessionController, TestConfig},
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

/// Step applied to the time limit on the configuration screen.
const TIME_STEP_SECS: i64 = 10;

/// timed arithmetic drill in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed arithmetic drill: unique questions per attempt, answers auto-submitted when the clock runs out, and a full review at the end."
)]
pub struct Cli {
    /// kind of arithmetic to practise
    #[clap(short = 'o', long, value_enum, default_value_t = Operation::Addition)]
    operation: Operation,

    /// digits per operand
    #[clap(short = 'd', long, default_value_t = 2)]
    digits: u32,

    /// number of questions per attempt
    #[clap(short = 'q', long, default_value_t = 10)]
    questions: usize,

    /// time limit in seconds
    #[clap(short = 't', long, default_value_t = 60)]
    time_limit: u64,

    /// write logs here instead of the default state directory
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn to_test_config(&self) -> Result<TestConfig, ConfigError> {
        TestConfig::new(self.operation, self.digits, self.questions, self.time_limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Operation,
    Digits,
    Questions,
    TimeLimit,
}

impl ConfigField {
    const ALL: [ConfigField; 4] = [
        ConfigField::Operation,
        ConfigField::Digits,
        ConfigField::Questions,
        ConfigField::TimeLimit,
    ];

    fn offset(&self, by: isize) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[(idx + by).rem_euclid(len) as usize]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfigField::Operation => "Test Type",
            ConfigField::Digits => "Number of Digits",
            ConfigField::Questions => "Number of Questions",
            ConfigField::TimeLimit => "Time Limit (seconds)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Quit,
}

pub struct App {
    pub controller: SessionController,
    pub pad: AnswerPad,
    pub field: ConfigField,
    pub scale: DisplayScale,
    pub notice: Option<String>,
    prefs: Box<dyn PreferenceStore>,
}

impl App {
    pub fn new(controller: SessionController, prefs: Box<dyn PreferenceStore>) -> Self {
        let scale = DisplayScale::load(prefs.as_ref());
        Self {
            controller,
            pad: AnswerPad::new(),
            field: ConfigField::Operation,
            scale,
            notice: None,
            prefs,
        }
    }

    fn start(&mut self) {
        let outcome = self.controller.start();
        self.pad.reset();
        self.notice = outcome.shortfall.map(|s| {
            format!(
                "Only {} unique questions are possible with these settings ({} requested).",
                s.actual, s.requested
            )
        });
    }

    fn reset(&mut self) {
        self.controller.reset();
        self.pad.reset();
        self.notice = None;
    }

    fn cycle_scale(&mut self) {
        self.scale = self.scale.next();
        if let Err(e) = self.scale.save(self.prefs.as_mut()) {
            tracing::warn!("could not save display scale: {e}");
        }
    }

    fn adjust_field(&mut self, step: i64) {
        let cfg = *self.controller.config();
        let cfg = match self.field {
            ConfigField::Operation if step > 0 => cfg.with_operation(cfg.operation().next()),
            ConfigField::Operation => cfg.with_operation(cfg.operation().prev()),
            ConfigField::Digits => cfg.adjust_digits(step),
            ConfigField::Questions => cfg.adjust_questions(step),
            ConfigField::TimeLimit => cfg.adjust_time_limit(step * TIME_STEP_SECS),
        };
        self.controller.set_config(cfg);
    }

    fn on_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Continue;
        }
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return KeyOutcome::Quit;
        }

        match self.controller.phase() {
            PhaseKind::Configuring => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.field = self.field.offset(-1),
                KeyCode::Down | KeyCode::Char('j') => self.field = self.field.offset(1),
                KeyCode::Left | KeyCode::Char('h') => self.adjust_field(-1),
                KeyCode::Right | KeyCode::Char('l') => self.adjust_field(1),
                KeyCode::Enter | KeyCode::Char('s') => self.start(),
                KeyCode::Char('z') => self.cycle_scale(),
                _ => {}
            },
            PhaseKind::Running => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    if let Some(pad_key) = PadKey::from_char(c) {
                        answer_pad::apply_key(&mut self.controller, &mut self.pad, pad_key);
                    }
                }
                KeyCode::Backspace => {
                    answer_pad::apply_key(&mut self.controller, &mut self.pad, PadKey::Backspace)
                }
                KeyCode::Delete => {
                    answer_pad::apply_key(&mut self.controller, &mut self.pad, PadKey::Clear)
                }
                KeyCode::Enter => answer_pad::submit(&mut self.controller, &mut self.pad),
                KeyCode::Left => {
                    if let Some(prev) = self.controller.current_index().checked_sub(1) {
                        answer_pad::navigate(&mut self.controller, &mut self.pad, prev);
                    }
                }
                KeyCode::Right => {
                    let next = self.controller.current_index() + 1;
                    answer_pad::navigate(&mut self.controller, &mut self.pad, next);
                }
                KeyCode::Char('f') => self.controller.finish_manually(),
                KeyCode::Char('z') => self.cycle_scale(),
                _ => {}
            },
            PhaseKind::Finished => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.reset(),
                KeyCode::Char('n') => self.start(),
                KeyCode::Char('z') => self.cycle_scale(),
                _ => {}
            },
        }
        KeyOutcome::Continue
    }

    fn on_event(&mut self, event: DrillEvent) -> KeyOutcome {
        match event {
            DrillEvent::Key(key) => return self.on_key(key),
            DrillEvent::Countdown(generation) => self.controller.on_countdown(generation),
            DrillEvent::Tick | DrillEvent::Resize => {}
        }
        KeyOutcome::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match cli.to_test_config() {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    // the drill still runs without a log file
    if let Err(e) = logging::init(&log_path) {
        eprintln!("logging disabled, cannot open {}: {e}", log_path.display());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let countdown = ThreadCountdown::new(events.sender());
    let controller = SessionController::new(config, Box::new(SystemClock), Box::new(countdown));
    let mut app = App::new(controller, Box::new(FilePreferenceStore::new()));
    let runner = Runner::new(events, FixedTicker::default());

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        if app.on_event(runner.step()) == KeyOutcome::Quit {
            break;
        }
    }

    Ok(())
}
