mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
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
    io::{self, stdin, BufRead, Write},
    path::PathBuf,
    time::Duration,
};

use vocquiz::{
    api::{QuizApi, User},
    app_dirs::AppDirs,
    auth::{self, SessionStore},
    config::{Config, ConfigStore, FileConfigStore},
    mistakes::MistakeLog,
    practice::PracticeDeck,
    quiz::{QuestionSource, QuizMode, QuizSession},
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, QuizEventSource, Runner, Ticker},
    stats::StatsTracker,
};

const TICK_RATE_MS: u64 = 100;
/// Ticks before a correct-answer banner closes itself (~700ms).
const FEEDBACK_TICKS: u8 = 7;
pub const COUNT_PRESETS: [usize; 4] = [10, 20, 30, 50];

/// terminal vocabulary quiz with mistake tracking and progress analytics
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal vocabulary quiz client: pick a difficulty level, answer multiple-choice translation questions from a remote backend, and review your mistakes and per-level statistics locally."
)]
pub struct Cli {
    /// difficulty level to jump straight into (e.g. LEVEL1); with --practice,
    /// restricts the deck to that level's mistakes
    #[clap(short = 'l', long)]
    level: Option<String>,

    /// quiz mode to start with, skipping the mode screen
    #[clap(short = 'm', long, value_enum)]
    mode: Option<ModeArg>,

    /// number of questions for fixed mode
    #[clap(short = 'c', long)]
    count: Option<usize>,

    /// quiz your personal vocabulary library instead of a level (requires login)
    #[clap(long, conflicts_with = "practice")]
    library: bool,

    /// practice offline from your logged mistakes, no backend needed
    #[clap(long)]
    practice: bool,

    /// log in before starting (prompts for credentials)
    #[clap(long)]
    login: bool,

    /// log out and exit
    #[clap(long, conflicts_with = "login")]
    logout: bool,

    /// override the backend base url for this run
    #[clap(long)]
    api_url: Option<String>,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum ModeArg {
    Endless,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Levels,
    Mode,
    CountPick,
    Quiz,
    Results,
    Mistakes,
    Stats,
}

/// Feedback banner shown after an answer; correct answers close themselves,
/// wrong ones wait for a key so the translation can be read.
#[derive(Debug, Clone)]
pub struct Feedback {
    pub correct: bool,
    pub message: String,
    pub ticks_left: Option<u8>,
}

pub struct App {
    pub config: Config,
    pub config_store: FileConfigStore,
    pub api: QuizApi,
    pub user: Option<User>,
    pub stats: StatsTracker,
    pub mistakes: MistakeLog,
    pub levels: Vec<String>,
    pub source: QuestionSource,
    pub deck: Option<PracticeDeck>,
    pub session: Option<QuizSession>,
    pub feedback: Option<Feedback>,
    pub screen: Screen,
    pub level_cursor: usize,
    pub mistake_filter: Option<String>,
    pub mistakes_scroll: usize,
    pub status: Option<String>,
    pub log_path: Option<PathBuf>,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        config_store: FileConfigStore,
        api: QuizApi,
        user: Option<User>,
        stats: StatsTracker,
        mistakes: MistakeLog,
        levels: Vec<String>,
        source: QuestionSource,
        deck: Option<PracticeDeck>,
    ) -> Self {
        let screen = if source == QuestionSource::Level {
            Screen::Levels
        } else {
            Screen::Mode
        };
        let level_cursor = config
            .default_level
            .as_ref()
            .and_then(|wanted| levels.iter().position(|l| l == wanted))
            .unwrap_or(0);
        Self {
            config,
            config_store,
            api,
            user,
            stats,
            mistakes,
            levels,
            source,
            deck,
            session: None,
            feedback: None,
            screen,
            level_cursor,
            mistake_filter: None,
            mistakes_scroll: 0,
            status: None,
            log_path: AppDirs::session_log_path(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }

    let mut api = QuizApi::new(config.api_base_url.clone(), config.request_timeout_secs)?;
    let session_store = SessionStore::new();

    if cli.logout {
        if let Some(stored) = session_store.load() {
            api.set_token(Some(stored.session_token));
        }
        auth::logout(&mut api, &session_store)?;
        println!("Logged out.");
        return Ok(());
    }

    let mut user = auth::restore(&mut api, &session_store);
    if cli.login {
        let (username, password) = prompt_credentials()?;
        match auth::login(&mut api, &session_store, &username, &password) {
            Ok(u) => {
                println!("Logged in as {}.", u.username);
                user = Some(u);
            }
            Err(e) => {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::Io, format!("login failed: {e}")).exit();
            }
        }
    }

    if cli.library && user.is_none() {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::InvalidValue,
            "--library needs a logged-in session; run with --login first",
        )
        .exit();
    }

    let stats = StatsTracker::open();
    let mistakes = MistakeLog::open();

    let source = if cli.practice {
        QuestionSource::Practice
    } else if cli.library {
        QuestionSource::Library
    } else {
        QuestionSource::Level
    };

    let mut deck = None;
    let mut levels = Vec::new();
    match source {
        QuestionSource::Practice => {
            deck = PracticeDeck::from_log(&mistakes, cli.level.as_deref());
            if deck.is_none() {
                let mut cmd = Cli::command();
                cmd.error(
                    ErrorKind::InvalidValue,
                    "not enough logged mistakes to practice from (need at least 4)",
                )
                .exit();
            }
        }
        QuestionSource::Library => {}
        QuestionSource::Level => {
            levels = match api.levels() {
                Ok(levels) if !levels.is_empty() => levels,
                Ok(_) => {
                    let mut cmd = Cli::command();
                    cmd.error(ErrorKind::Io, "the backend reports no levels").exit();
                }
                Err(e) => {
                    let mut cmd = Cli::command();
                    cmd.error(ErrorKind::Io, format!("could not fetch levels: {e}"))
                        .exit();
                }
            };
        }
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(
        config,
        config_store,
        api,
        user,
        stats,
        mistakes,
        levels,
        source,
        deck,
    );

    if source == QuestionSource::Level {
        if let Some(wanted) = &cli.level {
            match app.levels.iter().position(|l| l == wanted) {
                Some(idx) => {
                    app.level_cursor = idx;
                    app.screen = Screen::Mode;
                }
                None => {
                    let mut cmd = Cli::command();
                    cmd.error(
                        ErrorKind::InvalidValue,
                        format!("unknown level {wanted:?}; available: {}", app.levels.join(", ")),
                    )
                    .exit();
                }
            }
        }
    }

    if let Some(mode) = cli.mode {
        let mode = match mode {
            ModeArg::Endless => QuizMode::Endless,
            ModeArg::Fixed => QuizMode::Fixed(cli.count.unwrap_or(app.config.question_count)),
        };
        begin_session(&mut app, mode);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn prompt_credentials() -> io::Result<(String, String)> {
    let mut out = io::stdout();
    let mut username = String::new();
    write!(out, "username: ")?;
    out.flush()?;
    io::stdin().lock().read_line(&mut username)?;
    let mut password = String::new();
    write!(out, "password: ")?;
    out.flush()?;
    io::stdin().lock().read_line(&mut password)?;
    Ok((username.trim().to_string(), password.trim().to_string()))
}

fn run_app<B: Backend, E: QuizEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            QuizEvent::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(app, key) == Flow::Exit {
                    break;
                }
            }
            QuizEvent::Tick => on_tick(app),
            QuizEvent::Resize => {}
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Flow {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Flow::Exit;
    }

    match app.screen {
        Screen::Levels => match key.code {
            KeyCode::Char('q') => return Flow::Exit,
            KeyCode::Up | KeyCode::Char('k') => {
                if !app.levels.is_empty() {
                    app.level_cursor = app
                        .level_cursor
                        .checked_sub(1)
                        .unwrap_or(app.levels.len() - 1);
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !app.levels.is_empty() {
                    app.level_cursor = (app.level_cursor + 1) % app.levels.len();
                }
            }
            KeyCode::Enter => {
                if !app.levels.is_empty() {
                    app.screen = Screen::Mode;
                }
            }
            KeyCode::Char('m') => open_mistakes(app),
            KeyCode::Char('s') => app.screen = Screen::Stats,
            _ => {}
        },
        Screen::Mode => match key.code {
            KeyCode::Char('q') => return Flow::Exit,
            KeyCode::Char('e') => begin_session(app, QuizMode::Endless),
            KeyCode::Char('f') => app.screen = Screen::CountPick,
            KeyCode::Char('m') => open_mistakes(app),
            KeyCode::Char('s') => app.screen = Screen::Stats,
            KeyCode::Esc | KeyCode::Char('b') => {
                if app.source == QuestionSource::Level {
                    app.screen = Screen::Levels;
                }
            }
            _ => {}
        },
        Screen::CountPick => match key.code {
            KeyCode::Char('q') => return Flow::Exit,
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                begin_session(app, QuizMode::Fixed(COUNT_PRESETS[idx]));
            }
            KeyCode::Esc | KeyCode::Char('b') => app.screen = Screen::Mode,
            _ => {}
        },
        Screen::Quiz => {
            if app.feedback.is_some() {
                close_feedback(app);
            } else {
                match key.code {
                    KeyCode::Char(c @ '1'..='9') => {
                        submit_answer(app, c as usize - '1' as usize);
                    }
                    KeyCode::Char('r') => {
                        let awaiting = app
                            .session
                            .as_ref()
                            .is_some_and(|s| s.current().is_none());
                        if awaiting {
                            next_question(app);
                        }
                    }
                    KeyCode::Esc => end_session(app),
                    _ => {}
                }
            }
        }
        Screen::Results => match key.code {
            KeyCode::Char('q') => return Flow::Exit,
            KeyCode::Char('r') => restart_session(app),
            KeyCode::Char('m') => open_mistakes(app),
            KeyCode::Char('s') => app.screen = Screen::Stats,
            KeyCode::Esc | KeyCode::Char('b') => {
                app.session = None;
                app.screen = home_screen(app);
            }
            _ => {}
        },
        Screen::Mistakes => match key.code {
            KeyCode::Char('q') => return Flow::Exit,
            KeyCode::Char('f') => cycle_mistake_filter(app),
            KeyCode::Char('c') => {
                app.mistakes.clear();
                app.mistake_filter = None;
                app.mistakes_scroll = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.mistakes_scroll = app.mistakes_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let shown = app.mistakes.for_level(app.mistake_filter.as_deref()).len();
                app.mistakes_scroll = (app.mistakes_scroll + 1).min(shown.saturating_sub(1));
            }
            KeyCode::Esc | KeyCode::Char('b') => app.screen = return_screen(app),
            _ => {}
        },
        Screen::Stats => match key.code {
            KeyCode::Char('q') => return Flow::Exit,
            KeyCode::Char('m') => open_mistakes(app),
            KeyCode::Esc | KeyCode::Char('b') => app.screen = return_screen(app),
            _ => {}
        },
    }

    Flow::Continue
}

fn on_tick(app: &mut App) {
    let expired = match app.feedback.as_mut() {
        Some(feedback) => match feedback.ticks_left.as_mut() {
            Some(ticks) => {
                *ticks = ticks.saturating_sub(1);
                *ticks == 0
            }
            None => false,
        },
        None => false,
    };
    if expired {
        close_feedback(app);
    }
}

/// Where "back" from the review screens should land.
fn return_screen(app: &App) -> Screen {
    if app.session.is_some() {
        Screen::Results
    } else {
        home_screen(app)
    }
}

fn home_screen(app: &App) -> Screen {
    if app.source == QuestionSource::Level {
        Screen::Levels
    } else {
        Screen::Mode
    }
}

fn open_mistakes(app: &mut App) {
    app.mistakes_scroll = 0;
    app.screen = Screen::Mistakes;
}

fn begin_session(app: &mut App, mode: QuizMode) {
    let level = match app.source {
        QuestionSource::Level => match app.levels.get(app.level_cursor) {
            Some(level) => level.clone(),
            None => return,
        },
        QuestionSource::Library => "LIBRARY".to_string(),
        QuestionSource::Practice => "PRACTICE".to_string(),
    };

    if app.source == QuestionSource::Level {
        app.config.default_level = Some(level.clone());
        let _ = app.config_store.save(&app.config);
    }

    app.session = Some(QuizSession::new(level, mode, app.source));
    app.feedback = None;
    app.screen = Screen::Quiz;
    next_question(app);
}

fn restart_session(app: &mut App) {
    if let Some(old) = app.session.take() {
        app.session = Some(QuizSession::new(old.level, old.mode, old.source));
        app.feedback = None;
        app.screen = Screen::Quiz;
        next_question(app);
    }
}

fn next_question(app: &mut App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };

    let result = match app.source {
        QuestionSource::Practice => match &app.deck {
            Some(deck) => Ok(deck.draw(&mut rand::thread_rng())),
            None => return,
        },
        QuestionSource::Library => app.api.library_question(),
        QuestionSource::Level => app.api.question(&session.level),
    };

    match result {
        Ok(question) => {
            if let Some(session) = app.session.as_mut() {
                session.present(question);
            }
            app.status = None;
        }
        Err(e) => app.status = Some(e.to_string()),
    }
}

fn submit_answer(app: &mut App, idx: usize) {
    let Some(session) = app.session.as_mut() else {
        return;
    };
    let Some(question) = session.current() else {
        return;
    };
    if idx >= question.options.len() {
        return;
    }
    let word = question.word.clone();
    let selected = question.options[idx].clone();
    let elapsed = session.elapsed_secs();

    let verdict = match app.source {
        QuestionSource::Practice => match &app.deck {
            Some(deck) => deck.check(&word, &selected),
            None => return,
        },
        QuestionSource::Level => {
            match app.api.check_answer(&word, &selected, Some(&session.level)) {
                Ok(v) => v,
                Err(e) => {
                    app.status = Some(e.to_string());
                    return;
                }
            }
        }
        QuestionSource::Library => match app.api.check_answer(&word, &selected, None) {
            Ok(v) => v,
            Err(e) => {
                app.status = Some(e.to_string());
                return;
            }
        },
    };

    if let Err(e) = session.apply(&verdict, elapsed, &mut app.stats, &mut app.mistakes) {
        app.status = Some(e.to_string());
        return;
    }

    let warning = app
        .stats
        .persist_error()
        .or(app.mistakes.persist_error())
        .map(|e| format!("state not saved: {e}"));
    if let Some(w) = warning {
        app.status = Some(w);
    }

    app.feedback = Some(if verdict.correct {
        Feedback {
            correct: true,
            message: "You got it right.".to_string(),
            ticks_left: Some(FEEDBACK_TICKS),
        }
    } else {
        Feedback {
            correct: false,
            message: format!(
                "Correct translation for \"{word}\" is \"{}\".",
                verdict.correct_translation
            ),
            ticks_left: None,
        }
    });
}

fn close_feedback(app: &mut App) {
    app.feedback = None;

    let finished = app.session.as_ref().is_some_and(|s| s.has_finished());
    if finished {
        if let (Some(session), Some(path)) = (&app.session, &app.log_path) {
            if let Err(e) = session.append_log(path) {
                app.status = Some(format!("could not write session log: {e}"));
            }
        }
        app.screen = Screen::Results;
    } else {
        next_question(app);
    }
}

/// Abandon the running session from the quiz screen. Partially played
/// sessions still get a log row.
fn end_session(app: &mut App) {
    if let Some(session) = app.session.take() {
        if session.total > 0 {
            if let Some(path) = &app.log_path {
                if let Err(e) = session.append_log(path) {
                    app.status = Some(format!("could not write session log: {e}"));
                }
            }
        }
    }
    app.feedback = None;
    app.screen = home_screen(app);
}

/// Cycle the mistakes filter: all levels, then each level present in the
/// log, then back to all.
fn cycle_mistake_filter(app: &mut App) {
    let levels: Vec<String> = app.mistakes.levels().iter().map(|s| s.to_string()).collect();
    app.mistake_filter = match &app.mistake_filter {
        None => levels.first().cloned(),
        Some(current) => match levels.iter().position(|l| l == current) {
            Some(i) if i + 1 < levels.len() => Some(levels[i + 1].clone()),
            _ => None,
        },
    };
    app.mistakes_scroll = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vocquiz::storage::MemoryStore;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn seeded_mistakes(pairs: &[(&str, &str, &str)]) -> MistakeLog {
        let mut log = MistakeLog::with_store(Box::new(MemoryStore::new()));
        for (word, translation, level) in pairs {
            log.add(word, translation, level).unwrap();
        }
        log
    }

    fn test_app(source: QuestionSource, levels: Vec<String>, mistakes: MistakeLog) -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let deck = if source == QuestionSource::Practice {
            PracticeDeck::from_log(&mistakes, None)
        } else {
            None
        };
        let mut app = App::new(
            Config::default(),
            FileConfigStore::with_path(dir.path().join("config.json")),
            // Port 9 (discard) so accidental network calls fail fast
            QuizApi::new("http://127.0.0.1:9", 1).unwrap(),
            None,
            StatsTracker::with_store(Box::new(MemoryStore::new())),
            mistakes,
            levels,
            source,
            deck,
        );
        app.log_path = Some(dir.path().join("sessions.csv"));
        (app, dir)
    }

    fn practice_app() -> (App, TempDir) {
        let mistakes = seeded_mistakes(&[
            ("cat", "貓", "LEVEL1"),
            ("dog", "狗", "LEVEL1"),
            ("bird", "鳥", "LEVEL2"),
            ("fish", "魚", "LEVEL2"),
        ]);
        test_app(QuestionSource::Practice, Vec::new(), mistakes)
    }

    fn answer_current(app: &mut App, correctly: bool) {
        let question = app.session.as_ref().unwrap().current().unwrap().clone();
        let deck = app.deck.as_ref().unwrap();
        let idx = question
            .options
            .iter()
            .position(|opt| deck.check(&question.word, opt).correct == correctly)
            .unwrap();
        submit_answer(app, idx);
    }

    #[test]
    fn level_cursor_wraps_both_ways() {
        let (mut app, _dir) = test_app(
            QuestionSource::Level,
            vec!["LEVEL1".into(), "LEVEL2".into(), "LEVEL3".into()],
            seeded_mistakes(&[]),
        );

        assert_eq!(app.level_cursor, 0);
        handle_key(&mut app, key(KeyCode::Up));
        assert_eq!(app.level_cursor, 2);
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(app.level_cursor, 1);
    }

    #[test]
    fn enter_on_level_opens_mode_screen() {
        let (mut app, _dir) = test_app(
            QuestionSource::Level,
            vec!["LEVEL1".into()],
            seeded_mistakes(&[]),
        );

        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Mode);
    }

    #[test]
    fn practice_session_answers_offline() {
        let (mut app, _dir) = practice_app();

        begin_session(&mut app, QuizMode::Endless);
        assert_eq!(app.screen, Screen::Quiz);
        assert!(app.session.as_ref().unwrap().current().is_some());

        answer_current(&mut app, true);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.score, 1);
        assert_eq!(session.total, 1);
        assert!(app.feedback.as_ref().unwrap().correct);
    }

    #[test]
    fn wrong_practice_answer_shows_persistent_feedback_and_logs_miss() {
        let (mut app, _dir) = practice_app();
        let before = app.mistakes.entries().to_vec();

        begin_session(&mut app, QuizMode::Endless);
        answer_current(&mut app, false);

        let feedback = app.feedback.as_ref().unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.ticks_left, None);
        // The missed pair already existed in the deck, so its counter grew
        let total_misses: u32 = app.mistakes.entries().iter().map(|e| e.miss_count).sum();
        let before_misses: u32 = before.iter().map(|e| e.miss_count).sum();
        assert_eq!(total_misses, before_misses + 1);
    }

    #[test]
    fn correct_feedback_auto_closes_and_fetches_next() {
        let (mut app, _dir) = practice_app();

        begin_session(&mut app, QuizMode::Endless);
        answer_current(&mut app, true);
        assert!(app.feedback.is_some());

        for _ in 0..FEEDBACK_TICKS {
            on_tick(&mut app);
        }

        assert!(app.feedback.is_none());
        assert!(app.session.as_ref().unwrap().current().is_some());
        assert_eq!(app.screen, Screen::Quiz);
    }

    #[test]
    fn fixed_practice_session_reaches_results_and_writes_log() {
        let (mut app, dir) = practice_app();

        begin_session(&mut app, QuizMode::Fixed(2));
        for _ in 0..2 {
            answer_current(&mut app, true);
            close_feedback(&mut app);
        }

        assert_eq!(app.screen, Screen::Results);
        let log = std::fs::read_to_string(dir.path().join("sessions.csv")).unwrap();
        assert!(log.contains("fixed-2"));
        assert!(log.contains("practice"));
    }

    #[test]
    fn esc_abandons_session_and_logs_partial_run() {
        let (mut app, dir) = practice_app();

        begin_session(&mut app, QuizMode::Endless);
        answer_current(&mut app, true);
        close_feedback(&mut app);
        handle_key(&mut app, key(KeyCode::Esc));

        assert!(app.session.is_none());
        assert_eq!(app.screen, Screen::Mode);
        assert!(dir.path().join("sessions.csv").exists());
    }

    #[test]
    fn practice_stats_are_recorded_under_the_practice_level() {
        let (mut app, _dir) = practice_app();

        begin_session(&mut app, QuizMode::Endless);
        answer_current(&mut app, true);

        assert_eq!(app.stats.attempted("PRACTICE"), 1);
        assert_eq!(app.stats.correction_rate("PRACTICE"), 100.0);
    }

    #[test]
    fn mistake_filter_cycles_through_levels_and_back() {
        let mistakes = seeded_mistakes(&[
            ("cat", "貓", "LEVEL1"),
            ("dog", "狗", "LEVEL2"),
        ]);
        let (mut app, _dir) = test_app(QuestionSource::Level, vec!["LEVEL1".into()], mistakes);

        assert_eq!(app.mistake_filter, None);
        cycle_mistake_filter(&mut app);
        assert_eq!(app.mistake_filter.as_deref(), Some("LEVEL1"));
        cycle_mistake_filter(&mut app);
        assert_eq!(app.mistake_filter.as_deref(), Some("LEVEL2"));
        cycle_mistake_filter(&mut app);
        assert_eq!(app.mistake_filter, None);
    }

    #[test]
    fn clearing_mistakes_from_review_screen_empties_log() {
        let mistakes = seeded_mistakes(&[("cat", "貓", "LEVEL1")]);
        let (mut app, _dir) = test_app(QuestionSource::Level, vec!["LEVEL1".into()], mistakes);

        app.screen = Screen::Mistakes;
        handle_key(&mut app, key(KeyCode::Char('c')));

        assert!(app.mistakes.is_empty());
        assert_eq!(app.mistake_filter, None);
    }

    #[test]
    fn remembered_level_preselects_cursor() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            default_level: Some("LEVEL2".into()),
            ..Config::default()
        };
        let app = App::new(
            config,
            FileConfigStore::with_path(dir.path().join("config.json")),
            QuizApi::new("http://127.0.0.1:9", 1).unwrap(),
            None,
            StatsTracker::with_store(Box::new(MemoryStore::new())),
            MistakeLog::with_store(Box::new(MemoryStore::new())),
            vec!["LEVEL1".into(), "LEVEL2".into()],
            QuestionSource::Level,
            None,
        );
        assert_eq!(app.level_cursor, 1);
    }

    #[test]
    fn beginning_a_level_session_remembers_the_level() {
        let dir = TempDir::new().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let (mut app, _dir2) = test_app(
            QuestionSource::Level,
            vec!["LEVEL1".into(), "LEVEL2".into()],
            seeded_mistakes(&[]),
        );
        app.config_store = store.clone();
        app.level_cursor = 1;

        // The question fetch fails (no backend), but the choice still sticks
        begin_session(&mut app, QuizMode::Endless);

        assert_eq!(app.config.default_level.as_deref(), Some("LEVEL2"));
        assert_eq!(store.load().default_level.as_deref(), Some("LEVEL2"));
    }
}
