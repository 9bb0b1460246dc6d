mod app;
mod event;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use kanadrill::config::Config;
use kanadrill::dataset::{BundledDatasets, DatasetProvider};
use kanadrill::error::QuizError;
use kanadrill::session::controller::QuizMode;
use kanadrill::store::json_store::JsonStore;

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::answer_input::InputResult;
use ui::components::game_intel::{GameIntel, format_clock, group_names};
use ui::components::group_select::GroupSelect;
use ui::components::menu::MenuAction;
use ui::components::quiz_area::QuizArea;
use ui::components::stats_dashboard::{self, StatsDashboard};
use ui::layout::{AppLayout, pack_hint_lines};

const LOG_FILE: &str = "kanadrill.log";

#[derive(Parser)]
#[command(name = "kanadrill", version, about = "Kana and vocabulary flashcards in the terminal")]
struct Cli {
    #[arg(short, long, help = "Start a quiz right away (input, pick, reverse-pick)")]
    mode: Option<String>,

    #[arg(short, long, value_delimiter = ',', help = "Comma-separated group ids to drill")]
    groups: Option<Vec<String>>,

    #[arg(short, long, help = "Number of wrong options in pick mode (1-5)")]
    distractors: Option<usize>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "List available groups and exit")]
    list_groups: bool,
}

fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("KANADRILL_LOG").unwrap_or_else(|_| "kanadrill=info".into()),
        )
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()?;
    Ok(())
}

fn load_datasets(config: &Config) -> Result<BundledDatasets> {
    match BundledDatasets::load(config.dataset_path().as_deref()) {
        Ok(datasets) => Ok(datasets),
        Err(err) => {
            tracing::warn!(%err, "user datasets failed to load, using bundled only");
            Ok(BundledDatasets::load(None)?)
        }
    }
}

fn apply_cli(cli: &Cli, config: &mut Config, datasets: &BundledDatasets) -> Result<Option<QuizMode>> {
    let mode = match cli.mode.as_deref() {
        Some(name) => match QuizMode::from_name(name) {
            Some(mode) => {
                config.mode = mode.as_str().to_string();
                Some(mode)
            }
            None => bail!("unknown mode '{name}' (expected input, pick or reverse-pick)"),
        },
        None => None,
    };

    if let Some(ref groups) = cli.groups {
        let known = datasets.group_ids();
        if let Some(unknown) = groups.iter().find(|g| !known.contains(&g.as_str())) {
            return Err(QuizError::UnknownGroup(unknown.clone()).into());
        }
        config.groups = groups.clone();
    }
    if let Some(distractors) = cli.distractors {
        config.distractor_count = distractors;
    }
    if let Some(ref theme) = cli.theme {
        config.theme = theme.clone();
    }
    Ok(mode)
}

fn print_groups(datasets: &BundledDatasets) -> Result<()> {
    for group in datasets.groups() {
        let size = datasets.pool(std::slice::from_ref(&group.id))?.len();
        println!("{:<16} {:>3} items  {}", group.id, size, group.label);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = JsonStore::new().ok();
    let data_dir = store
        .as_ref()
        .map(|s| s.base_dir().to_path_buf())
        .unwrap_or_else(JsonStore::default_dir);
    if let Err(err) = init_logging(&data_dir) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(%err, "config unreadable, using defaults");
        Config::default()
    });
    let datasets = load_datasets(&config)?;

    if cli.list_groups {
        return print_groups(&datasets);
    }

    let start_mode = apply_cli(&cli, &mut config, &datasets)?;
    config.validate(&datasets.group_ids());

    let mut app = App::new(config, datasets, store);
    if let Some(mode) = start_mode {
        app.start_quiz(mode);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    if app.session.is_some() {
        app.finish_quiz();
    } else {
        app.save_data();
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(%err, "terminal loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::FocusLost => app.set_focus(false),
            AppEvent::FocusGained => app.set_focus(true),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Stats => handle_stats_key(app, key),
        AppScreen::Groups => handle_groups_key(app, key),
    }
}

fn run_menu_action(app: &mut App, action: MenuAction) {
    match action {
        MenuAction::InputQuiz => app.start_quiz(QuizMode::Input),
        MenuAction::PickQuiz => app.start_quiz(QuizMode::Pick),
        MenuAction::ReversePickQuiz => app.start_quiz(QuizMode::ReversePick),
        MenuAction::Groups => app.go_to_groups(),
        MenuAction::Stats => app.go_to_stats(),
        MenuAction::Quit => app.should_quit = true,
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => run_menu_action(app, MenuAction::InputQuiz),
        KeyCode::Char('2') => run_menu_action(app, MenuAction::PickQuiz),
        KeyCode::Char('3') => run_menu_action(app, MenuAction::ReversePickQuiz),
        KeyCode::Char('g') => run_menu_action(app, MenuAction::Groups),
        KeyCode::Char('s') => run_menu_action(app, MenuAction::Stats),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(action) = app.menu.selected_action() {
                run_menu_action(app, action);
            }
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::F(2) {
        app.go_to_stats();
        return;
    }
    let Some(mode) = app.session.as_ref().map(|s| s.mode()) else {
        app.go_to_menu();
        return;
    };

    match mode {
        QuizMode::Input => match app.answer.handle(key) {
            InputResult::Submit => app.submit_answer(),
            InputResult::Skip => app.skip_prompt(),
            InputResult::Cancel => app.go_to_menu(),
            InputResult::Continue => {}
        },
        QuizMode::Pick | QuizMode::ReversePick => match key.code {
            KeyCode::Esc => app.go_to_menu(),
            KeyCode::Char(' ') | KeyCode::Tab => app.skip_prompt(),
            KeyCode::Char(ch) => {
                if let Some(digit) = ch.to_digit(10)
                    && digit > 0
                {
                    app.select_option(digit as usize - 1);
                }
            }
            _ => {}
        },
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::F(2) => app.leave_stats(),
        KeyCode::Char('1') => {
            app.stats_tab = 0;
            app.stats_scroll = 0;
        }
        KeyCode::Char('2') => {
            app.stats_tab = 1;
            app.stats_scroll = 0;
        }
        KeyCode::Tab => {
            app.stats_tab = (app.stats_tab + 1) % stats_dashboard::TAB_COUNT;
            app.stats_scroll = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => app.stats_scroll += 1,
        KeyCode::Char('k') | KeyCode::Up => {
            app.stats_scroll = app.stats_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_groups_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.group_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.group_next(),
        KeyCode::Char(' ') => app.toggle_selected_group(),
        KeyCode::Enter => {
            app.confirm_groups();
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::Stats => render_stats(frame, app),
        AppScreen::Groups => render_groups(frame, app),
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let stats = app.stats.borrow();
    let header_info = format!(
        " {} correct | {} sessions | {}",
        stats.total_correct,
        app.session_history.sessions.len(),
        group_names(&app.config.groups),
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " kanadrill ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            &*header_info,
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout[0]);

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let footer = match app.status_message {
        Some(ref msg) => Span::styled(format!(" {msg}"), Style::default().fg(colors.error())),
        None => Span::styled(
            " [1-3] Start  [g] Groups  [s] Stats  [q] Quit ",
            Style::default().fg(colors.text_pending()),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(footer)), layout[2]);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let Some(ref session) = app.session else {
        return;
    };
    let app_layout = AppLayout::new(area);

    let header_text = if app_layout.tier.show_sidebar() {
        format!(" {} quiz ", session.mode().label())
    } else {
        format!(
            " {} | Score {} | Streak {} | {} ",
            session.mode().label(),
            session.score(),
            session.streak(),
            format_clock(app.session_elapsed_secs()),
        )
    };
    let header = Paragraph::new(Line::from(Span::styled(
        header_text,
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, app_layout.header);

    frame.render_widget(QuizArea::new(session, &app.answer, app.theme), app_layout.main);

    if let Some(sidebar) = app_layout.sidebar {
        let intel = GameIntel::new(
            session,
            &app.config.groups,
            app.session_elapsed_secs(),
            app.theme,
        );
        frame.render_widget(intel, sidebar);
    }

    let hints: &[&str] = match session.mode() {
        QuizMode::Input => &["[Enter] Submit", "[Tab or /] Skip", "[F2] Stats", "[Esc] End quiz"],
        QuizMode::Pick | QuizMode::ReversePick => {
            &["[1-9] Pick", "[Space/Tab] Skip", "[F2] Stats", "[Esc] End quiz"]
        }
    };
    let lines: Vec<Line> = pack_hint_lines(hints, app_layout.footer.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_pending()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), app_layout.footer);
}

fn render_stats(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let stats = app.stats.borrow();
    let dashboard = StatsDashboard::new(
        &stats,
        &app.session_history.sessions,
        app.session.as_ref().map(|s| s.tracker()),
        app.stats_tab,
        app.stats_scroll,
        app.theme,
    );
    frame.render_widget(dashboard, area);
}

fn render_groups(frame: &mut ratatui::Frame, app: &App) {
    let area = ui::layout::centered_rect(60, 80, frame.area());
    let select = GroupSelect::new(
        app.datasets.groups(),
        &app.pending_groups,
        app.group_selected,
        app.status_message.as_deref(),
        app.theme,
    );
    frame.render_widget(select, area);
}
