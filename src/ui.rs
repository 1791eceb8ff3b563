use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
    Frame,
};

use vocquiz::quiz::{QuestionSource, QuizMode};

use crate::{App, Screen, COUNT_PRESETS};

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(2),
            ])
            .split(area);

        render_header(self, chunks[0], buf);
        match self.screen {
            Screen::Levels => render_levels(self, chunks[1], buf),
            Screen::Mode => render_mode(self, chunks[1], buf),
            Screen::CountPick => render_count_pick(chunks[1], buf),
            Screen::Quiz => render_quiz(self, chunks[1], buf),
            Screen::Results => render_results(self, chunks[1], buf),
            Screen::Mistakes => render_mistakes(self, chunks[1], buf),
            Screen::Stats => render_stats(self, chunks[1], buf),
        }
        render_footer(self, chunks[2], buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let mut spans = vec![Span::styled("vocquiz", bold().fg(Color::Magenta))];
    match app.source {
        QuestionSource::Library => spans.push(Span::styled("  ·  library quiz", dim())),
        QuestionSource::Practice => spans.push(Span::styled("  ·  mistake practice", dim())),
        QuestionSource::Level => {}
    }
    if let Some(user) = &app.user {
        spans.push(Span::styled(
            format!("  ·  logged in as {}", user.username),
            dim(),
        ));
    }
    Paragraph::new(Line::from(spans)).render(area, buf);
}

fn render_footer(app: &App, area: Rect, buf: &mut Buffer) {
    let hints = match app.screen {
        Screen::Levels => "↑/↓ select · enter choose · (m)istakes · (s)tats · (q)uit",
        Screen::Mode => "(e)ndless · (f)ixed count · (m)istakes · (s)tats · esc back · (q)uit",
        Screen::CountPick => "1-4 pick a count · esc back",
        Screen::Quiz => {
            if app.feedback.is_some() {
                "press any key to continue"
            } else {
                "1-4 answer · esc end session"
            }
        }
        Screen::Results => "(r)estart · (m)istakes · (s)tats · esc menu · (q)uit",
        Screen::Mistakes => "(f)ilter level · (c)lear all · ↑/↓ scroll · esc back",
        Screen::Stats => "(m)istakes · esc back · (q)uit",
    };

    let mut lines = vec![Line::from(Span::styled(hints, dim()))];
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_levels(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled("Select a level", bold())),
        Line::default(),
    ];

    if app.levels.is_empty() {
        lines.push(Line::from(Span::styled("No levels available", dim())));
    }

    for (i, level) in app.levels.iter().enumerate() {
        let (marker, style) = if i == app.level_cursor {
            ("> ", bold().fg(Color::Magenta))
        } else {
            ("  ", Style::default())
        };
        lines.push(Line::from(Span::styled(format!("{marker}{level}"), style)));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_mode(app: &App, area: Rect, buf: &mut Buffer) {
    let subject = match app.source {
        QuestionSource::Level => app
            .levels
            .get(app.level_cursor)
            .cloned()
            .unwrap_or_default(),
        QuestionSource::Library => "your vocabulary library".to_string(),
        QuestionSource::Practice => "your logged mistakes".to_string(),
    };

    let lines = vec![
        Line::from(Span::styled(format!("Mode — {subject}"), bold())),
        Line::default(),
        Line::from("  [e] endless — keep answering until you stop"),
        Line::from("  [f] fixed — a set number of questions"),
    ];

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_count_pick(area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled("How many questions?", bold())),
        Line::default(),
    ];
    for (i, count) in COUNT_PRESETS.iter().enumerate() {
        lines.push(Line::from(format!("  [{}] {count} questions", i + 1)));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_quiz(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = &app.session else {
        return;
    };

    let progress = match session.mode {
        QuizMode::Fixed(n) => format!(
            "{} — question {}/{} — score {}/{}",
            session.level,
            (session.total + 1).min(n),
            n,
            session.score,
            session.total
        ),
        QuizMode::Endless => format!(
            "{} — endless — score {}/{}",
            session.level, session.score, session.total
        ),
    };

    let mut lines = vec![Line::from(Span::styled(progress, dim())), Line::default()];

    if let Some(feedback) = &app.feedback {
        let (title, color) = if feedback.correct {
            ("Correct!", Color::Green)
        } else {
            ("Incorrect", Color::Red)
        };
        lines.push(Line::from(Span::styled(title, bold().fg(color))));
        lines.push(Line::default());
        lines.push(Line::from(feedback.message.clone()));
    } else if let Some(question) = session.current() {
        lines.push(Line::from(Span::styled(
            question.word.clone(),
            bold().add_modifier(Modifier::UNDERLINED),
        )));
        lines.push(Line::default());
        for (i, option) in question.options.iter().enumerate() {
            lines.push(Line::from(format!("  {}) {option}", i + 1)));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "No question loaded — press r to retry",
            Style::default().fg(Color::Yellow),
        )));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = &app.session else {
        return;
    };

    let lines = vec![
        Line::from(Span::styled("Session complete", bold())),
        Line::default(),
        Line::from(format!(
            "Score: {}/{} ({:.1}%)",
            session.score,
            session.total,
            session.accuracy()
        )),
        Line::from(format!(
            "Average time per question: {:.2}s",
            session.average_time_secs()
        )),
    ];

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_mistakes(app: &App, area: Rect, buf: &mut Buffer) {
    let entries = app.mistakes.for_level(app.mistake_filter.as_deref());

    let title = match &app.mistake_filter {
        Some(level) => format!(" Mistakes — {level} "),
        None => " Mistakes — all levels ".to_string(),
    };

    if entries.is_empty() {
        let message = if app.mistakes.is_empty() {
            "No mistakes recorded yet — words you miss will show up here."
        } else {
            "No mistakes for this level."
        };
        Paragraph::new(Line::from(Span::styled(message, dim())))
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    }

    let rows = entries.iter().skip(app.mistakes_scroll).map(|e| {
        Row::new(vec![
            Cell::from(e.word.clone()),
            Cell::from(e.translation.clone()),
            Cell::from(e.level.clone()),
            Cell::from(e.miss_count.to_string()),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(Row::new(["Word", "Translation", "Level", "Misses"]).style(bold()))
    .block(Block::default().borders(Borders::ALL).title(title))
    .render(area, buf);
}

fn render_stats(app: &App, area: Rect, buf: &mut Buffer) {
    if app.stats.is_empty() {
        Paragraph::new(Line::from(Span::styled(
            "No answers recorded yet — play a quiz to build up statistics.",
            dim(),
        )))
        .block(Block::default().borders(Borders::ALL).title(" Statistics "))
        .alignment(Alignment::Center)
        .render(area, buf);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(area);

    let rows = app.stats.levels().map(|(level, stats)| {
        let rate = app.stats.correction_rate(level);
        let rate_color = if rate >= 80.0 {
            Color::Green
        } else if rate >= 60.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        Row::new(vec![
            Cell::from(level.to_string()).style(bold()),
            Cell::from(stats.attempted.to_string()),
            Cell::from(format!("{rate:.1}%")).style(Style::default().fg(rate_color)),
            Cell::from(format!("{:.2}s", app.stats.average_time(level))),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(Row::new(["Level", "Answers", "Correct", "Avg time"]).style(bold()))
    .block(Block::default().borders(Borders::ALL).title(" Statistics "))
    .render(chunks[0], buf);

    let total_answers: u64 = app.stats.levels().map(|(_, s)| s.attempted).sum();
    Paragraph::new(Line::from(Span::styled(
        format!(
            "{} answers overall · global average {:.2}s per question",
            total_answers,
            app.stats.global_average_time()
        ),
        dim(),
    )))
    .render(chunks[1], buf);
}
