pub mod charting;
pub mod screen;

use itertools::Itertools;
use mathdrill::{
    config::DisplayScale,
    scoring::{AnswerStatus, Review},
    session::AttemptResult,
    util::format_secs,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{App, ConfigField};

const VERTICAL_MARGIN: u16 = 1;
/// Share of the terminal width used at normal scale.
const BASE_WIDTH_SHARE: f64 = 0.6;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.controller.phase()).render(app, f);
}

/// Centre column whose width grows with the display scale.
fn scaled_area(area: Rect, scale: DisplayScale) -> Rect {
    let share = (BASE_WIDTH_SHARE * scale.factor()).min(1.0);
    let width = ((area.width as f64) * share).round() as u16;
    let width = width.max(area.width.min(40));
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

fn legend(keys: &[&str]) -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        keys.iter().join(" / "),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
}

pub fn render_config(app: &App, f: &mut Frame) {
    let area = scaled_area(f.area(), app.scale);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    let title = Paragraph::new(Span::styled("Maths Drill", bold.fg(Color::Cyan)))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let cfg = app.controller.config();
    let lines: Vec<Line> = ConfigField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                ConfigField::Operation => cfg.operation().to_string(),
                ConfigField::Digits => format!("{}-digit", cfg.digit_count()),
                ConfigField::Questions => cfg.question_count().to_string(),
                ConfigField::TimeLimit => cfg.time_limit_secs().to_string(),
            };
            let selected = *field == app.field;
            let style = if selected {
                bold.fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(if selected { "› " } else { "  " }, style),
                Span::styled(format!("{:<22}", field.label()), style),
                Span::styled(format!("‹ {value} ›"), style),
            ])
        })
        .collect();

    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Settings"));
    f.render_widget(form, chunks[1]);

    let size = format!("(z) size: {}", app.scale);
    f.render_widget(
        legend(&["(↑/↓) select", "(←/→) change", "(enter) start", size.as_str(), "(esc)ape"]),
        chunks[3],
    );
}

pub fn render_running(app: &App, f: &mut Frame) {
    let controller = &app.controller;
    let area = scaled_area(f.area(), app.scale);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let notice_lines = if app.notice.is_some() { 2 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(notice_lines),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(2),
        ])
        .split(area);

    let remaining = controller.seconds_remaining();
    let timer_style = if remaining <= 10 {
        bold.fg(Color::Red)
    } else {
        bold
    };
    f.render_widget(
        Paragraph::new(Span::styled(format!("Time: {remaining}s"), timer_style))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let total = controller.questions().len().max(1);
    let position = controller.current_index() + 1;
    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Blue))
        .ratio((position as f64 / total as f64).min(1.0))
        .label(format!("Question {position} of {total}"));
    f.render_widget(progress, chunks[1]);

    if let Some(notice) = &app.notice {
        f.render_widget(
            Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Yellow)))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[2],
        );
    }

    let prompt = controller
        .current_question()
        .map(|q| format!("{} = ", q.expression))
        .unwrap_or_default();
    let input = controller.input_buffer();
    let input_style = if app.pad.replaces_next() {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        bold.fg(Color::Green)
    };

    let question_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(chunks[3]);

    let box_width = (prompt.width() + input.width().max(6) + 4) as u16;
    let box_area = Rect {
        x: question_chunks[1].x + question_chunks[1].width.saturating_sub(box_width) / 2,
        width: box_width.min(question_chunks[1].width),
        ..question_chunks[1]
    };
    let question = Paragraph::new(Line::from(vec![
        Span::styled(prompt, bold),
        Span::styled(input.to_string(), input_style),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(question, box_area);

    let answers = controller.answers();
    let markers: Vec<Span> = answers
        .iter()
        .enumerate()
        .map(|(idx, answer)| {
            let mut style = if answer.trim().is_empty() {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default().fg(Color::Green)
            };
            if idx == controller.current_index() {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            Span::styled(format!(" {} ", idx + 1), style)
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(markers))
            .block(Block::default().borders(Borders::TOP).title("Answered"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[4],
    );

    f.render_widget(
        legend(&["(0-9) answer", "(enter) submit", "(←/→) move", "(f)inish", "(esc)ape"]),
        chunks[6],
    );
}

fn summary_lines(review: &Review, result: AttemptResult) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let headline = if result.timed_out {
        "Time Expired!"
    } else {
        "Test Complete!"
    };
    let score_style = if review.is_perfect() {
        bold.fg(Color::Green)
    } else {
        bold.fg(Color::Cyan)
    };

    let mut details = vec![
        Span::raw(format!("Total: {}, ", review.total)),
        Span::styled(format!("Correct: {}", review.correct), bold.fg(Color::Green)),
        Span::raw(", "),
        Span::styled(format!("Wrong: {}", review.wrong), bold.fg(Color::Red)),
    ];
    if review.unanswered > 0 {
        details.push(Span::raw(", "));
        details.push(Span::styled(
            format!("Unanswered: {}", review.unanswered),
            bold.fg(Color::Yellow),
        ));
    }

    let mut timing = format!("Time taken: {}", format_secs(result.time_taken_secs));
    if let Some(avg) = review.mean_time_secs() {
        timing.push_str(&format!("   avg {avg:.1}s per question"));
    }

    vec![
        Line::from(Span::styled(headline, bold)),
        Line::from(vec![
            Span::raw("Your score: "),
            Span::styled(format!("{}%", review.percentage), score_style),
        ]),
        Line::from(details),
        Line::from(Span::styled(timing, Style::default().fg(Color::Blue))),
    ]
}

fn status_style(status: AnswerStatus) -> Style {
    match status {
        AnswerStatus::Unanswered => Style::default().fg(Color::Yellow),
        AnswerStatus::Correct => Style::default().fg(Color::Green),
        AnswerStatus::Incorrect => Style::default().fg(Color::Red),
    }
}

pub fn render_finished(app: &App, f: &mut Frame) {
    let (Some(review), Some(result)) = (app.controller.review(), app.controller.result()) else {
        return;
    };
    let area = scaled_area(f.area(), app.scale);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(4),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(area);

    let summary = Paragraph::new(summary_lines(&review, result))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(summary, chunks[0]);

    let header = Row::new(vec!["#", "Question", "Your answer", "Result", "Time"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = review
        .items
        .iter()
        .map(|item| {
            let answer = if item.answer.trim().is_empty() {
                "-".to_string()
            } else {
                item.answer.clone()
            };
            Row::new(vec![
                Cell::from(format!("Q{}", item.number)),
                Cell::from(item.expression.clone()),
                Cell::from(answer),
                Cell::from(item.status.label()).style(status_style(item.status)),
                Cell::from(format!("{}s", item.time_spent_secs)),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(12),
            Constraint::Length(11),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Review Your Answers"),
    );
    f.render_widget(table, chunks[1]);

    let bars = charting::time_bars(&review.items);
    let data: Vec<(&str, u64)> = bars.iter().map(|(l, v)| (l.as_str(), *v)).collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Seconds per question"),
        )
        .bar_width(charting::bar_width(chunks[2].width.saturating_sub(2), data.len()))
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().add_modifier(Modifier::BOLD))
        .data(data.as_slice());
    f.render_widget(chart, chunks[2]);

    let size = format!("(z) size: {}", app.scale);
    f.render_widget(
        legend(&["(r) try again", "(n)ew attempt", size.as_str(), "(esc)ape"]),
        chunks[3],
    );
}
