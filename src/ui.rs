use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use equityeye_core::state::{ChatRole, DeliveryStatus, Phase};

use crate::app::{App, InputMode};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    match app.controller.phase() {
        Phase::Idle => render_idle_screen(app, frame, body_area),
        Phase::Analyzing { file_name } => {
            render_analyzing_screen(app, file_name, frame, body_area)
        }
        Phase::Results { file_name, audit } => {
            render_results_screen(app, file_name, &audit.full_report, audit.score, frame, body_area)
        }
        Phase::Error { message } => render_error_screen(message, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" EquityEye ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("Venture Counsel ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // A validation alert takes the whole line until the next action
    if let Some(status) = &app.status {
        let alert = Paragraph::new(Line::from(Span::styled(
            format!(" {status} "),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(alert, area);
        return;
    }

    let hints = match app.controller.phase() {
        Phase::Idle => match app.input_mode {
            InputMode::Normal => " e: edit path | Enter: analyze | q: quit ",
            InputMode::Editing => " Esc: done | Enter: analyze ",
        },
        Phase::Analyzing { .. } => " auditing... | q: quit ",
        Phase::Results { .. } => match app.input_mode {
            InputMode::Normal => " i: ask counsel | j/k: scroll report | r: new audit | q: quit ",
            InputMode::Editing => " Esc: done | Enter: send ",
        },
        Phase::Error { .. } => " r: start over | q: quit ",
    };

    let footer = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, area);
}

fn render_idle_screen(app: &App, frame: &mut Frame, area: Rect) {
    let [_, center, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(9),
        Constraint::Fill(1),
    ])
    .areas(area);

    let [_, column, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(64),
        Constraint::Fill(1),
    ])
    .areas(center);

    let [title_area, input_area, hint_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(column);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "Protect Your Cap Table Before You Sign",
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            "Audit term sheets for predatory clauses, then chat with counsel.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, title_area);

    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Cyan } else { Color::DarkGray };
    let input = Paragraph::new(app.path_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Document path "),
    );
    frame.render_widget(input, input_area);

    if editing {
        frame.set_cursor_position((
            input_area.x + 1 + app.path_input.chars().count() as u16,
            input_area.y + 1,
        ));
    }

    let hint = Paragraph::new(Line::from(Span::styled(
        "Supports PDF, PNG, JPG, WEBP (max 10 MiB)",
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hint, hint_area);
}

fn render_analyzing_screen(app: &App, file_name: &str, frame: &mut Frame, area: Rect) {
    let [_, center, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Fill(1),
    ])
    .areas(area);

    let dots = ".".repeat((app.animation_frame as usize) + 1);
    let lines = vec![
        Line::from(Span::styled(
            format!("Auditing Document{dots}"),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            file_name.to_string(),
            Style::default().fg(Color::Cyan),
        )),
        Line::default(),
        Line::from(Span::styled(
            "* Extracting document text",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "* Identifying liquidation preferences",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "* Checking control provisions",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "* Generating negotiation scripts",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let progress = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
    frame.render_widget(progress, center);
}

fn render_results_screen(
    app: &App,
    file_name: &str,
    report: &str,
    score: Option<u8>,
    frame: &mut Frame,
    area: Rect,
) {
    // Report on the left, counsel chat on the right
    let [report_area, chat_area] = Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ])
    .areas(area);

    let report_title = match score {
        Some(score) => format!(" Audit: {file_name} (score {score}/100) "),
        None => format!(" Audit: {file_name} "),
    };
    let report_widget = Paragraph::new(report)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(report_title),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.report_scroll, 0));
    frame.render_widget(report_widget, report_area);

    let [history_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(chat_area);

    render_chat_history(app, frame, history_area);

    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Cyan } else { Color::DarkGray };
    let input = Paragraph::new(app.chat_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Ask counsel "),
    );
    frame.render_widget(input, input_area);

    if editing {
        frame.set_cursor_position((
            input_area.x + 1 + app.chat_input.chars().count() as u16,
            input_area.y + 1,
        ));
    }
}

fn render_chat_history(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Live Counsel ");

    let mut lines: Vec<Line> = Vec::new();

    if app.controller.transcript().is_empty() && !app.controller.reply_pending() {
        lines.push(Line::from(Span::styled(
            "Ask counsel to draft clauses, explain risks, or redline a section.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for msg in app.controller.transcript() {
        match msg.role {
            ChatRole::User => {
                let mut header = vec![Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )];
                if msg.status == DeliveryStatus::Failed {
                    header.push(Span::styled(
                        " (failed to send)",
                        Style::default().fg(Color::Red),
                    ));
                }
                lines.push(Line::from(header));
                lines.push(Line::from(msg.content.as_str()));
                lines.push(Line::default());
            }
            ChatRole::Model => {
                lines.push(Line::from(Span::styled(
                    "Counsel:",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::default());
            }
        }
    }

    if app.controller.reply_pending() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            "Counsel:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("Drafting response{dots}"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    // Pin the view to the newest exchange
    let height = area.height.saturating_sub(2);
    let width = area.width.saturating_sub(2).max(1);
    let total = wrapped_line_count(&lines, width);
    let scroll = total.saturating_sub(height);

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(chat, area);
}

/// Lines the paragraph occupies once wrapped to the given width.
fn wrapped_line_count(lines: &[Line], width: u16) -> u16 {
    let width = width as usize;
    lines
        .iter()
        .map(|line| {
            let chars = line.width();
            if chars == 0 {
                1
            } else {
                ((chars - 1) / width + 1) as u16
            }
        })
        .sum()
}

fn render_error_screen(message: &str, frame: &mut Frame, area: Rect) {
    let [_, center, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Fill(1),
    ])
    .areas(area);

    let lines = vec![
        Line::from(Span::styled(
            "Analysis Failed",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::default(),
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled(
            "Check your GEMINI_API_KEY and document, then press r to try again.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let error = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(error, center);
}
