//! Pure view functions for the login screen.
//!
//! Everything here takes `&ScreenState`, draws to a ratatui `Frame`, and
//! never mutates state or returns effects.

use keygate_core::{AuthMode, AuthOperation};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::state::{Focus, ScreenState, SignedIn};

const CARD_WIDTH: u16 = 60;
const CARD_HEIGHT: u16 = 17;
const NOTICE_WIDTH: u16 = 48;
const NOTICE_HEIGHT: u16 = 7;

/// Spinner frames for the loading line.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

const ACCENT: Color = Color::Cyan;

/// Renders the whole screen.
pub fn render(screen: &ScreenState, frame: &mut Frame) {
    let area = frame.area();
    let card = centered_area(area, CARD_WIDTH, CARD_HEIGHT);

    match &screen.signed_in {
        Some(signed_in) => render_signed_in(frame, card, signed_in),
        None => render_form(frame, card, screen),
    }

    if let Some(message) = screen.view.error.as_deref() {
        render_notice(frame, area, message);
    }
}

/// Centers a `width` x `height` rectangle in `area`, shrinking it to fit.
pub fn centered_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

fn card_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" {title} "))
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

fn render_form(frame: &mut Frame, card: Rect, screen: &ScreenState) {
    let view = &screen.view;
    let action = submit_label(view.mode());
    let block = card_block(action);
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let field_width = inner.width.saturating_sub(4) as usize;
    let masked = "*".repeat(view.password.chars().count());

    let mut lines = vec![Line::from("")];
    lines.extend(field_lines(
        "Email",
        &view.email,
        view.email_error.as_deref(),
        screen.focus == Focus::Email,
        field_width,
    ));
    lines.extend(field_lines(
        "Password",
        &masked,
        view.password_error.as_deref(),
        screen.focus == Focus::Password,
        field_width,
    ));
    lines.push(Line::from(""));
    lines.push(submit_line(
        action,
        view.can_submit(),
        screen.focus == Focus::Submit,
    ));
    lines.push(Line::from(""));
    lines.push(toggle_line(view.mode(), screen.focus == Focus::ModeToggle));
    lines.push(status_line(screen));
    lines.push(Line::from(""));
    lines.push(hint_line(&[
        ("Tab", "move"),
        ("Enter", "submit"),
        ("Ctrl+R", "switch"),
        ("Esc", "quit"),
    ]));

    let body = Rect::new(
        inner.x + 1,
        inner.y,
        inner.width.saturating_sub(2),
        inner.height,
    );
    frame.render_widget(Paragraph::new(lines), body);
}

/// Label line, input line (with cursor when focused), and error line.
fn field_lines(
    label: &'static str,
    value: &str,
    error: Option<&str>,
    focused: bool,
    width: usize,
) -> Vec<Line<'static>> {
    let label_style = if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let marker = if focused { "› " } else { "  " };

    // Leave room for the cursor.
    let visible = fit_tail(value, width.saturating_sub(1));
    let mut input = vec![
        Span::styled(marker, Style::default().fg(ACCENT)),
        Span::styled(visible.to_string(), Style::default().fg(Color::White)),
    ];
    if focused {
        input.push(Span::styled("█", Style::default().fg(ACCENT)));
    }

    let error_line = match error {
        Some(message) => Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(""),
    };

    vec![
        Line::from(Span::styled(label, label_style)),
        Line::from(input),
        error_line,
    ]
}

fn submit_line(label: &'static str, enabled: bool, focused: bool) -> Line<'static> {
    let style = match (enabled, focused) {
        (false, _) => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
        (true, true) => Style::default()
            .fg(Color::Black)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    };
    let text = format!("[ {label} ]");
    let text = if focused && !enabled {
        format!("› {text}")
    } else {
        text
    };
    Line::from(Span::styled(text, style)).alignment(Alignment::Center)
}

fn toggle_line(mode: AuthMode, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(ACCENT)
            .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(Span::styled(toggle_prompt(mode), style)).alignment(Alignment::Center)
}

fn status_line(screen: &ScreenState) -> Line<'static> {
    if !screen.view.loading {
        return Line::from("");
    }
    let spinner = SPINNER_FRAMES[screen.spinner_frame % SPINNER_FRAMES.len()];
    let text = match screen.view.mode() {
        AuthMode::Login => "Signing in...",
        AuthMode::Register => "Creating account...",
    };
    Line::from(vec![
        Span::styled(format!("{spinner} "), Style::default().fg(ACCENT)),
        Span::styled(text, Style::default().fg(Color::Yellow)),
    ])
    .alignment(Alignment::Center)
}

fn hint_line(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(*key, Style::default().fg(ACCENT)));
        spans.push(Span::styled(
            format!(" {action}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans).alignment(Alignment::Center)
}

fn render_signed_in(frame: &mut Frame, card: Rect, signed_in: &SignedIn) {
    let block = card_block("Welcome");
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let headline = match signed_in.operation {
        AuthOperation::Login => "Signed in as",
        AuthOperation::Register => "Account created for",
    };
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "✓",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(""),
        Line::from(Span::styled(headline, Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center),
        Line::from(Span::styled(
            signed_in.email.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(""),
        Line::from(""),
        hint_line(&[("Enter", "sign out"), ("Esc", "quit")]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_notice(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_area(area, NOTICE_WIDTH, NOTICE_HEIGHT);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Notice ")
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let body = Rect::new(
        inner.x + 1,
        inner.y + 1,
        inner.width.saturating_sub(2),
        inner.height.saturating_sub(2),
    );
    frame.render_widget(
        Paragraph::new(message.to_string())
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: true }),
        body,
    );

    let footer = Rect::new(inner.x, inner.y + inner.height.saturating_sub(1), inner.width, 1);
    frame.render_widget(Paragraph::new(hint_line(&[("Enter/Esc", "dismiss")])), footer);
}

pub fn submit_label(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::Login => "Login",
        AuthMode::Register => "Register",
    }
}

pub fn toggle_prompt(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::Login => "Not registered yet? Click here to sign up",
        AuthMode::Register => "Already a member? Click here to login",
    }
}

/// Longest suffix of `text` that fits in `max_width` columns.
fn fit_tail(text: &str, max_width: usize) -> &str {
    if text.width() <= max_width {
        return text;
    }
    let mut width = 0;
    let mut start = text.len();
    for (idx, c) in text.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        start = idx;
    }
    &text[start..]
}
