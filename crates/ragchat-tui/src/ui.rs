use ragchat_core::markup;
use ragchat_core::{Layout as ChatLayout, Role};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Focus};

const DEFAULT_HEADER: &str = "Ask me anything";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.chat.layout() {
        ChatLayout::Empty => render_empty(app, frame, body_area),
        ChatLayout::Conversation => render_conversation(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = app.chat.title().unwrap_or("RAG Chat");
    let line = Line::from(vec![
        Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(status) = &app.status {
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {}", status), Style::default().fg(Color::Yellow))),
            area,
        );
        return;
    }

    let hints = match (app.chat.layout(), app.focus) {
        (ChatLayout::Empty, _) => " Enter: ask  Ctrl-C: quit",
        (ChatLayout::Conversation, Focus::Prompt) => {
            " Enter: ask  Tab: transcript  PgUp/PgDn: scroll  Ctrl-C: quit"
        }
        (ChatLayout::Conversation, Focus::Transcript) => {
            " j/k: select  v: range  y: copy  i: prompt  q: quit"
        }
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        area,
    );
}

/// Centered header and prompt, no transcript
fn render_empty(app: &mut App, frame: &mut Frame, area: Rect) {
    app.transcript_area = None;

    let [column] = Layout::horizontal([Constraint::Percentage(70)])
        .flex(Flex::Center)
        .areas(area);
    let [header_area, _, prompt_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .flex(Flex::Center)
    .areas(column);

    let header = app.chat.header().unwrap_or(DEFAULT_HEADER);
    frame.render_widget(
        Paragraph::new(Span::styled(header, Style::default().fg(Color::Cyan).bold()))
            .centered(),
        header_area,
    );

    render_prompt(app, frame, prompt_area);
}

/// Transcript on top, prompt anchored at the bottom
fn render_conversation(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, prompt_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.transcript_area = Some(chat_area);
    // Inner size minus borders, for scroll calculations
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let transcript_focused = app.focus == Focus::Transcript;
    let border_color = if transcript_focused { Color::Cyan } else { Color::DarkGray };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Conversation ");
    if app.chat.new_chat_visible() {
        let style = if app.chat.new_chat_enabled() && !app.loading_page {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        block = block.title_top(Line::from(Span::styled(" Ctrl-N: new chat ", style)).right_aligned());
    }

    let chat = Paragraph::new(transcript_text(app))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(chat, chat_area);

    render_prompt(app, frame, prompt_area);
}

fn transcript_text(app: &App) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();

    for (i, msg) in app.chat.transcript().messages().iter().enumerate() {
        let selected = app.selection.map(|s| s.contains(i)).unwrap_or(false);
        let base = if selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };

        let heading = match msg.role {
            Role::Human => Span::styled("You:", base.fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Role::Ai => Span::styled("AI:", base.fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        };
        lines.push(Line::from(heading));

        for line in markup::to_lines(&msg.text) {
            lines.push(Line::from(Span::styled(line, base)));
        }

        if let Some(label) = msg.elapsed_label() {
            lines.push(Line::from(Span::styled(
                label,
                base.fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        lines.push(Line::default());
    }

    if let Some(dots) = app.chat.indicator_text() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            dots.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    Text::from(lines)
}

fn render_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let input = app.chat.input();
    let focused = app.focus == Focus::Prompt;
    let border_color = if focused && input.enabled { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask ");

    // Visible portion of the input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .value
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let style = if input.enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
    };
    frame.render_widget(Paragraph::new(visible_text).style(style).block(block), area);

    // Show cursor while the prompt can be edited
    if focused && input.enabled {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
