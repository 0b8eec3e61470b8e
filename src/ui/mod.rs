use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section, Selector};
use crate::currency::SUPPORTED;
use crate::signal::SignalKind;

/// Screen regions. Computed from the area alone so that mouse hit-testing
/// in the app layer sees exactly what gets drawn.
pub struct AppLayout {
    pub info: Rect,
    pub base: Rect,
    pub target: Rect,
    pub check: Rect,
    pub badge: Rect,
    pub footer: Rect,
}

pub fn layout(area: Rect) -> AppLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Length(3), // Selector row
            Constraint::Min(6),    // Signal badge
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(40),
            Constraint::Percentage(20),
        ])
        .split(chunks[1]);

    AppLayout {
        info: chunks[0],
        base: row[0],
        target: row[1],
        check: row[2],
        badge: chunks[2],
        footer: chunks[3],
    }
}

/// Where a selector's dropdown panel goes: directly under its trigger,
/// clipped to the screen.
pub fn panel_rect(trigger: Rect, area: Rect, options: usize) -> Rect {
    let top = trigger.bottom().min(area.bottom());
    let height = (options as u16 + 2).min(area.bottom().saturating_sub(top));
    Rect::new(trigger.x, top, trigger.width, height)
}

/// Which option row of an open panel a position lands on, if any.
pub fn panel_option_at(panel: Rect, pos: Position) -> Option<usize> {
    if panel.width < 3 || panel.height < 3 {
        return None;
    }
    let inner = Rect::new(panel.x + 1, panel.y + 1, panel.width - 2, panel.height - 2);
    if !inner.contains(pos) {
        return None;
    }
    Some((pos.y - inner.y) as usize)
}

pub fn draw(f: &mut Frame, app: &App) {
    let l = layout(f.area());

    draw_info_line(f, app, l.info);
    draw_selector(f, app, Selector::Base, l.base);
    draw_selector(f, app, Selector::Target, l.target);
    draw_check_box(f, app, l.check);
    draw_badge(f, app, l.badge);
    draw_footer(f, app, l.footer);

    // Panels and popups go on top
    if let Some(panel) = app.open_panel {
        let trigger = match panel {
            Selector::Base => l.base,
            Selector::Target => l.target,
        };
        draw_panel(f, app, panel, panel_rect(trigger, f.area(), SUPPORTED.len()));
    }

    if app.popup == Popup::Help {
        draw_help_popup(f, app);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    // Priority: status message > in-flight marker > endpoint
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.clone(), Style::default().fg(theme.warning)))
    } else if app.in_flight > 0 {
        Line::from(Span::styled(
            format!("⋯ {} check(s) in flight", app.in_flight),
            Style::default().fg(theme.text_dim),
        ))
    } else {
        Line::from(Span::styled(
            format!("signal endpoint: {}", app.endpoint()),
            Style::default().fg(theme.text_dim),
        ))
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_selector(f: &mut Frame, app: &App, selector: Selector, area: Rect) {
    let theme = &app.theme;
    let (title, section, idx) = match selector {
        Selector::Base => (" From ", Section::Base, app.base_idx),
        Selector::Target => (" To ", Section::Target, app.target_idx),
    };

    let is_active = app.section == section;
    let is_open = app.open_panel == Some(selector);
    let border_color = if is_active || is_open { theme.accent } else { theme.inactive };
    let title_style = if is_active {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.inactive)
    };

    let block = Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let entry = SUPPORTED[idx];
    let marker = if is_open { "▴" } else { "▾" };
    let trigger = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", entry.flag), Style::default()),
        Span::styled(entry.code, Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", marker), Style::default().fg(theme.text_dim)),
    ]))
    .block(block);

    f.render_widget(trigger, area);
}

fn draw_check_box(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let is_active = app.section == Section::Check;
    let border_color = if is_active { theme.accent } else { theme.inactive };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let label_style = if is_active {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };

    let button = Paragraph::new(Line::from(vec![
        Span::styled("▶ ", Style::default().fg(theme.success)),
        Span::styled("Check", label_style),
    ]))
    .alignment(Alignment::Center)
    .block(block);

    f.render_widget(button, area);
}

fn draw_badge(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let kind = app.status.kind;
    let color = theme.badge(kind);

    let block = Block::default()
        .title(Span::styled(" Signal ", Style::default().fg(theme.header)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let icon = match kind {
        SignalKind::Green => "󰄬",
        SignalKind::Amber => "󰞌",
        SignalKind::Red => "󰅖",
        SignalKind::Neutral => "󰇘",
        SignalKind::Unknown => "󰘥",
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {} ", icon), Style::default().fg(color)),
            Span::styled(
                app.status.label.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    if !app.status.details.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", app.status.details),
            Style::default().fg(theme.text),
        )));
    }

    let badge = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    f.render_widget(badge, area);
}

fn draw_panel(f: &mut Frame, app: &App, selector: Selector, area: Rect) {
    if area.height < 3 {
        return;
    }
    let theme = &app.theme;

    f.render_widget(Clear, area);

    let (title, current) = match selector {
        Selector::Base => (" From currency ", app.base_idx),
        Selector::Target => (" To currency ", app.target_idx),
    };

    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(theme.accent)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));

    let rows: Vec<Line> = SUPPORTED
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mark = if i == current { "●" } else { " " };
            let style = if i == app.panel_highlight {
                Style::default().bg(theme.bg_selected).fg(theme.text)
            } else {
                Style::default().fg(theme.text)
            };
            Line::from(vec![
                Span::styled(format!("{} {} ", mark, c.flag), style),
                Span::styled(c.code, style.add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();

    let list = Paragraph::new(rows).block(block);
    f.render_widget(list, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let hints = Line::from(vec![
        Span::styled(" Tab", Style::default().fg(theme.accent)),
        Span::styled(" move  ", Style::default().fg(theme.text_dim)),
        Span::styled("Enter", Style::default().fg(theme.accent)),
        Span::styled(" open/select  ", Style::default().fg(theme.text_dim)),
        Span::styled("c", Style::default().fg(theme.accent)),
        Span::styled(" check  ", Style::default().fg(theme.text_dim)),
        Span::styled("?", Style::default().fg(theme.accent)),
        Span::styled(" help  ", Style::default().fg(theme.text_dim)),
        Span::styled("q", Style::default().fg(theme.accent)),
        Span::styled(" quit", Style::default().fg(theme.text_dim)),
    ]);

    f.render_widget(Paragraph::new(hints), area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = f.area();
    let popup_area = centered_rect(if area.width < 80 { 90 } else { 60 }, 70, area);

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "═══ Navigation ═══",
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  Tab / ← →  ", Style::default().fg(theme.accent)),
            Span::raw("Move between From, To and Check"),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k    ", Style::default().fg(theme.accent)),
            Span::raw("Move inside an open currency list"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Actions ═══",
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  Enter/Space ", Style::default().fg(theme.accent)),
            Span::raw("Open a selector, pick a currency, or run the check"),
        ]),
        Line::from(vec![
            Span::styled("  c           ", Style::default().fg(theme.accent)),
            Span::raw("Run the check from anywhere"),
        ]),
        Line::from(vec![
            Span::styled("  Esc         ", Style::default().fg(theme.accent)),
            Span::raw("Close an open currency list"),
        ]),
        Line::from(vec![
            Span::raw("  Mouse clicks work too: triggers open, options select,"),
        ]),
        Line::from(vec![Span::raw("  clicking elsewhere closes the list.")]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Scripting ═══",
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  fxcheck --check              ", Style::default().fg(theme.accent)),
            Span::raw("One-shot check, JSON on stdout"),
        ]),
        Line::from(vec![
            Span::styled("  fxcheck --check -b GBP -t JPY", Style::default().fg(theme.accent)),
            Span::raw("  Override the pair"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(theme.text_dim)),
            Span::styled("?", Style::default().fg(theme.accent)),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::styled(" to close", Style::default().fg(theme.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 fxcheck Help ", Style::default().fg(theme.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
