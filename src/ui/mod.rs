use std::sync::OnceLock;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Field, Popup};
use crate::present::LookupState;
use crate::theme::Theme;

static THEME: OnceLock<Theme> = OnceLock::new();

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn danger() -> Color { theme().danger }
fn success() -> Color { theme().success }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

/// Braille spinner for the loading state
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Most rows the dropdown overlay will show at once
const DROPDOWN_MAX_ROWS: u16 = 8;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),  // Info line
            Constraint::Length(11), // Form box (three bordered inputs)
            Constraint::Min(6),     // Status box
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    let airline_rect = draw_form_box(f, app, chunks[1]);
    draw_status_box(f, app, chunks[2]);
    draw_footer(f, chunks[3]);

    // Dropdown floats over whatever is under the airline field
    if app.field == Field::Airline && app.dropdown_open {
        draw_dropdown(f, app, airline_rect);
    }

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: status message > directory summary > ready
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(accent())))
    } else if app.directory.is_empty() {
        Line::from(Span::styled(
            "Airline autocomplete unavailable",
            Style::default().fg(text_dim()),
        ))
    } else {
        Line::from(Span::styled("Ready", Style::default().fg(text_dim())))
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

/// Draw the three-field form; returns the airline input rect so the
/// dropdown can anchor beneath it
fn draw_form_box(f: &mut Frame, app: &App, area: Rect) -> Rect {
    let block = Block::default()
        .title(Span::styled(
            " Flight Lookup ",
            Style::default().fg(accent()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));
    f.render_widget(block, area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    draw_airline_input(f, app, inner[0]);
    draw_text_input(
        f,
        " Flight Number ",
        &app.flight_number_input,
        app.field == Field::FlightNumber,
        inner[1],
    );
    draw_text_input(
        f,
        " Date (YYYY-MM-DD) ",
        &app.date_input,
        app.field == Field::Date,
        inner[2],
    );

    inner[0]
}

fn draw_airline_input(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.field == Field::Airline;

    let mut spans = vec![Span::styled(
        app.airline_input.clone(),
        Style::default().fg(text()),
    )];
    if is_active {
        spans.push(Span::styled("_", Style::default().fg(accent())));
    }
    // Show the bound carrier code next to the name it came from
    if let Some(ref code) = app.selected_code {
        spans.push(Span::styled(
            format!("  ({})", code),
            Style::default().fg(text_dim()),
        ));
    }

    let border = if is_active { accent() } else { inactive() };
    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(Span::styled(
                " Airline ",
                Style::default().fg(if is_active { accent() } else { header() }),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(input, area);
}

fn draw_text_input(f: &mut Frame, title: &str, value: &str, is_active: bool, area: Rect) {
    let display = if is_active {
        format!("{}_", value)
    } else {
        value.to_string()
    };

    let border = if is_active { accent() } else { inactive() };
    let input = Paragraph::new(display)
        .style(Style::default().fg(text()))
        .block(
            Block::default()
                .title(Span::styled(
                    title,
                    Style::default().fg(if is_active { accent() } else { header() }),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    f.render_widget(input, area);
}

fn draw_dropdown(f: &mut Frame, app: &App, anchor: Rect) {
    let matches = app.dropdown_matches();
    if matches.is_empty() {
        return;
    }

    let area = f.area();
    let below = area.height.saturating_sub(anchor.y + anchor.height);
    let rows = matches.len().min(DROPDOWN_MAX_ROWS as usize) as u16;
    let height = (rows + 2).min(DROPDOWN_MAX_ROWS).min(below);
    if height < 3 {
        return;
    }

    let popup_area = Rect {
        x: anchor.x,
        y: anchor.y + anchor.height,
        width: anchor.width,
        height,
    };

    f.render_widget(Clear, popup_area);

    // Keep the highlighted row inside the visible window
    let visible_rows = (height - 2) as usize;
    let offset = app.dropdown_selected.saturating_sub(visible_rows.saturating_sub(1));

    let lines: Vec<Line> = matches
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_rows)
        .map(|(i, airline)| {
            let row_style = if i == app.dropdown_selected {
                Style::default().bg(bg_selected())
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!(" {}", airline.name), Style::default().fg(text())),
                Span::styled(
                    format!(" ({})", airline.iata_code),
                    Style::default().fg(text_dim()),
                ),
            ])
            .style(row_style)
        })
        .collect();

    let list = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(
                format!(" {} match(es) ", matches.len()),
                Style::default().fg(text_dim()),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent())),
    );
    f.render_widget(list, popup_area);
}

fn draw_status_box(f: &mut Frame, app: &App, area: Rect) {
    match &app.lookup {
        LookupState::Idle => {
            let hint = Paragraph::new(Line::from(Span::styled(
                "Pick an airline, enter a flight number and date, press Enter",
                Style::default().fg(text_dim()),
            )))
            .alignment(Alignment::Center)
            .block(status_block(inactive()));
            f.render_widget(hint, area);
        }
        LookupState::Loading => {
            let frame = SPINNER_FRAMES[app.ticks as usize % SPINNER_FRAMES.len()];
            let spinner = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("{} Looking up flight...", frame),
                    Style::default().fg(accent()),
                )),
            ])
            .alignment(Alignment::Center)
            .block(status_block(accent()));
            f.render_widget(spinner, area);
        }
        LookupState::Complete(times) => {
            f.render_widget(status_block(inactive()), area);

            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .margin(1)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);

            draw_time_block(f, "Departure Time", &times.departure, halves[0]);
            draw_time_block(f, "Arrival Time", &times.arrival, halves[1]);
        }
        LookupState::Failed(message) => {
            let alert = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    message.as_str(),
                    Style::default().fg(danger()).add_modifier(Modifier::BOLD),
                )),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(status_block(danger()));
            f.render_widget(alert, area);
        }
    }
}

fn status_block(border: Color) -> Block<'static> {
    Block::default()
        .title(Span::styled(" Status ", Style::default().fg(header())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn draw_time_block(f: &mut Frame, label: &str, value: &str, area: Rect) {
    let block = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(value.to_string(), Style::default().fg(success()))),
    ])
    .alignment(Alignment::Center);
    f.render_widget(block, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let hints: Vec<(&str, &str)> = vec![
        ("Tab", "Next"),
        ("↑↓", "Browse"),
        ("Enter", "Submit"),
        ("Esc", "Dismiss"),
        ("F1", "Help"),
        ("Ctrl-C", "Quit"),
    ];

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 {
        4
    } else if area.width < 80 {
        5
    } else {
        hints.len()
    };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "═══ Form ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  Tab/↑↓    ", Style::default().fg(accent())),
            Span::raw("Move between fields"),
        ]),
        Line::from(vec![
            Span::styled("  type      ", Style::default().fg(accent())),
            Span::raw("Filter airlines as you type"),
        ]),
        Line::from(vec![
            Span::styled("  ↑↓ Enter  ", Style::default().fg(accent())),
            Span::raw("Browse the dropdown, bind the highlighted airline"),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", Style::default().fg(accent())),
            Span::raw("Submit the lookup (dropdown closed)"),
        ]),
        Line::from(vec![
            Span::styled("  Esc       ", Style::default().fg(accent())),
            Span::raw("Dismiss the dropdown"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ One-shot CLI ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                "  flightline --carrier BA --flight 287 --date 2024-03-15",
                Style::default().fg(accent()),
            ),
        ]),
        Line::from(vec![
            Span::styled("  flightline --airlines brit   ", Style::default().fg(accent())),
            Span::raw("List matching airlines"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Configuration ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::raw(
            "  Credentials live in config.toml under your config dir,",
        )]),
        Line::from(vec![
            Span::raw("  or pass "),
            Span::styled("--client-id/--client-secret", Style::default().fg(accent())),
            Span::raw(" ("),
            Span::styled("AMADEUS_CLIENT_ID/SECRET", Style::default().fg(accent())),
            Span::raw(" env)"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" flightline Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
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
