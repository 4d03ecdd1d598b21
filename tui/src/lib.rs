//! TUI rendering for EndoCalc using ratatui.
//!
//! The screen is split into a header (title, connectivity, pending load), an
//! optional update banner, one body region and a key-hint footer. The body
//! shows either the menu region or the calculator-detail region, never both.

mod input;
mod theme;

pub use input::{InputPump, apply_event, apply_key, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use endocalc_engine::{
    App, CALCULATOR_CONTAINER, CatalogEntry, Detail, MAIN_CONTAINER, UpdateNotification,
};
use endocalc_types::{Container, FieldKind, Output};

/// Smallest terminal that can hold the calculator-detail region.
pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 12;

/// Host regions this terminal size can provide.
#[must_use]
pub fn available_anchors(area: Rect) -> Vec<&'static str> {
    let mut anchors = Vec::with_capacity(2);
    if area.width > 0 && area.height > 0 {
        anchors.push(MAIN_CONTAINER);
    }
    if fits(area) {
        anchors.push(CALCULATOR_CONTAINER);
    }
    anchors
}

fn fits(area: Rect) -> bool {
    area.width >= MIN_WIDTH && area.height >= MIN_HEIGHT
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let area = frame.area();

    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, area);

    if !fits(area) {
        draw_too_small(frame, area, &palette);
        return;
    }

    let banner_height = if app.notification().is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Header
            Constraint::Length(banner_height), // Update banner
            Constraint::Min(1),                // Menu or detail
            Constraint::Length(1),             // Key hints
        ])
        .split(area);

    draw_header(frame, app, chunks[0], &palette, &glyphs);
    if let Some(notification) = app.notification() {
        draw_notification(frame, notification, chunks[1], &palette, &glyphs);
    }
    if app.menu_visible() {
        draw_menu(frame, app, chunks[2], &palette, &glyphs);
    } else if app.detail_visible() {
        draw_detail(frame, app, chunks[2], &palette, &glyphs);
    }
    draw_key_hints(frame, app, chunks[3], &palette, &glyphs);
}

fn draw_too_small(frame: &mut Frame, area: Rect, palette: &Palette) {
    let lines = vec![
        Line::from(Span::styled(
            "Terminal too small",
            Style::default()
                .fg(palette.warning)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Need at least {MIN_WIDTH}x{MIN_HEIGHT}"),
            Style::default().fg(palette.text_muted),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let (status_glyph, status_color) = if app.cache_state().online {
        (glyphs.online, palette.success)
    } else {
        (glyphs.offline, palette.warning)
    };
    let status = format!("{status_glyph} {} ", app.status_text());
    let status_width = status.width() as u16;

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(status_width)])
        .split(area);

    let mut left = vec![Span::styled(" EndoCalc", styles::title(palette))];
    if let Some(id) = app.loading() {
        let spinner = spinner_frame(app.tick_count(), app.ui_options());
        left.push(Span::styled(
            format!("  {spinner} Loading {id}..."),
            Style::default().fg(palette.primary_dim),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(left)), columns[0]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(status_color),
        )))
        .alignment(Alignment::Right),
        columns[1],
    );
}

fn draw_notification(
    frame: &mut Frame,
    notification: &UpdateNotification,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let line = Line::from(vec![
        Span::styled(
            notification.message(),
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({})", notification.version),
            Style::default().fg(palette.text_muted),
        ),
        Span::raw("  "),
        Span::styled("[r]", styles::key_highlight(palette)),
        Span::styled(" Refresh  ", styles::key_hint(palette)),
        Span::styled(format!("[{}]", glyphs.dismiss), styles::key_highlight(palette)),
        Span::styled(" Dismiss", styles::key_hint(palette)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().bg(palette.bg_panel));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_menu(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .padding(Padding::horizontal(1))
        .title(Line::from(Span::styled(
            " Calculators ",
            styles::heading(palette),
        )));
    let lines = menu_lines(app.catalog(), app.selected(), palette, glyphs);

    // Keep the selected entry on screen: each entry takes three rows.
    let visible = area.height.saturating_sub(2) as usize;
    let selected_bottom = (app.selected() + 1) * 3;
    let scroll = selected_bottom.saturating_sub(visible) as u16;

    let menu = Paragraph::new(lines).block(block).scroll((scroll, 0));
    frame.render_widget(menu, area);
}

/// One name row, one description row and a spacer per catalog entry.
#[must_use]
pub fn menu_lines(
    catalog: &[CatalogEntry],
    selected: usize,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(catalog.len() * 3);
    for (index, entry) in catalog.iter().enumerate() {
        let is_selected = index == selected;
        let prefix = if is_selected { glyphs.selected } else { " " };
        let name_style = if is_selected {
            styles::focused(palette)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        lines.push(Line::from(Span::styled(
            format!("{prefix} {}", entry.name),
            name_style,
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", entry.description),
            Style::default().fg(palette.text_muted),
        )));
        lines.push(Line::from(""));
    }
    if matches!(lines.last(), Some(line) if line.width() == 0) {
        lines.pop();
    }
    lines
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let Some(detail) = app.detail() else {
        return;
    };

    let header = Line::from(vec![
        Span::styled(
            format!(" {} Back to Menu ", glyphs.back),
            styles::key_highlight(palette),
        ),
        Span::styled(format!(" {} ", detail.title()), styles::heading(palette)),
    ]);
    let border_color = match detail {
        Detail::Calculator { .. } => palette.primary,
        Detail::Error { .. } => palette.error,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::horizontal(1))
        .title(header);

    let lines = match detail {
        Detail::Calculator { container, .. } => form_lines(container, palette, glyphs),
        Detail::Error { message, cause, .. } => error_lines(message, cause, palette, glyphs),
    };
    let body = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(body, area);
}

/// Lines for a rendered calculator subtree.
#[must_use]
pub fn form_lines(container: &Container, palette: &Palette, glyphs: &Glyphs) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if !container.heading().is_empty() {
        lines.push(Line::from(Span::styled(
            container.heading().to_string(),
            styles::heading(palette),
        )));
    }
    for paragraph in container.intro() {
        lines.push(Line::from(Span::styled(
            paragraph.clone(),
            Style::default().fg(palette.text_muted),
        )));
    }
    lines.push(Line::from(""));

    let label_width = container
        .fields()
        .iter()
        .map(|field| field.label().width())
        .max()
        .unwrap_or(0);
    for (index, field) in container.fields().iter().enumerate() {
        let focused = index == container.focus();
        let prefix = if focused { glyphs.selected } else { " " };
        let padding = " ".repeat(label_width.saturating_sub(field.label().width()));
        let label = format!("{prefix} {}{padding}  ", field.label());

        let (value, unit) = match field.kind() {
            FieldKind::Number { unit, .. } => {
                let cursor = if focused { glyphs.cursor } else { "" };
                (
                    format!("[{}{cursor}]", field.display_value()),
                    unit.as_deref().map(|unit| format!(" {unit}")),
                )
            }
            FieldKind::Choice { .. } => (
                format!(
                    "{} {} {}",
                    glyphs.choice_prev,
                    field.display_value(),
                    glyphs.choice_next
                ),
                None,
            ),
        };
        let value_style = if focused {
            styles::focused(palette)
        } else {
            Style::default().fg(palette.text_primary)
        };

        let mut spans = vec![
            Span::styled(label, Style::default().fg(palette.text_secondary)),
            Span::styled(value, value_style),
        ];
        if let Some(unit) = unit {
            spans.push(Span::styled(unit, Style::default().fg(palette.text_muted)));
        }
        lines.push(Line::from(spans));
    }

    if let Some(label) = container.submit_label() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!(" {label} "), styles::button(palette)),
            Span::styled("  Enter", styles::key_hint(palette)),
        ]));
    }

    match container.output() {
        Output::Empty => {}
        Output::Lines(result) => {
            lines.push(Line::from(""));
            for (index, text) in result.iter().enumerate() {
                let style = if index == 0 {
                    Style::default()
                        .fg(palette.success)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.text_primary)
                };
                lines.push(Line::from(Span::styled(text.clone(), style)));
            }
        }
        Output::Invalid(message) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("{} {message}", glyphs.error),
                Style::default().fg(palette.error),
            )));
        }
    }

    for section in container.info() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            section.title.clone(),
            styles::heading(palette),
        )));
        for text in &section.lines {
            lines.push(Line::from(Span::styled(
                format!("{} {text}", glyphs.bullet),
                Style::default().fg(palette.text_muted),
            )));
        }
    }

    lines
}

fn error_lines(
    message: &str,
    cause: &str,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            format!("{} {message}", glyphs.error),
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            cause.to_string(),
            Style::default().fg(palette.text_muted),
        )),
    ]
}

fn draw_key_hints(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let mut hints: Vec<(&str, &str)> = if app.menu_visible() && app.loading().is_some() {
        vec![(glyphs.arrows, "select"), ("Esc", "cancel")]
    } else if app.menu_visible() {
        vec![(glyphs.arrows, "select"), ("Enter", "open")]
    } else if matches!(app.detail(), Some(Detail::Calculator { .. })) {
        vec![
            ("Tab", "next field"),
            ("Enter", "calculate"),
            ("Esc", "back"),
        ]
    } else {
        vec![("Esc", "back")]
    };
    if app.notification().is_some() {
        hints.push(("r", "refresh"));
        hints.push((glyphs.dismiss, "dismiss"));
    }
    hints.push(("q", "quit"));

    let mut spans = vec![Span::raw(" ")];
    for (key, action) in hints {
        spans.push(Span::styled(key.to_string(), styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {action}  "), styles::key_hint(palette)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tokio::sync::mpsc;

    use endocalc_engine::platform::NoAgentHost;
    use endocalc_engine::{ModuleLoader, REQUIRED_ANCHORS, Route, ShellContext, ShellSettings};
    use endocalc_types::{Calculator, CalculatorId, UiOptions};

    use super::*;

    fn app() -> App {
        let (context, messages) = ShellContext::new(ShellSettings::default());
        let (_platform_tx, platform) = mpsc::unbounded_channel();
        let mut app = App::new(
            context,
            messages,
            platform,
            Box::new(NoAgentHost),
            &REQUIRED_ANCHORS,
        )
        .expect("anchors present");
        app.start(Route::Menu);
        app
    }

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal.draw(|frame| draw(frame, app)).expect("draw");
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn plain(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn ascii() -> UiOptions {
        UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        }
    }

    #[test]
    fn anchors_depend_on_terminal_size() {
        assert_eq!(
            available_anchors(Rect::new(0, 0, 80, 24)),
            vec![MAIN_CONTAINER, CALCULATOR_CONTAINER]
        );
        assert_eq!(available_anchors(Rect::new(0, 0, 20, 5)), vec![MAIN_CONTAINER]);
        assert!(available_anchors(Rect::new(0, 0, 0, 0)).is_empty());
    }

    #[tokio::test]
    async fn menu_lists_every_calculator() {
        let app = app();
        let text = screen(&app, 100, 30);
        assert!(text.contains("EndoCalc"));
        assert!(text.contains("Online"));
        assert!(text.contains("Calculators"));
        assert!(text.contains("BMI Calculator"));
        assert!(text.contains("Steroid Converter"));
        assert!(!text.contains("Back to Menu"));
    }

    #[test]
    fn menu_text_snapshot() {
        let options = ascii();
        let catalog = ModuleLoader::bundled("./").catalog();
        let lines = menu_lines(&catalog[..3], 0, &palette(options), &glyphs(options));
        insta::assert_snapshot!("menu_text", plain(&lines));
    }

    #[tokio::test]
    async fn detail_shows_back_action_and_form() {
        let mut app = app();
        app.set_address(Route::from_fragment("bmi"));
        app.settle().await;

        let text = screen(&app, 100, 30);
        assert!(text.contains("Back to Menu"));
        assert!(text.contains("BMI Calculator"));
        assert!(text.contains("Weight"));
        assert!(text.contains("Calculate BMI"));
        assert!(!text.contains("Calculators"));
    }

    #[tokio::test]
    async fn error_panel_names_the_calculator() {
        let mut app = app();
        app.set_address(Route::from_fragment("nonexistent"));
        app.settle().await;

        let text = screen(&app, 100, 30);
        assert!(text.contains("Error"));
        assert!(text.contains("Failed to load calculator: nonexistent"));
    }

    #[tokio::test]
    async fn small_terminal_shows_size_hint() {
        let app = app();
        let text = screen(&app, 30, 8);
        assert!(text.contains("Terminal too small"));
    }

    #[test]
    fn form_lines_show_validation_message() {
        let options = ascii();
        let loaded = ModuleLoader::bundled("./")
            .load(&CalculatorId::new("pounds-kg").expect("id"))
            .expect("loads");
        let mut container = Container::new();
        loaded.instance.render(&mut container).expect("renders");
        container.submit();

        let text = plain(&form_lines(&container, &palette(options), &glyphs(options)));
        assert!(text.contains("> Weight in Pounds"));
        assert!(text.contains("[_]"));
        assert!(text.contains("X Please enter a value in one of the fields"));
    }
}
