use crate::app::{App, InputMode, LoadState};
use crate::braille::BrailleCanvas;
use crate::map::LayerCanvases;
use crate::popup::PopupContent;
use crate::risk::RiskCategory;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

/// Fixed stroke around every district shape.
const STROKE_COLOR: Color = Color::Rgb(0xff, 0xff, 0xff);
/// Accent used for the hover outline and headings.
const HIGHLIGHT_COLOR: Color = Color::Rgb(0x06, 0xb6, 0xd4);

/// Render the UI.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map (plus side panel)
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let (map_area, panel_area) = if app.panel_open {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(28)])
            .split(chunks[0]);
        (cols[0], Some(cols[1]))
    } else {
        (chunks[0], None)
    };

    match &app.load_state {
        LoadState::Failed(message) => render_error(frame, app, map_area, message),
        LoadState::Ready => {
            render_map(frame, app, map_area);
            render_legend(frame, app, map_area);
            if app.input_mode == InputMode::Search {
                render_search_bar(frame, app, map_area);
            }
            if let Some(popup) = &app.popup {
                render_popup(frame, popup, map_area);
            }
        }
    }

    if let Some(panel_area) = panel_area {
        render_panel(frame, app, panel_area);
    } else {
        render_panel_tab(frame, map_area);
    }

    render_status_bar(frame, app, chunks[1]);

    if let Some(notice) = &app.notice {
        render_notice(frame, notice, map_area);
    }
}

fn map_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Flood Risk Map ",
            Style::default()
                .fg(HIGHLIGHT_COLOR)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = map_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Match the viewport to the exact inner size for this frame.
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let canvases = app
        .layer
        .render(inner.width as usize, inner.height as usize, &viewport, app.hovered);

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        if cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    frame.render_widget(MapWidget { canvases, cursor_pos }, inner);
}

/// Composites the per-category braille canvases with their colors.
struct MapWidget {
    canvases: LayerCanvases,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Render one braille canvas layer in a single color, skipping blank
    /// cells so earlier layers show through.
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: category fills, then stroke, then the hover
        // accent on top.
        Self::render_layer(&self.canvases.unknown, RiskCategory::Unknown.fill_color(), area, buf);
        Self::render_layer(&self.canvases.low, RiskCategory::Low.fill_color(), area, buf);
        Self::render_layer(&self.canvases.medium, RiskCategory::Medium.fill_color(), area, buf);
        Self::render_layer(&self.canvases.high, RiskCategory::High.fill_color(), area, buf);
        Self::render_layer(&self.canvases.stroke, STROKE_COLOR, area, buf);
        Self::render_layer(&self.canvases.highlight, HIGHLIGHT_COLOR, area, buf);

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Controls [−] ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let counter_line = |category: RiskCategory, value: usize| {
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(category.fill_color())),
            Span::styled(
                format!("{:<12}", category.label()),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                value.to_string(),
                Style::default()
                    .fg(category.fill_color())
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    };

    let filter_line = |key: char, label: &str, on: bool| {
        Line::from(vec![
            Span::styled(
                if on { "[x] " } else { "[ ] " },
                Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
            ),
            Span::styled(
                format!("({key}) {label}"),
                Style::default().fg(if on { Color::White } else { Color::DarkGray }),
            ),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(
            "Districts at risk",
            Style::default().fg(HIGHLIGHT_COLOR),
        )),
        counter_line(RiskCategory::High, app.counters[0].value()),
        counter_line(RiskCategory::Medium, app.counters[1].value()),
        counter_line(RiskCategory::Low, app.counters[2].value()),
        Line::from(""),
        Line::from(Span::styled(
            "Filters",
            Style::default().fg(HIGHLIGHT_COLOR),
        )),
        filter_line('1', "High Risk", app.filters.high),
        filter_line('2', "Medium Risk", app.filters.medium),
        filter_line('3', "Low Risk", app.filters.low),
        Line::from(""),
        Line::from(Span::styled(
            "/ search  g legend  p panel",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "click a district for details",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Collapsed stand-in for the side panel, mirroring the legend's glyph.
fn render_panel_tab(frame: &mut Frame, map_area: Rect) {
    let width = 12u16.min(map_area.width.saturating_sub(2));
    let rect = Rect {
        x: (map_area.x + map_area.width).saturating_sub(width + 1),
        y: map_area.y + 1,
        width,
        height: 1,
    }
    .intersection(map_area);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(Span::styled(
            " Panel [+] ",
            Style::default().fg(Color::DarkGray),
        )),
        rect,
    );
}

fn render_legend(frame: &mut Frame, app: &App, map_area: Rect) {
    if !app.legend_open {
        let rect = bottom_left_rect(map_area, 14, 1).intersection(map_area);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(Span::styled(
                " Legend [+] ",
                Style::default().fg(Color::DarkGray),
            )),
            rect,
        );
        return;
    }

    let rect = bottom_left_rect(map_area, 20, 6).intersection(map_area);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Legend [−] ",
            Style::default().fg(Color::White),
        ));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let entry = |category: RiskCategory| {
        Line::from(vec![
            Span::styled("██ ", Style::default().fg(category.fill_color())),
            Span::raw(category.label()),
        ])
    };
    let lines = vec![
        entry(RiskCategory::High),
        entry(RiskCategory::Medium),
        entry(RiskCategory::Low),
        entry(RiskCategory::Unknown),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_search_bar(frame: &mut Frame, app: &App, map_area: Rect) {
    let width = map_area.width.saturating_sub(4).min(44);
    let rect = Rect {
        x: map_area.x + 2,
        y: (map_area.y + map_area.height).saturating_sub(4),
        width,
        height: 3,
    }
    .intersection(map_area);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(Span::styled(
            " Search district or state (Enter/Esc) ",
            Style::default().fg(Color::White),
        ));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(app.search_query.clone()),
            Span::styled("▌", Style::default().fg(HIGHLIGHT_COLOR)),
        ])),
        inner,
    );
}

fn render_popup(frame: &mut Frame, popup: &PopupContent, map_area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            popup.state.clone(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Flood Risk Level: ", Style::default().fg(Color::Gray)),
            Span::styled(
                popup.risk_level.clone(),
                Style::default()
                    .fg(popup.category.fill_color())
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    // The metrics block is omitted entirely when nothing is present.
    if popup.has_details() {
        lines.push(Line::from(""));
        for (label, value) in &popup.details {
            lines.push(Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
                Span::styled(value.clone(), Style::default().fg(Color::White)),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc to close",
        Style::default().fg(Color::DarkGray),
    )));

    let content_width = lines
        .iter()
        .map(|l| l.width())
        .max()
        .unwrap_or(0)
        .max(popup.title.len() + 2) as u16;
    let width = (content_width + 4).clamp(24, map_area.width.saturating_sub(2).max(24));
    let height = (lines.len() as u16 + 2).min(map_area.height.saturating_sub(2).max(5));
    let rect = centered_rect(map_area, width, height).intersection(map_area);

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(popup.category.fill_color()))
        .title(Span::styled(
            format!(" {} ", popup.title),
            Style::default()
                .fg(HIGHLIGHT_COLOR)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_notice(frame: &mut Frame, notice: &str, map_area: Rect) {
    let width = ((notice.len() as u16) + 6).clamp(24, map_area.width.saturating_sub(2).max(24));
    let rect = centered_rect(map_area, width, 5).intersection(map_area);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(" Notice ", Style::default().fg(Color::Yellow)));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(notice.to_string()),
            Line::from(Span::styled(
                "press any key",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_error(frame: &mut Frame, app: &App, area: Rect, message: &str) {
    let block = map_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(
            "⚠  Error Loading Data",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(format!(
            "Ensure the dataset exists at {}",
            app.data_path.display()
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to retry or q to quit",
            Style::default().fg(HIGHLIGHT_COLOR),
        )),
    ];

    let height = (lines.len() as u16).min(inner.height);
    let rect = Rect {
        x: inner.x,
        y: inner.y + inner.height.saturating_sub(height) / 2,
        width: inner.width,
        height,
    };
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let filter_span = |key: char, label: &str, on: bool| {
        Span::styled(
            format!("[{key}]{label} "),
            Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
        )
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        filter_span('1', "High", app.filters.high),
        filter_span('2', "Med", app.filters.medium),
        filter_span('3', "Low", app.filters.low),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            " | hjkl:pan +/-:zoom /:search g:legend p:panel r:reload q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

/// Anchor a rect to the bottom-left inside `area`, clamped to fit.
fn bottom_left_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + 1,
        y: (area.y + area.height).saturating_sub(height + 1),
        width,
        height,
    }
}

/// Center a rect of the given size inside `area`, clamped to fit.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
