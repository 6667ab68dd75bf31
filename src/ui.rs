use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
    Frame,
};

use crate::controller::{Phase, WriterBlockApp};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const BUTTON_WIDTH: u16 = 12;

pub const TITLE: &str = "Writer's Block Alleviator";

/// Where each part of the window lives. Shared by rendering and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub text: Rect,
    pub start_button: Rect,
    pub stop_button: Rect,
    pub status: Rect,
    pub legend: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(3),    // text region
                Constraint::Length(3), // buttons
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(area);

        // Start hugs the left edge and Stop the right, like packed buttons
        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(BUTTON_WIDTH),
                Constraint::Min(0),
                Constraint::Length(BUTTON_WIDTH),
            ])
            .split(chunks[1]);

        Self {
            text: chunks[0],
            start_button: buttons[0],
            stop_button: buttons[2],
            status: chunks[2],
            legend: chunks[3],
        }
    }

    /// Inner area of the bordered text region
    pub fn text_inner(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.text)
    }
}

/// Scroll offsets keeping the cursor inside `inner`
fn scroll_for(app: &WriterBlockApp, inner: Rect) -> (u16, u16) {
    let (row, _) = app.editor.cursor();
    let top = row.saturating_sub(inner.height.saturating_sub(1) as usize);
    let left = app
        .editor
        .cursor_width()
        .saturating_sub(inner.width.saturating_sub(1) as usize);
    (top as u16, left as u16)
}

fn status_line(app: &WriterBlockApp, now: Instant) -> String {
    match app.phase() {
        Phase::Closing => return "closing: waiting for the monitor to stop...".to_string(),
        Phase::Closed => return "closed".to_string(),
        Phase::Open => {}
    }

    if !app.is_running() {
        return "stopped: press Start to begin a fresh page".to_string();
    }

    let mut status = String::from("writing");
    if let Some(deadline) = app.deadline() {
        let left = deadline.saturating_duration_since(now).as_secs_f64();
        status.push_str(&format!("   wipes in {:.1}s", left));
    }
    if app.session.clears > 0 {
        status.push_str(&format!("   wiped {}x", app.session.clears));
    }
    status
}

fn button(label: &str, enabled: bool) -> Paragraph<'_> {
    let style = if enabled {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    Paragraph::new(Span::styled(label, style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style),
        )
}

impl Widget for &WriterBlockApp {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = ScreenLayout::new(area);
        let running = self.is_running();

        let border_style = if running {
            Style::default().fg(Color::Green)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };

        let lines: Vec<Line> = self
            .editor
            .lines()
            .iter()
            .map(|l| Line::from(l.as_str()))
            .collect();

        let text = Paragraph::new(lines)
            .scroll(scroll_for(self, layout.text_inner()))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(TITLE)
                    .border_style(border_style),
            );
        text.render(layout.text, buf);

        button("Start", self.phase() == Phase::Open).render(layout.start_button, buf);
        button("Stop", running).render(layout.stop_button, buf);

        let status = Paragraph::new(Span::styled(
            status_line(self, Instant::now()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        status.render(layout.status, buf);

        let legend = Paragraph::new(Span::styled(
            "(F5) start / (F6) stop / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ));
        legend.render(layout.legend, buf);
    }
}

/// Renders the whole window and places the terminal cursor in the text region
pub fn draw(app: &WriterBlockApp, f: &mut Frame) {
    let area = f.area();
    f.render_widget(app, area);

    if app.is_running() {
        let inner = ScreenLayout::new(area).text_inner();
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        let (top, left) = scroll_for(app, inner);
        let (row, _) = app.editor.cursor();
        let x = inner.x + (app.editor.cursor_width() as u16).saturating_sub(left);
        let y = inner.y + (row as u16).saturating_sub(top);
        f.set_cursor_position((x, y));
    }
}
