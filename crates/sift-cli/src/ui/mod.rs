//! TUI rendering; orchestrates all panes.

pub mod connect;
pub mod query;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Gauge, Paragraph, Tabs},
};
use sift_core::status::{Notification, NotificationKind, OperationProgress};
use sift_session::{SessionSnapshot, View};

use crate::app::App;

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let snap = app.session.snapshot();
  let area = f.area();

  // Vertical stack: header, tabs, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // tabs
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app, &snap);
  draw_tabs(f, rows[1], &snap);
  match snap.view {
    View::Connect => connect::draw(f, rows[2], app, &snap),
    View::Query => query::draw(f, rows[2], app, &snap),
  }
  draw_status(f, rows[3], app, &snap);

  if let Some(progress) = &snap.progress {
    draw_loading(f, area, progress);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App, snap: &SessionSnapshot) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " sift",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let connection = if snap.state.is_connected() {
    Span::styled("  ● connected", Style::default().fg(Color::Green))
  } else {
    Span::styled("  ○ not connected", Style::default().fg(Color::Gray))
  };
  let right = Span::styled(
    format!("{}  {date} ", app.backend),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let used = left.width() + connection.width() + right.width();
  let pad = (area.width as usize).saturating_sub(used);

  let line = Line::from(vec![left, connection, Span::raw(" ".repeat(pad)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Tabs ─────────────────────────────────────────────────────────────────────

fn draw_tabs(f: &mut Frame, area: Rect, snap: &SessionSnapshot) {
  let connected = snap.state.is_connected();
  let titles = [
    Line::from(" F1 Connect "),
    // Greyed out until the gate would let the user in.
    Line::from(Span::styled(
      " F2 Query ",
      if connected {
        Style::default()
      } else {
        Style::default().fg(Color::DarkGray)
      },
    )),
  ];
  let selected = match snap.view {
    View::Connect => 0,
    View::Query => 1,
  };
  f.render_widget(
    Tabs::new(titles)
      .select(selected)
      .highlight_style(
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
      )
      .divider("│"),
    area,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App, snap: &SessionSnapshot) {
  let line = match (&snap.notification, app.status_msg.is_empty()) {
    (Some(notification), _) => notification_line(notification),
    (None, false) => Line::from(Span::styled(
      format!(" {}", app.status_msg),
      Style::default().fg(Color::Yellow),
    )),
    (None, true) => hints_line(snap.view),
  };
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

fn notification_line(notification: &Notification) -> Line<'_> {
  let (label, color) = match notification.kind {
    NotificationKind::Success => (" OK ", Color::Green),
    NotificationKind::Error => (" ERROR ", Color::Red),
  };
  Line::from(vec![
    Span::styled(
      label,
      Style::default()
        .fg(Color::Black)
        .bg(color)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {}", notification.message), Style::default().fg(color)),
  ])
}

fn hints_line(view: View) -> Line<'static> {
  let (mode_label, hints) = match view {
    View::Connect => ("CONNECT", "Type a connection string  Enter connect  F2 query  Ctrl-C quit"),
    View::Query => (
      "QUERY",
      "Enter run query  Ctrl-S search documents  Tab file picker  F1 connect  Ctrl-C quit",
    ),
  };
  Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray)),
  ])
}

// ─── Loading overlay ──────────────────────────────────────────────────────────

fn draw_loading(f: &mut Frame, area: Rect, progress: &OperationProgress) {
  let [popup] = Layout::horizontal([Constraint::Percentage(60)])
    .flex(Flex::Center)
    .areas(area);
  let [popup] = Layout::vertical([Constraint::Length(3)])
    .flex(Flex::Center)
    .areas(popup);

  f.render_widget(Clear, popup);
  f.render_widget(
    Gauge::default()
      .block(
        Block::default()
          .title(format!(" {} ", progress.label))
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Cyan)),
      )
      .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
      .ratio(progress.ratio()),
    popup,
  );
}

// ─── Shared widgets ───────────────────────────────────────────────────────────

/// A one-line bordered text input; the cursor mark shows only when focused.
pub(crate) fn input<'a>(title: &'a str, value: &'a str, focused: bool) -> Paragraph<'a> {
  let border = if focused { Color::Cyan } else { Color::DarkGray };
  let text = if focused {
    format!("{value}_")
  } else {
    value.to_owned()
  };
  Paragraph::new(text).block(
    Block::default()
      .title(format!(" {title} "))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border)),
  )
}

pub(crate) fn dim(text: impl Into<String>) -> Paragraph<'static> {
  Paragraph::new(text.into()).style(Style::default().fg(Color::DarkGray))
}
