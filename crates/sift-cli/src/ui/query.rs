//! Query view: question and file picker inputs over the schema, uploaded
//! documents and the latest results.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use sift_core::{
  document::{ACCEPTED_EXTENSIONS, DocumentSearchResult},
  query::QueryResult,
};
use sift_session::SessionSnapshot;

use super::{connect::schema_lines, dim, input};
use crate::app::{App, QueryField};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the query view into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App, snap: &SessionSnapshot) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3), // question
      Constraint::Length(3), // file picker
      Constraint::Min(0),    // body
    ])
    .split(area);

  let editable = !snap.is_loading();
  f.render_widget(
    input(
      "Ask a question",
      &app.query_input,
      editable && app.query_field == QueryField::Question,
    ),
    rows[0],
  );

  let extensions: Vec<String> = ACCEPTED_EXTENSIONS.iter().map(|e| format!(".{e}")).collect();
  let picker_title = format!(
    "Add document ({}), {} pending",
    extensions.join(","),
    app.pending.len()
  );
  f.render_widget(
    input(
      &picker_title,
      &app.file_input,
      editable && app.query_field == QueryField::Files,
    ),
    rows[1],
  );

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
    .split(rows[2]);
  draw_sidebar(f, cols[0], app, snap);

  let results = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(cols[1]);
  draw_query_result(f, results[0], snap.state.query_result.as_ref());
  draw_document_results(f, results[1], snap.state.document_results.as_ref());
}

fn pane(title: &str) -> Block<'_> {
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

// ─── Sidebar ──────────────────────────────────────────────────────────────────

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App, snap: &SessionSnapshot) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);

  let block = pane("Schema");
  let inner = block.inner(rows[0]);
  f.render_widget(block, rows[0]);
  if let Some(schema) = &snap.state.schema {
    f.render_widget(Paragraph::new(schema_lines(schema)), inner);
  }

  // Uploaded documents first, then the batch waiting to go.
  let mut items: Vec<ListItem> = snap
    .state
    .documents
    .iter()
    .map(|doc| {
      ListItem::new(Line::from(vec![
        Span::raw(doc.filename.clone()),
        Span::styled(
          format!("  {}", doc.content_type),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();
  items.extend(app.pending.iter().map(|file| {
    ListItem::new(Span::styled(
      format!("+ {}", file.filename),
      Style::default().fg(Color::Yellow),
    ))
  }));

  let title = format!("Documents ({})", snap.state.documents.len());
  f.render_widget(List::new(items).block(pane(&title)), rows[1]);
}

// ─── Results ──────────────────────────────────────────────────────────────────

fn draw_query_result(f: &mut Frame, area: Rect, result: Option<&QueryResult>) {
  let block = pane("Query result");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(result) = result else {
    f.render_widget(dim("Press Enter to run your question against the database."), inner);
    return;
  };

  let label = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let mut lines = vec![
    Line::from(vec![Span::styled("Question  ", label), Span::raw(&result.original_query)]),
    Line::from(vec![Span::styled("Type      ", label), Span::raw(&result.query_type)]),
    Line::from(vec![
      Span::styled("Time      ", label),
      Span::raw(result.performance_metrics.execution_time_label()),
    ]),
  ];
  if !result.sources.is_empty() {
    lines.push(Line::from(vec![
      Span::styled("Sources   ", label),
      Span::raw(result.sources.join(", ")),
    ]));
  }
  lines.push(Line::from(""));
  lines.extend(
    result
      .sql_query
      .lines()
      .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Green)))),
  );

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_document_results(f: &mut Frame, area: Rect, results: Option<&DocumentSearchResult>) {
  let Some(results) = results else {
    f.render_widget(
      dim("Press Ctrl-S to search uploaded documents.").block(pane("Document search")),
      area,
    );
    return;
  };

  let title = format!("Document search: {}", results.query);
  if results.documents.is_empty() {
    f.render_widget(dim("No matching documents.").block(pane(&title)), area);
    return;
  }

  let items: Vec<ListItem> = results
    .documents
    .iter()
    .map(|hit| {
      ListItem::new(vec![
        Line::from(vec![
          Span::styled(
            hit.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
          ),
          Span::styled(
            format!("  {}", hit.relevance_label()),
            Style::default().fg(Color::Green),
          ),
        ]),
        Line::from(Span::styled(
          format!("  {}", hit.content),
          Style::default().fg(Color::Gray),
        )),
      ])
    })
    .collect();
  f.render_widget(List::new(items).block(pane(&title)), area);
}
