//! Offer list with a detail pane: the public board and the company's own
//! offers.

use bolsa_core::offer::Offer;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::App;

/// Render the offer list and the offer under the cursor into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  draw_list(f, cols[0], app);
  match app.cursor_offer() {
    Some(offer) => draw_detail(f, cols[1], app, offer),
    None => draw_empty_detail(f, cols[1]),
  }
}

fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let offers = app.visible_offers();

  let label = if app.search_results.is_some() { "Search results" } else { "Offers" };
  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" {label} ({}) /{}{} ", offers.len(), app.filter, if app.filter_active { "_" } else { "" })
  } else {
    format!(" {label} ({}) ", offers.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = offers
    .iter()
    .map(|offer| {
      let mut spans = vec![Span::raw(offer.title.clone())];
      if !offer.active {
        spans.push(Span::styled("  inactive", Style::default().fg(Color::DarkGray)));
      }
      if app.has_applied(offer.id) {
        spans.push(Span::styled("  ✓ applied", Style::default().fg(Color::Green)));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let list = List::new(items).block(block).highlight_style(
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );

  let mut state = ListState::default();
  if !offers.is_empty() {
    state.select(Some(app.cursor));
  }
  f.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App, offer: &Offer) {
  let block = Block::default()
    .title(format!(" #{} ", offer.id))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let label = Style::default().fg(Color::Cyan);
  let mut lines = vec![
    Line::from(Span::styled(
      offer.title.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::default(),
  ];
  lines.extend(offer.description.lines().map(|l| Line::from(l.to_owned())));
  lines.push(Line::default());

  let published = offer
    .published_at
    .map(|t| t.format("%Y-%m-%d").to_string())
    .unwrap_or_else(|| "—".into());
  let owner = offer
    .owner()
    .map(|o| o.to_string())
    .unwrap_or_else(|| "unknown".into());
  lines.push(Line::from(vec![Span::styled("Published  ", label), Span::raw(published)]));
  lines.push(Line::from(vec![Span::styled("Posted by  ", label), Span::raw(owner)]));
  lines.push(Line::from(vec![
    Span::styled("Status     ", label),
    Span::raw(if offer.active { "active" } else { "inactive" }),
  ]));

  lines.push(Line::default());
  if offer.required_activities.is_empty() {
    lines.push(Line::from(Span::styled(
      "No required activities",
      Style::default().fg(Color::DarkGray),
    )));
  } else {
    lines.push(Line::from(Span::styled("Requires", label)));
    for required in &offer.required_activities {
      let name = required
        .name
        .clone()
        .unwrap_or_else(|| app.activity_name(required.activity_id));
      lines.push(Line::from(format!(
        "  • {name} (#{}): {}",
        required.activity_id, required.level
      )));
    }
  }

  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(Line::from(vec![Span::styled(
      "No offers to show. Press g to refresh.",
      Style::default().fg(Color::DarkGray),
    )])),
    inner,
  );
}
