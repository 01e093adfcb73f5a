//! TUI rendering: orchestrates all panes.

pub mod board;
pub mod form;
pub mod profile;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Pane, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    format!(" bolsa · {}", app.view.title()),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let who = match &app.principal {
    Some(p) => format!("{} ({})  {date} ", p.display_name, p.kind().role()),
    None => format!("not logged in  {date} "),
  };
  let right = Span::styled(who, Style::default().fg(Color::Gray));

  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  match app.pane() {
    Pane::Board => board::draw(f, area, app),
    Pane::Entry => {
      if let Some(entry) = &app.form {
        form::draw(f, centered(area, 60, entry.fields.len() as u16 * 3 + 2), entry);
      }
      return;
    }
    Pane::Tab(tab) => profile::draw(f, area, app, tab),
  }

  // Modal editors float over the pane that opened them.
  if let Some(modal) = &app.form {
    form::draw(f, centered(area, 60, modal.fields.len() as u16 * 3 + 2), modal);
  }
}

/// A `width`-percent wide, `height`-row tall rectangle in the middle of `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let height = height.min(area.height);
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Fill(1),
      Constraint::Length(height),
      Constraint::Fill(1),
    ])
    .split(area);
  Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - width) / 2),
      Constraint::Percentage(width),
      Constraint::Percentage((100 - width) / 2),
    ])
    .split(rows[1])[1]
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = if app.form.is_some() {
    ("FORM", "Tab/Enter next field  Shift-Tab back  Enter on last field submits  Esc cancel")
  } else if app.filter_active {
    ("FILTER", "Type to filter  Enter keep  Esc clear")
  } else {
    match app.pane() {
      Pane::Board if app.principal.is_some() => (
        "BOARD",
        "↑↓/jk move  / filter  s search  a apply  p profile  o logout  q quit",
      ),
      Pane::Board => (
        "BOARD",
        "↑↓/jk move  / filter  s search  l login  r register  q quit",
      ),
      Pane::Entry => ("FORM", "Esc back"),
      Pane::Tab(Tab::Offers) => (
        "OFFERS",
        "/ filter  s search  a apply  Tab next  h home  o logout",
      ),
      Pane::Tab(Tab::Applications) => ("APPLIED", "w withdraw  Tab next  h home  o logout"),
      Pane::Tab(Tab::Skills) => ("SKILLS", "n add  D remove  c new activity  Tab next"),
      Pane::Tab(Tab::Matches | Tab::SkillRecs) => ("RECS", "g refresh  Tab next  h home"),
      Pane::Tab(Tab::MyOffers) => (
        "OFFERS",
        "n new  e edit  t toggle  +/- activity  D delete  / filter  Tab next",
      ),
      Pane::Tab(Tab::Applicants) => (
        "APPLICANTS",
        "1 pending  2 reviewing  3 interview  4 hired  5 rejected  Tab next",
      ),
      Pane::Tab(Tab::Specialties) => ("SPECIALTIES", "n add  D remove  c new activity  Tab next"),
      Pane::Tab(Tab::Talent) => ("TALENT", "s search  Tab next  h home"),
    }
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let status_style = if app.status_msg.starts_with("Error") {
    Style::default().fg(Color::Red)
  } else {
    Style::default().fg(Color::DarkGray)
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), status_style);

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
