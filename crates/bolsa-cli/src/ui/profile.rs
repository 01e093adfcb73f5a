//! Person and company profile views: a tab bar over one list per section.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Tabs},
};

use crate::{
  app::{App, Tab},
  ui::board,
};

pub fn draw(f: &mut Frame, area: Rect, app: &App, tab: Tab) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(0)])
    .split(area);

  draw_tabs(f, rows[0], app, tab);

  match tab {
    Tab::Offers | Tab::MyOffers => board::draw(f, rows[1], app),
    _ => draw_section(f, rows[1], app, tab),
  }
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App, tab: Tab) {
  let Some(principal) = &app.principal else { return };
  let tabs = Tab::for_kind(principal.kind());

  let summary = match (&app.person, &app.company) {
    (Some(person), _) => format!(
      " {} · DNI {} · {} ",
      person.full_name(),
      person.dni,
      person.ciudad.as_deref().unwrap_or("—")
    ),
    (None, Some(company)) => format!(
      " {} · {} · {} ",
      company.nombre,
      company.email,
      company.ciudad.as_deref().unwrap_or("—")
    ),
    (None, None) => format!(" {} ", principal.display_name),
  };

  let widget = Tabs::new(tabs.iter().map(|t| t.title()))
    .select(tabs.iter().position(|t| *t == tab).unwrap_or(0))
    .block(
      Block::default()
        .title(summary)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray)),
    )
    .highlight_style(
      Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD),
    );
  f.render_widget(widget, area);
}

fn draw_section(f: &mut Frame, area: Rect, app: &App, tab: Tab) {
  let dim = Style::default().fg(Color::DarkGray);

  let (title, items): (String, Vec<ListItem>) = match tab {
    Tab::Applications => (
      format!(" Applications ({}) ", app.own_applications().len()),
      app
        .own_applications()
        .into_iter()
        .map(|a| {
          let applied = a
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
          ListItem::new(Line::from(vec![
            Span::raw(app.offer_title(a.offer_id)),
            Span::styled(format!("  {}", a.status), status_style(a.status.is_terminal())),
            Span::styled(format!("  {applied}"), dim),
          ]))
        })
        .collect(),
    ),
    Tab::Skills => (
      format!(" Skills ({}) ", app.activities.skills().len()),
      app
        .activities
        .skills()
        .iter()
        .map(|s| {
          let level = s.level.map(|l| l.to_string()).unwrap_or_else(|| "—".into());
          let years = s.years.map(|y| format!("{y} y")).unwrap_or_default();
          ListItem::new(Line::from(vec![
            Span::raw(format!("{} (#{})", s.name, s.activity_id)),
            Span::styled(format!("  {level}  {years}"), dim),
            Span::styled(format!("  {}", s.area.as_deref().unwrap_or("")), dim),
          ]))
        })
        .collect(),
    ),
    Tab::Matches => (
      format!(" Offers matching your profile ({}) ", app.matches.len()),
      app
        .matches
        .iter()
        .map(|m| {
          ListItem::new(Line::from(vec![
            Span::styled(format!("{:>6.2}  ", m.score), Style::default().fg(Color::Green)),
            Span::raw(format!("{} (#{})", m.title, m.offer_id)),
          ]))
        })
        .collect(),
    ),
    Tab::SkillRecs => (
      format!(" Recommended skills ({}) ", app.recommendations.len()),
      app
        .recommendations
        .iter()
        .map(|r| {
          ListItem::new(vec![
            Line::from(vec![
              Span::styled(
                format!("{:>3}%  ", r.confidence_percent()),
                Style::default().fg(Color::Green),
              ),
              Span::raw(r.skill.clone()),
              Span::styled(format!("  {} offers", r.offers.len()), dim),
            ]),
            Line::from(Span::styled(format!("      {}", r.reason), dim)),
          ])
        })
        .collect(),
    ),
    Tab::Applicants => (
      format!(" Applicants ({}) ", app.applications.rows().len()),
      app
        .applications
        .rows()
        .iter()
        .map(|row| {
          ListItem::new(Line::from(vec![
            Span::raw(format!("{} (DNI {})", row.applicant.full_name(), row.applicant.dni)),
            Span::styled(format!("  {}", row.offer.title), dim),
            Span::styled(format!("  {}", row.status), status_style(row.status.is_terminal())),
          ]))
        })
        .collect(),
    ),
    Tab::Specialties => (
      format!(" Specialties ({}) ", app.activities.specialties().len()),
      app
        .activities
        .specialties()
        .iter()
        .map(|s| {
          ListItem::new(Line::from(vec![
            Span::raw(format!("{} (#{})", s.name, s.activity_id)),
            Span::styled(
              format!("  {}", s.specialization.as_deref().unwrap_or("")),
              dim,
            ),
          ]))
        })
        .collect(),
    ),
    Tab::Talent => (
      format!(" People ({}) ", app.talent.len()),
      app
        .talent
        .iter()
        .map(|p| {
          ListItem::new(Line::from(vec![
            Span::raw(format!("{} (DNI {})", p.full_name(), p.dni)),
            Span::styled(format!("  {}", p.email), dim),
            Span::styled(format!("  {}", p.ciudad.as_deref().unwrap_or("")), dim),
          ]))
        })
        .collect(),
    ),
    Tab::Offers | Tab::MyOffers => return,
  };

  draw_list(f, area, title, items, app.cursor);
}

fn status_style(terminal: bool) -> Style {
  if terminal {
    Style::default().fg(Color::Magenta)
  } else {
    Style::default().fg(Color::Yellow)
  }
}

fn draw_list(f: &mut Frame, area: Rect, title: String, items: Vec<ListItem>, cursor: usize) {
  let empty = items.is_empty();
  let list = List::new(items)
    .block(
      Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray)),
    )
    .highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    );

  let mut state = ListState::default();
  if !empty {
    state.select(Some(cursor));
  }
  f.render_stateful_widget(list, area, &mut state);
}
