//! Form rendering: one bordered input per field, the focused one highlighted.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style},
  widgets::{Block, Borders, Clear, Paragraph},
};

use crate::form::Form;

pub fn draw(f: &mut Frame, area: Rect, form: &Form) {
  let block = Block::default()
    .title(format!(" {} ", form.kind.title()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(area);
  f.render_widget(Clear, area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints(form.fields.iter().map(|_| Constraint::Length(3)))
    .split(inner);

  for (i, (field, row)) in form.fields.iter().zip(rows.iter()).enumerate() {
    let focused = i == form.focus;
    let border = if focused {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let text = if focused {
      format!("{}_", field.shown())
    } else {
      field.shown()
    };
    f.render_widget(
      Paragraph::new(text).block(
        Block::default()
          .title(format!(" {} ", field.label))
          .borders(Borders::ALL)
          .border_style(border),
      ),
      *row,
    );
  }
}
