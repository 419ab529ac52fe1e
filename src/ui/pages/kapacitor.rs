use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::store::SourcesStore;
use crate::chronograf::Kapacitor;
use crate::ui::theme::{ComponentColor, Theme};
use crate::ui::widgets::{Dropdown, DropdownProps};
use crate::wizard::{Field, FieldValue, KapacitorChoice, KapacitorStep};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Dropdown,
    Field(Field),
    Next,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KapacitorAction {
    Change(Field, FieldValue),
    Choose(KapacitorChoice),
    Delete(Kapacitor),
    Next,
}

#[derive(Debug)]
pub struct KapacitorPage {
    pub focus: Focus,
    dropdown: Option<Dropdown<KapacitorChoice>>,
    /// Kapacitor awaiting delete confirmation
    pub confirm_delete: Option<Kapacitor>,
}

impl Default for KapacitorPage {
    fn default() -> Self {
        Self {
            focus: Focus::Field(Field::Url),
            dropdown: None,
            confirm_delete: None,
        }
    }
}

impl KapacitorPage {
    /// Rebuild the dropdown from the store; keeps its open/closed state
    pub fn sync(&mut self, step: &KapacitorStep, store: &SourcesStore) -> Result<()> {
        if step.on_boarding() {
            self.dropdown = None;
            return Ok(());
        }

        let children = step.dropdown_children(store);
        let selected = step.dropdown_selected_key();
        match self.dropdown.as_mut() {
            Some(dropdown) => {
                dropdown.set_children(children)?;
                dropdown.set_selected_key(selected);
            }
            None => {
                let props = DropdownProps {
                    button_color: ComponentColor::Primary,
                    width: 32,
                    icon: Some("⚡"),
                    ..Default::default()
                };
                self.dropdown = Some(Dropdown::with_props(children, selected, props)?);
            }
        }
        Ok(())
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order = Vec::new();
        if self.dropdown.is_some() {
            order.push(Focus::Dropdown);
        }
        order.extend(Field::ALL.iter().map(|f| Focus::Field(*f)));
        order.push(Focus::Next);
        order
    }

    fn move_focus(&mut self, step: isize) {
        let order = self.focus_order();
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(order.len() as isize);
        self.focus = order[next as usize];
    }

    pub fn dropdown_expanded(&self) -> bool {
        self.dropdown.as_ref().is_some_and(|d| d.is_expanded())
    }

    pub fn handle_key(&mut self, key: KeyEvent, step: &KapacitorStep) -> Option<KapacitorAction> {
        if let Some(kapacitor) = self.confirm_delete.take() {
            return matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'))
                .then_some(KapacitorAction::Delete(kapacitor));
        }

        if let Some(dropdown) = self.dropdown.as_mut().filter(|d| d.is_expanded()) {
            if matches!(key.code, KeyCode::Delete | KeyCode::Char('d')) {
                if let Some(KapacitorChoice::Existing(k)) = dropdown.highlighted_value() {
                    self.confirm_delete = Some(k.clone());
                    dropdown.collapse();
                }
                return None;
            }
            return dropdown.handle_key(key).map(KapacitorAction::Choose);
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(1);
                return None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(-1);
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Dropdown => {
                if let Some(dropdown) = self.dropdown.as_mut() {
                    dropdown.handle_key(key);
                }
                None
            }
            Focus::Next => {
                matches!(key.code, KeyCode::Enter).then_some(KapacitorAction::Next)
            }
            Focus::Field(field) => match (step.text_value(field), key.code) {
                (FieldValue::Bool(checked), KeyCode::Char(' ') | KeyCode::Enter) => {
                    Some(KapacitorAction::Change(field, FieldValue::Bool(!checked)))
                }
                (FieldValue::Text(mut text), KeyCode::Char(c)) => {
                    text.push(c);
                    Some(KapacitorAction::Change(field, FieldValue::Text(text)))
                }
                (FieldValue::Text(mut text), KeyCode::Backspace) => {
                    text.pop()?;
                    Some(KapacitorAction::Change(field, FieldValue::Text(text)))
                }
                (FieldValue::Text(_), KeyCode::Enter) => Some(KapacitorAction::Next),
                _ => None,
            },
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<KapacitorAction> {
        let dropdown = self.dropdown.as_mut()?;
        dropdown.handle_mouse(mouse).map(KapacitorAction::Choose)
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        step: &KapacitorStep,
        error: bool,
        theme: &Theme,
    ) -> Result<()> {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Kapacitor dropdown
                Constraint::Min(0),    // Form
                Constraint::Length(3), // Help
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "Connect to Kapacitor",
                Style::default()
                    .fg(theme.primary())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  (source: {})", step.source().name),
                Style::default().fg(theme.text_muted()),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        self.render_form(f, chunks[2], step, error, theme);
        render_help(f, chunks[3], self);

        // Drawn last so the open menu overlays the form
        if let Some(dropdown) = self.dropdown.as_mut() {
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Kapacitor")
                .border_style(focus_style(self.focus == Focus::Dropdown, theme));
            let inner = block.inner(chunks[1]);
            f.render_widget(block, chunks[1]);
            dropdown.render(f, inner, theme);
        }
        Ok(())
    }

    fn render_form(&self, f: &mut Frame, area: Rect, step: &KapacitorStep, error: bool, theme: &Theme) {
        let mut lines = vec![Line::from("")];

        for field in Field::ALL {
            let focused = self.focus == Focus::Field(field);
            let value = match step.text_value(field) {
                FieldValue::Text(text) if field == Field::Password => "*".repeat(text.chars().count()),
                FieldValue::Text(text) => text,
                FieldValue::Bool(true) => "[x]".to_string(),
                FieldValue::Bool(false) => "[ ]".to_string(),
            };
            let cursor = if focused && field != Field::InsecureSkipVerify {
                "_"
            } else {
                ""
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<16}", field.label()),
                    focus_style(focused, theme),
                ),
                Span::styled(value, Style::default().fg(theme.text())),
                Span::styled(cursor, Style::default().fg(theme.highlight())),
            ]));
        }

        lines.push(Line::from(""));
        let next_label = if step.kapacitor().exists() {
            "[ Update & Continue ]"
        } else {
            "[ Connect ]"
        };
        lines.push(Line::from(Span::styled(
            format!("  {}", next_label),
            focus_style(self.focus == Focus::Next, theme).add_modifier(Modifier::BOLD),
        )));

        if error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Could not connect with these settings",
                Style::default().fg(Color::Red),
            )));
        }

        let form = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Connection Details"),
        );
        f.render_widget(form, area);
    }
}

fn focus_style(focused: bool, theme: &Theme) -> Style {
    if focused {
        Style::default().fg(theme.highlight())
    } else {
        Style::default().fg(theme.text_muted())
    }
}

fn render_help(f: &mut Frame, area: Rect, page: &KapacitorPage) {
    let help_spans = if let Some(kapacitor) = page.confirm_delete.as_ref() {
        vec![
            Span::raw(format!("Delete {}? ", kapacitor.name)),
            Span::styled("y", Style::default().fg(Color::Red)),
            Span::raw(" Confirm  "),
            Span::styled("any key", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ]
    } else if page.dropdown_expanded() {
        vec![
            Span::styled("↑↓", Style::default().fg(Color::Yellow)),
            Span::raw(" Choose  "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Select  "),
            Span::styled("d", Style::default().fg(Color::Yellow)),
            Span::raw(" Delete  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Close"),
        ]
    } else {
        vec![
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" Next field  "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Connect  "),
            Span::styled("F1", Style::default().fg(Color::Yellow)),
            Span::raw(" Rules  "),
            Span::styled("Ctrl+C", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ]
    };

    let help = Paragraph::new(Line::from(help_spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chronograf::Source;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup(on_boarding: bool) -> (KapacitorStep, SourcesStore) {
        let source = Source {
            id: "1".to_string(),
            name: "influx".to_string(),
            kapacitors: vec![Kapacitor {
                id: Some("a".to_string()),
                name: "kapa".to_string(),
                active: true,
                ..Default::default()
            }],
            ..Default::default()
        };
        let store = SourcesStore::new(vec![source.clone()]);
        let step = KapacitorStep::new(source, &store, None, false, on_boarding);
        (step, store)
    }

    #[test]
    fn test_typing_edits_focused_field() {
        let (step, store) = setup(false);
        let mut page = KapacitorPage::default();
        page.sync(&step, &store).unwrap();

        page.focus = Focus::Field(Field::Name);
        let action = page.handle_key(key(KeyCode::Char('2')), &step);
        assert_eq!(
            action,
            Some(KapacitorAction::Change(
                Field::Name,
                FieldValue::Text("kapa2".to_string())
            ))
        );
    }

    #[test]
    fn test_checkbox_toggles() {
        let (step, store) = setup(false);
        let mut page = KapacitorPage::default();
        page.sync(&step, &store).unwrap();

        page.focus = Focus::Field(Field::InsecureSkipVerify);
        let action = page.handle_key(key(KeyCode::Char(' ')), &step);
        assert_eq!(
            action,
            Some(KapacitorAction::Change(
                Field::InsecureSkipVerify,
                FieldValue::Bool(true)
            ))
        );
    }

    #[test]
    fn test_focus_wraps_through_dropdown() {
        let (step, store) = setup(false);
        let mut page = KapacitorPage::default();
        page.sync(&step, &store).unwrap();

        page.focus = Focus::Next;
        page.handle_key(key(KeyCode::Tab), &step);
        assert_eq!(page.focus, Focus::Dropdown);
    }

    #[test]
    fn test_on_boarding_has_no_dropdown() {
        let (step, store) = setup(true);
        let mut page = KapacitorPage::default();
        page.sync(&step, &store).unwrap();

        page.focus = Focus::Next;
        page.handle_key(key(KeyCode::Tab), &step);
        assert_eq!(page.focus, Focus::Field(Field::Url));
    }

    #[test]
    fn test_dropdown_choose_add_new() {
        let (step, store) = setup(false);
        let mut page = KapacitorPage::default();
        page.sync(&step, &store).unwrap();
        page.focus = Focus::Dropdown;

        page.handle_key(key(KeyCode::Enter), &step);
        assert!(page.dropdown_expanded());

        page.handle_key(key(KeyCode::Down), &step);
        let action = page.handle_key(key(KeyCode::Enter), &step);
        assert_eq!(action, Some(KapacitorAction::Choose(KapacitorChoice::AddNew)));
        assert!(!page.dropdown_expanded());
    }

    #[test]
    fn test_dropdown_delete_highlighted() {
        let (step, store) = setup(false);
        let mut page = KapacitorPage::default();
        page.sync(&step, &store).unwrap();
        page.focus = Focus::Dropdown;

        page.handle_key(key(KeyCode::Enter), &step);
        assert_eq!(page.handle_key(key(KeyCode::Char('d')), &step), None);
        assert!(!page.dropdown_expanded());
        assert_eq!(
            page.confirm_delete.as_ref().and_then(|k| k.id.as_deref()),
            Some("a")
        );

        let action = page.handle_key(key(KeyCode::Char('y')), &step);
        match action {
            Some(KapacitorAction::Delete(k)) => assert_eq!(k.id.as_deref(), Some("a")),
            other => panic!("unexpected action {:?}", other),
        }
        assert!(page.confirm_delete.is_none());
    }

    #[test]
    fn test_dropdown_delete_cancelled() {
        let (step, store) = setup(false);
        let mut page = KapacitorPage::default();
        page.sync(&step, &store).unwrap();
        page.focus = Focus::Dropdown;

        page.handle_key(key(KeyCode::Enter), &step);
        page.handle_key(key(KeyCode::Char('d')), &step);
        assert_eq!(page.handle_key(key(KeyCode::Char('n')), &step), None);
        assert!(page.confirm_delete.is_none());
        assert_eq!(page.focus, Focus::Dropdown);
    }

    #[test]
    fn test_enter_on_next() {
        let (step, store) = setup(false);
        let mut page = KapacitorPage::default();
        page.sync(&step, &store).unwrap();
        page.focus = Focus::Next;
        assert_eq!(
            page.handle_key(key(KeyCode::Enter), &step),
            Some(KapacitorAction::Next)
        );
    }
}
