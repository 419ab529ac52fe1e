//! Reusable dropdown: a trigger button plus an optional menu.
//!
//! The only interaction state is `expanded`. The trigger toggles it, any
//! click outside the widget collapses it, and choosing an item collapses it
//! after reporting the chosen value back to the caller.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use thiserror::Error;

use crate::ui::theme::{ComponentColor, ComponentSize, MenuColor, Theme};

pub const NO_CHILDREN_MESSAGE: &str =
    "Dropdowns require at least 1 child element. We recommend using Dropdown.Item and/or Dropdown.Divider.";
pub const INVALID_CHILD_MESSAGE: &str =
    "Expected children of type <Dropdown.Item /> or <Dropdown.Divider />";

const PLACEHOLDER: &str = "Select...";

#[derive(Debug, Error, PartialEq)]
pub enum DropdownError {
    #[error("{}", NO_CHILDREN_MESSAGE)]
    NoChildren,
    #[error("{} (got '{0}')", INVALID_CHILD_MESSAGE)]
    InvalidChild(String),
}

/// Kind tag carried by every child descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChildKind {
    Item,
    Divider,
}

impl ChildKind {
    pub fn parse(tag: &str) -> Result<Self, DropdownError> {
        match tag {
            "item" => Ok(ChildKind::Item),
            "divider" => Ok(ChildKind::Divider),
            other => Err(DropdownError::InvalidChild(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropdownChild<V> {
    Item { key: String, value: V, label: String },
    Divider { key: String },
}

impl<V> DropdownChild<V> {
    pub fn item(key: impl Into<String>, value: V, label: impl Into<String>) -> Self {
        DropdownChild::Item {
            key: key.into(),
            value,
            label: label.into(),
        }
    }

    pub fn divider(key: impl Into<String>) -> Self {
        DropdownChild::Divider { key: key.into() }
    }

    /// Build a child from a textual kind tag, rejecting unknown kinds
    pub fn from_tag(
        tag: &str,
        key: impl Into<String>,
        value: V,
        label: impl Into<String>,
    ) -> Result<Self, DropdownError> {
        Ok(match ChildKind::parse(tag)? {
            ChildKind::Item => Self::item(key, value, label),
            ChildKind::Divider => Self::divider(key),
        })
    }

    pub fn kind(&self) -> ChildKind {
        match self {
            DropdownChild::Item { .. } => ChildKind::Item,
            DropdownChild::Divider { .. } => ChildKind::Divider,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            DropdownChild::Item { key, .. } | DropdownChild::Divider { key } => key,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            DropdownChild::Item { label, .. } => Some(label),
            DropdownChild::Divider { .. } => None,
        }
    }
}

/// Presentation options
#[derive(Debug, Clone)]
pub struct DropdownProps {
    pub button_color: ComponentColor,
    pub button_size: ComponentSize,
    pub menu_color: MenuColor,
    pub disabled: bool,
    pub width: u16,
    pub wrap_text: bool,
    pub max_menu_height: u16,
    pub icon: Option<&'static str>,
}

impl Default for DropdownProps {
    fn default() -> Self {
        Self {
            button_color: ComponentColor::Default,
            button_size: ComponentSize::Small,
            menu_color: MenuColor::Sapphire,
            disabled: false,
            width: 24,
            wrap_text: false,
            max_menu_height: 10,
            icon: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dropdown<V> {
    children: Vec<DropdownChild<V>>,
    selected_key: String,
    expanded: bool,
    highlighted: usize,
    scroll: usize,
    props: DropdownProps,
    button_area: Rect,
    menu_area: Option<Rect>,
}

impl<V: Clone> Dropdown<V> {
    pub fn new(
        children: Vec<DropdownChild<V>>,
        selected_key: impl Into<String>,
    ) -> Result<Self, DropdownError> {
        Self::with_props(children, selected_key, DropdownProps::default())
    }

    pub fn with_props(
        children: Vec<DropdownChild<V>>,
        selected_key: impl Into<String>,
        props: DropdownProps,
    ) -> Result<Self, DropdownError> {
        validate_children(&children)?;
        Ok(Self {
            children,
            selected_key: selected_key.into(),
            expanded: false,
            highlighted: 0,
            scroll: 0,
            props,
            button_area: Rect::default(),
            menu_area: None,
        })
    }

    /// Swap the menu entries, e.g. after the backing list was refreshed
    pub fn set_children(&mut self, children: Vec<DropdownChild<V>>) -> Result<(), DropdownError> {
        validate_children(&children)?;
        self.children = children;
        self.highlighted = self.highlighted.min(self.children.len() - 1);
        Ok(())
    }

    pub fn set_selected_key(&mut self, key: impl Into<String>) {
        self.selected_key = key.into();
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn selected_key(&self) -> &str {
        &self.selected_key
    }

    /// Linear scan for the child whose key is selected
    pub fn selected_child(&self) -> Option<&DropdownChild<V>> {
        self.children.iter().find(|c| c.key() == self.selected_key)
    }

    pub fn highlighted_key(&self) -> Option<&str> {
        self.children.get(self.highlighted).map(|c| c.key())
    }

    pub fn highlighted_value(&self) -> Option<&V> {
        match self.children.get(self.highlighted)? {
            DropdownChild::Item { value, .. } => Some(value),
            DropdownChild::Divider { .. } => None,
        }
    }

    pub fn toggle(&mut self) {
        if self.props.disabled {
            return;
        }
        self.expanded = !self.expanded;
        if self.expanded {
            self.highlighted = self
                .children
                .iter()
                .position(|c| c.key() == self.selected_key && c.kind() == ChildKind::Item)
                .or_else(|| self.first_item())
                .unwrap_or(0);
        }
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
        self.menu_area = None;
    }

    /// Select an item by key, returning its value for the caller's change handler
    pub fn select(&mut self, key: &str) -> Option<V> {
        let value = self.children.iter().find_map(|c| match c {
            DropdownChild::Item { key: k, value, .. } if k == key => Some(value.clone()),
            _ => None,
        })?;
        self.selected_key = key.to_string();
        self.collapse();
        Some(value)
    }

    /// Keyboard interaction; returns a value when an item was chosen
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<V> {
        if !self.expanded {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                self.toggle();
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => self.collapse(),
            KeyCode::Up | KeyCode::Char('k') => self.move_highlight(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_highlight(1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let key = self.highlighted_key()?.to_string();
                return self.select(&key);
            }
            _ => {}
        }
        None
    }

    /// Mouse interaction against the areas recorded by the last render
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<V> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let (column, row) = (mouse.column, mouse.row);

        if contains(self.button_area, column, row) {
            self.toggle();
            return None;
        }

        if let Some(menu) = self.menu_area.filter(|_| self.expanded) {
            if contains(menu, column, row) {
                if row <= menu.y || row >= menu.y + menu.height - 1 {
                    return None;
                }
                let index = self.scroll + (row - menu.y - 1) as usize;
                let key = match self.children.get(index) {
                    Some(DropdownChild::Item { key, .. }) => key.clone(),
                    _ => return None,
                };
                return self.select(&key);
            }
        }

        self.collapse();
        None
    }

    fn first_item(&self) -> Option<usize> {
        self.children.iter().position(|c| c.kind() == ChildKind::Item)
    }

    fn move_highlight(&mut self, step: isize) {
        let len = self.children.len() as isize;
        let mut index = self.highlighted as isize;
        for _ in 0..len {
            index = (index + step).rem_euclid(len);
            if self.children[index as usize].kind() == ChildKind::Item {
                self.highlighted = index as usize;
                return;
            }
        }
    }

    fn visible_rows(&self) -> usize {
        (self.props.max_menu_height.max(1) as usize).min(self.children.len())
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, theme: &Theme) {
        let width = self.props.width.min(area.width).max(1);
        self.button_area = Rect {
            x: area.x,
            y: area.y,
            width,
            height: 1.min(area.height),
        };
        self.render_button(f, theme);

        if !self.expanded {
            self.menu_area = None;
            return;
        }
        self.render_menu(f);
    }

    fn render_button(&self, f: &mut Frame, theme: &Theme) {
        let padding = " ".repeat(self.props.button_size.padding() as usize);
        let label = self
            .selected_child()
            .and_then(|c| c.label())
            .unwrap_or(PLACEHOLDER);
        let caret = if self.expanded { "▴" } else { "▾" };

        let mut style = Style::default().fg(theme.component(self.props.button_color));
        if self.props.disabled {
            style = style.fg(theme.text_muted()).add_modifier(Modifier::DIM);
        } else if self.expanded {
            style = style.add_modifier(Modifier::REVERSED);
        }

        let mut spans = vec![Span::raw(padding.clone())];
        if let Some(icon) = self.props.icon {
            spans.push(Span::raw(format!("{} ", icon)));
        }
        spans.push(Span::raw(label.to_string()));
        spans.push(Span::raw(format!(" {}{}", caret, padding)));

        let button = Paragraph::new(Line::from(spans)).style(style);
        f.render_widget(button, self.button_area);
    }

    fn render_menu(&mut self, f: &mut Frame) {
        let screen = f.size();
        let rows = self.visible_rows();

        if self.highlighted < self.scroll {
            self.scroll = self.highlighted;
        } else if self.highlighted >= self.scroll + rows {
            self.scroll = self.highlighted + 1 - rows;
        }

        let longest = self
            .children
            .iter()
            .filter_map(|c| c.label())
            .map(|l| l.chars().count() as u16 + 4)
            .max()
            .unwrap_or(0);
        let width = if self.props.wrap_text {
            self.props.width
        } else {
            self.props.width.max(longest)
        };

        let y = self.button_area.y + 1;
        let menu = Rect {
            x: self.button_area.x,
            y,
            width,
            height: rows as u16 + 2,
        }
        .intersection(screen);
        if menu.height < 3 || menu.width < 3 {
            self.menu_area = None;
            return;
        }
        self.menu_area = Some(menu);

        let inner_width = menu.width.saturating_sub(2) as usize;
        let colors = self.props.menu_color;
        let items: Vec<ListItem> = self
            .children
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(rows)
            .map(|(index, child)| match child {
                DropdownChild::Divider { .. } => {
                    ListItem::new("─".repeat(inner_width)).style(colors.divider())
                }
                DropdownChild::Item { key, label, .. } => {
                    let selected = *key == self.selected_key;
                    let marker = if selected { "✓ " } else { "  " };
                    let style = if index == self.highlighted {
                        colors.highlighted()
                    } else if selected {
                        colors.selected()
                    } else {
                        colors.item()
                    };
                    let text = fit(label, inner_width.saturating_sub(2), self.props.wrap_text);
                    ListItem::new(format!("{}{}", marker, text)).style(style)
                }
            })
            .collect();

        f.render_widget(Clear, menu);
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .style(colors.item()),
        );
        f.render_widget(list, menu);
    }
}

fn validate_children<V>(children: &[DropdownChild<V>]) -> Result<(), DropdownError> {
    if children.is_empty() {
        return Err(DropdownError::NoChildren);
    }
    Ok(())
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height
}

fn fit(label: &str, width: usize, wrap: bool) -> String {
    if wrap || label.chars().count() <= width {
        return label.to_string();
    }
    let cut: String = label.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEventKind};
    use ratatui::{backend::TestBackend, Terminal};

    fn children() -> Vec<DropdownChild<String>> {
        vec![
            DropdownChild::item("jimmy", "jimmy".to_string(), "jimmy"),
            DropdownChild::item("johnny", "johnny".to_string(), "johnny"),
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn draw(dropdown: &mut Dropdown<String>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|f| dropdown.render(f, Rect::new(0, 0, 20, 1), &Theme::Dark))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_starts_collapsed() {
        let dropdown = Dropdown::new(children(), "johnny").unwrap();
        assert!(!dropdown.is_expanded());
    }

    #[test]
    fn test_no_children_fails() {
        let err = Dropdown::<String>::new(Vec::new(), "jimmy").unwrap_err();
        assert_eq!(err, DropdownError::NoChildren);
        assert_eq!(err.to_string(), NO_CHILDREN_MESSAGE);
    }

    #[test]
    fn test_unknown_child_tag_fails() {
        let err = DropdownChild::from_tag("button", "x", 1, "x").unwrap_err();
        assert!(err.to_string().starts_with(INVALID_CHILD_MESSAGE));

        let divider = DropdownChild::from_tag("divider", "d", 0, "").unwrap();
        assert_eq!(divider.kind(), ChildKind::Divider);
    }

    #[test]
    fn test_toggle_parity() {
        let mut dropdown = Dropdown::new(children(), "jimmy").unwrap();
        for n in 1..=6 {
            dropdown.toggle();
            assert_eq!(dropdown.is_expanded(), n % 2 == 1);
        }
    }

    #[test]
    fn test_select_sets_key_and_collapses() {
        let mut dropdown = Dropdown::new(children(), "jimmy").unwrap();
        dropdown.toggle();

        let value = dropdown.select("johnny");

        assert_eq!(value.as_deref(), Some("johnny"));
        assert_eq!(dropdown.selected_key(), "johnny");
        assert!(!dropdown.is_expanded());
    }

    #[test]
    fn test_select_unknown_key_is_ignored() {
        let mut dropdown = Dropdown::new(children(), "jimmy").unwrap();
        dropdown.toggle();

        assert!(dropdown.select("nobody").is_none());
        assert_eq!(dropdown.selected_key(), "jimmy");
        assert!(dropdown.is_expanded());
    }

    #[test]
    fn test_unmatched_selected_key_has_no_selection() {
        let mut dropdown = Dropdown::new(children(), "nobody").unwrap();
        assert!(dropdown.selected_child().is_none());
        assert!(draw(&mut dropdown).contains(PLACEHOLDER));
    }

    #[test]
    fn test_disabled_ignores_toggle() {
        let props = DropdownProps {
            disabled: true,
            ..Default::default()
        };
        let mut dropdown = Dropdown::with_props(children(), "jimmy", props).unwrap();
        dropdown.toggle();
        assert!(!dropdown.is_expanded());
    }

    #[test]
    fn test_keyboard_skips_dividers() {
        let mut items = children();
        items.insert(1, DropdownChild::divider("div"));
        let mut dropdown = Dropdown::new(items, "jimmy").unwrap();

        dropdown.handle_key(key(KeyCode::Enter));
        assert!(dropdown.is_expanded());
        assert_eq!(dropdown.highlighted_key(), Some("jimmy"));

        dropdown.handle_key(key(KeyCode::Down));
        assert_eq!(dropdown.highlighted_key(), Some("johnny"));

        let chosen = dropdown.handle_key(key(KeyCode::Enter));
        assert_eq!(chosen.as_deref(), Some("johnny"));
        assert!(!dropdown.is_expanded());
    }

    #[test]
    fn test_escape_collapses() {
        let mut dropdown = Dropdown::new(children(), "jimmy").unwrap();
        dropdown.toggle();
        dropdown.handle_key(key(KeyCode::Esc));
        assert!(!dropdown.is_expanded());
    }

    #[test]
    fn test_menu_hidden_while_collapsed() {
        let mut dropdown = Dropdown::new(children(), "johnny").unwrap();
        let screen = draw(&mut dropdown);
        assert!(screen.contains("johnny"));
        assert!(!screen.contains("jimmy"));
    }

    #[test]
    fn test_menu_shows_items_when_expanded() {
        let mut dropdown = Dropdown::new(children(), "johnny").unwrap();
        dropdown.toggle();
        let screen = draw(&mut dropdown);
        assert!(screen.contains("jimmy"));
        assert!(screen.contains("✓ johnny"));
    }

    #[test]
    fn test_mouse_trigger_and_outside_click() {
        let mut dropdown = Dropdown::new(children(), "jimmy").unwrap();
        draw(&mut dropdown);

        dropdown.handle_mouse(click(1, 0));
        assert!(dropdown.is_expanded());

        draw(&mut dropdown);
        dropdown.handle_mouse(click(35, 10));
        assert!(!dropdown.is_expanded());
    }

    #[test]
    fn test_mouse_select_item() {
        let mut dropdown = Dropdown::new(children(), "jimmy").unwrap();
        dropdown.toggle();
        draw(&mut dropdown);

        // menu border is on row 1, items start on row 2
        let chosen = dropdown.handle_mouse(click(2, 3));
        assert_eq!(chosen.as_deref(), Some("johnny"));
        assert!(!dropdown.is_expanded());
    }
}
