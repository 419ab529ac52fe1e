use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::chronograf::{AlertRule, RuleStatus, Source};
use crate::ui::theme::Theme;

/// Callbacks the rules page forwards to its container
#[derive(Debug, Clone, PartialEq)]
pub enum RulesAction {
    Delete(AlertRule),
    ChangeStatus(AlertRule, RuleStatus),
    Refresh,
}

/// What the page shows, in priority order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RulesView {
    NoKapacitor,
    Loading,
    Table,
}

impl RulesView {
    pub fn resolve(has_kapacitor: bool, loading: bool) -> Self {
        if !has_kapacitor {
            RulesView::NoKapacitor
        } else if loading {
            RulesView::Loading
        } else {
            RulesView::Table
        }
    }
}

#[derive(Debug, Default)]
pub struct RulesPage {
    pub selected_index: usize,
    /// Rule awaiting delete confirmation
    pub confirm_delete: Option<String>,
}

impl RulesPage {
    pub fn handle_key(&mut self, key: KeyEvent, rules: &[AlertRule]) -> Option<RulesAction> {
        if let Some(id) = self.confirm_delete.take() {
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                let rule = rules.iter().find(|r| r.id == id)?;
                return Some(RulesAction::Delete(rule.clone()));
            }
            return None;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_index + 1 < rules.len() {
                    self.selected_index += 1;
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(rule) = rules.get(self.selected_index) {
                    self.confirm_delete = Some(rule.id.clone());
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('e') => {
                let rule = rules.get(self.selected_index)?;
                return Some(RulesAction::ChangeStatus(rule.clone(), rule.status.toggled()));
            }
            KeyCode::Char('r') => return Some(RulesAction::Refresh),
            _ => {}
        }
        None
    }

    /// Keep the selection inside the list after it shrank
    pub fn clamp(&mut self, len: usize) {
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }
}

pub fn render(
    f: &mut Frame,
    area: Rect,
    page: &RulesPage,
    source: Option<&Source>,
    rules: &[AlertRule],
    view: RulesView,
    theme: &Theme,
) -> Result<()> {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Help
        ])
        .split(area);

    render_title(f, chunks[0], source, theme);

    match view {
        RulesView::NoKapacitor => render_no_kapacitor(f, chunks[1], source),
        RulesView::Loading => {
            let loading = Paragraph::new("Loading...")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(loading, chunks[1]);
        }
        RulesView::Table => render_table(f, chunks[1], page, rules, theme),
    }

    render_help(f, chunks[2], page);
    Ok(())
}

fn render_title(f: &mut Frame, area: Rect, source: Option<&Source>, theme: &Theme) {
    let source_name = source.map(|s| s.name.as_str()).unwrap_or("no source");
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "Kapacitor Rules",
            Style::default()
                .fg(theme.primary())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({})", source_name),
            Style::default().fg(theme.text_muted()),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn render_no_kapacitor(f: &mut Frame, area: Rect, source: Option<&Source>) {
    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "The current source does not have an associated Kapacitor instance",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Alert rules are managed by Kapacitor."),
    ];
    if let Some(source) = source {
        content.push(Line::from(format!(
            "Press F2 to configure a Kapacitor for {}.",
            source.name
        )));
    }

    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Alert Rules"));
    f.render_widget(paragraph, area);
}

fn render_table(f: &mut Frame, area: Rect, page: &RulesPage, rules: &[AlertRule], theme: &Theme) {
    if rules.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No alert rules yet",
                Style::default().fg(Color::Yellow),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Alert Rules"));
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(["Name", "Trigger", "Message", "Alerts", "Enabled"]).style(
        Style::default()
            .fg(theme.primary())
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = rules
        .iter()
        .map(|rule| {
            let (enabled, color) = match rule.status {
                RuleStatus::Enabled => ("[x]", Color::Green),
                RuleStatus::Disabled => ("[ ]", Color::DarkGray),
            };
            let deleting = page.confirm_delete.as_deref() == Some(rule.id.as_str());
            let name_style = if deleting {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text())
            };
            Row::new(vec![
                Cell::from(rule.name.clone()).style(name_style),
                Cell::from(rule.trigger.clone()),
                Cell::from(rule.message.clone()),
                Cell::from(rule.alerts.join(", ")),
                Cell::from(enabled).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(25),
        Constraint::Length(10),
        Constraint::Percentage(35),
        Constraint::Percentage(20),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Alert Rules ({})", rules.len())),
        )
        .highlight_style(Style::default().fg(theme.highlight()).add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(Some(page.selected_index.min(rules.len() - 1)));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_help(f: &mut Frame, area: Rect, page: &RulesPage) {
    let help_spans = if page.confirm_delete.is_some() {
        vec![
            Span::styled("y", Style::default().fg(Color::Red)),
            Span::raw(" Confirm delete  "),
            Span::styled("any key", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ]
    } else {
        vec![
            Span::styled("↑↓", Style::default().fg(Color::Yellow)),
            Span::raw(" Select  "),
            Span::styled("Space", Style::default().fg(Color::Yellow)),
            Span::raw(" Enable/Disable  "),
            Span::styled("d", Style::default().fg(Color::Yellow)),
            Span::raw(" Delete  "),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw(" Refresh  "),
            Span::styled("F2", Style::default().fg(Color::Yellow)),
            Span::raw(" Kapacitor  "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ]
    };

    let help = Paragraph::new(Line::from(help_spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}
