pub mod boundary;
pub mod pages;
pub mod theme;
pub mod widgets;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use crate::app::{AppState, Page};
use crate::chronograf::ChronografClient;
use crate::config::AppConfig;
use crate::ui::pages::{KapacitorAction, KapacitorPage, RulesAction, RulesPage, RulesView};
use crate::ui::theme::Theme;

const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Per-page view state
#[derive(Debug, Default)]
struct Views {
    rules: RulesPage,
    kapacitor: KapacitorPage,
    show_quit_confirmation: bool,
}

/// Session flags resolved from the command line and the config file
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub show_new_kapacitor: bool,
    pub on_boarding: bool,
    /// False when the config file was unreadable and must be left alone
    pub save_config: bool,
}

pub async fn run(config: &mut AppConfig, options: RunOptions) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let client = ChronografClient::new(config.api_url.clone());
    let mut state = AppState::new(Box::new(client), config.source_id.clone());
    state.show_new_kapacitor = options.show_new_kapacitor;
    state.on_boarding = options.on_boarding;
    if options.show_new_kapacitor || options.on_boarding {
        state.current_page = Page::Kapacitor;
    }

    let result = run_app(&mut terminal, &mut state, config, options.save_config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn refresh(state: &mut AppState) {
    if let Err(err) = state.refresh().await {
        tracing::error!(error = %format!("{:#}", err), "refresh failed");
        state.rules_loading = false;
        state
            .notifications
            .notify(crate::app::notifications::load_failed("sources", &err));
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    config: &mut AppConfig,
    save_config: bool,
) -> Result<()> {
    let mut views = Views::default();
    let mut theme = config.get_theme();

    // Show the loading screen before the first round trip
    terminal.draw(|f| draw(f, state, &mut views, &theme))?;
    refresh(state).await;

    loop {
        state.notifications.prune();

        if state.last_update.elapsed() >= REFRESH_INTERVAL {
            refresh(state).await;
        }

        terminal.draw(|f| draw(f, state, &mut views, &theme))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if views.show_quit_confirmation {
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(()),
                        _ => views.show_quit_confirmation = false,
                    }
                    continue;
                }

                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    match key.code {
                        KeyCode::Char('c') => return Ok(()),
                        KeyCode::Char('r') => refresh(state).await,
                        _ => {}
                    }
                    continue;
                }

                match key.code {
                    KeyCode::F(1) => {
                        state.current_page = Page::Rules;
                        continue;
                    }
                    KeyCode::F(2) => {
                        state.current_page = Page::Kapacitor;
                        continue;
                    }
                    _ => {}
                }

                match state.current_page {
                    Page::Rules => {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc
                                if views.rules.confirm_delete.is_none() =>
                            {
                                views.show_quit_confirmation = true;
                                continue;
                            }
                            KeyCode::Char('t') if views.rules.confirm_delete.is_none() => {
                                theme = theme.next();
                                config.set_theme(theme);
                                if save_config {
                                    if let Err(err) = config.save() {
                                        tracing::warn!(error = %err, "failed to save theme");
                                    }
                                }
                                continue;
                            }
                            _ => {}
                        }
                        handle_rules_key(state, &mut views, key).await;
                    }
                    Page::Kapacitor => {
                        if key.code == KeyCode::Esc
                            && !views.kapacitor.dropdown_expanded()
                            && views.kapacitor.confirm_delete.is_none()
                        {
                            state.current_page = Page::Rules;
                            continue;
                        }
                        handle_kapacitor_key(state, &mut views, key).await;
                    }
                }
            }
            Event::Mouse(mouse) => {
                if state.current_page == Page::Kapacitor {
                    handle_kapacitor_mouse(state, &mut views, mouse).await;
                }
            }
            _ => {}
        }
    }
}

async fn handle_rules_key(state: &mut AppState, views: &mut Views, key: KeyEvent) {
    let Some(action) = views.rules.handle_key(key, &state.rules) else {
        return;
    };
    match action {
        RulesAction::Delete(rule) => state.delete_rule(&rule).await,
        RulesAction::ChangeStatus(rule, status) => state.change_rule_status(&rule, status).await,
        RulesAction::Refresh => refresh(state).await,
    }
    views.rules.clamp(state.rules.len());
}

async fn handle_kapacitor_key(state: &mut AppState, views: &mut Views, key: KeyEvent) {
    let Some(step) = state.step.as_ref() else {
        return;
    };
    let Some(action) = views.kapacitor.handle_key(key, step) else {
        return;
    };
    apply_kapacitor_action(state, action).await;
}

async fn handle_kapacitor_mouse(state: &mut AppState, views: &mut Views, mouse: MouseEvent) {
    if let Some(action) = views.kapacitor.handle_mouse(mouse) {
        apply_kapacitor_action(state, action).await;
    }
}

async fn apply_kapacitor_action(state: &mut AppState, action: KapacitorAction) {
    match action {
        KapacitorAction::Change(field, value) => {
            let error = &mut state.wizard_error;
            if let Some(step) = state.step.as_mut() {
                step.change_input(field, value, |e| *error = e);
            }
        }
        KapacitorAction::Choose(choice) => state.wizard_choose(choice).await,
        KapacitorAction::Delete(kapacitor) => state.wizard_delete(&kapacitor).await,
        KapacitorAction::Next => {
            if let Some(result) = state.wizard_next().await {
                tracing::info!(error = result.error, "kapacitor step finished");
                if !result.error && !state.on_boarding {
                    state.current_page = Page::Rules;
                }
            }
        }
    }
}

fn draw(f: &mut Frame, state: &AppState, views: &mut Views, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Notifications
        ])
        .split(f.size());

    render_header(f, chunks[0], state, theme);

    match state.current_page {
        Page::Rules => boundary::guard(f, chunks[1], "Alert rules", |f, area| {
            let view = RulesView::resolve(state.has_kapacitor(), state.rules_loading);
            pages::rules::render(
                f,
                area,
                &views.rules,
                state.current_source(),
                &state.rules,
                view,
                theme,
            )
        }),
        Page::Kapacitor => boundary::guard(f, chunks[1], "Kapacitor step", |f, area| {
            let Some(step) = state.step.as_ref() else {
                let waiting = Paragraph::new("Waiting for sources...")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL));
                f.render_widget(waiting, area);
                return Ok(());
            };
            views.kapacitor.sync(step, &state.store)?;
            views
                .kapacitor
                .render(f, area, step, state.wizard_error, theme)
        }),
    }

    render_notification(f, chunks[2], state);

    if views.show_quit_confirmation {
        render_quit_confirmation(f, f.size());
    }
}

fn render_header(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let page = match state.current_page {
        Page::Rules => "Alert Rules",
        Page::Kapacitor => "Kapacitor",
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "kapactl",
            Style::default()
                .fg(theme.primary())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" v{} - {}", env!("CARGO_PKG_VERSION"), page),
            Style::default().fg(theme.text()),
        ),
        Span::styled(
            format!(" [{}]", theme.as_str()),
            Style::default().fg(theme.text_muted()),
        ),
        Span::styled(
            state
                .refreshed_at
                .map(|at| format!(" updated {}", at.format("%H:%M:%S")))
                .unwrap_or_default(),
            Style::default().fg(theme.text_muted()),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border())),
    );

    f.render_widget(header, area);
}

fn render_notification(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(notification) = state.notifications.current() else {
        return;
    };
    let line = Paragraph::new(Span::styled(
        notification.message.as_str(),
        Style::default().fg(notification.kind.color()),
    ))
    .alignment(Alignment::Center);
    f.render_widget(line, area);
}

fn render_quit_confirmation(f: &mut Frame, area: Rect) {
    // Create a centered dialog
    let dialog_width = 40.min(area.width);
    let dialog_height = 5.min(area.height);
    let dialog_area = Rect {
        x: area.x + (area.width.saturating_sub(dialog_width)) / 2,
        y: area.y + (area.height.saturating_sub(dialog_height)) / 2,
        width: dialog_width,
        height: dialog_height,
    };

    let prompt = Paragraph::new(vec![
        Line::from("Are you sure you want to quit?"),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "Y",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("es / "),
            Span::styled(
                "N",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw("o"),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Quit")
            .border_style(Style::default().fg(Color::Yellow)),
    );

    f.render_widget(Clear, dialog_area);
    f.render_widget(prompt, dialog_area);
}
