use anyhow::Result;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Mount a component behind an error boundary.
///
/// When `render` fails the error is logged and drawn in place of the
/// component so the rest of the screen keeps working.
pub fn guard<F>(f: &mut Frame, area: Rect, component: &str, render: F)
where
    F: FnOnce(&mut Frame, Rect) -> Result<()>,
{
    if let Err(err) = render(f, area) {
        tracing::error!(component, error = %format!("{:#}", err), "component failed to render");
        render_error(f, area, component, &err);
    }
}

fn render_error(f: &mut Frame, area: Rect, component: &str, err: &anyhow::Error) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} failed to render", component),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("{:#}", err)),
    ];

    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("Error"),
        );
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_guard_renders_error_panel() {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                guard(f, area, "Dropdown", |_, _| anyhow::bail!("boom"));
            })
            .unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Dropdown failed to render"));
        assert!(screen.contains("boom"));
    }
}
