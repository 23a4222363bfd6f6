//! TUI rendering.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use tsunami_core::PortClass;

use super::app::{App, State};
use crate::commands::list::truncate;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_table(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    match app.state() {
        State::Confirm => draw_confirm(f, app),
        State::Error => draw_error(f, app),
        _ => {}
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let title = Line::from(vec![
        Span::styled("TSUNAMI", Style::default().fg(Color::Cyan).bold()),
        Span::styled("  Filter: ", Style::default().fg(Color::Magenta)),
        Span::styled(format!("{}_", app.filter), Style::default().fg(Color::Magenta)),
    ]);

    let header = Paragraph::new(title).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(header, area);
}

fn port_color(class: PortClass) -> Color {
    match class {
        PortClass::System => Color::LightRed,
        PortClass::Registered => Color::LightGreen,
        PortClass::Ephemeral => Color::LightYellow,
    }
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let header_cells = ["PORT", "PID", "PROCESS", "USER", "PROTO"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::White).bold()));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let filtered = app.filtered_ports();
    let rows = filtered.iter().map(|binding| {
        Row::new(vec![
            Cell::from(binding.port().to_string())
                .style(Style::default().fg(port_color(binding.port_class()))),
            Cell::from(binding.pid().to_string()),
            Cell::from(truncate(binding.process_name(), 20)),
            Cell::from(binding.owner().to_string()),
            Cell::from(binding.transport().as_str()),
        ])
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(20),
        Constraint::Length(15),
        Constraint::Length(5),
    ];

    let title = if filtered.is_empty() {
        " No listening ports found ".to_string()
    } else {
        format!(" {} listening ", filtered.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        )
        .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White).bold())
        .highlight_symbol("▸ ");

    let mut state = TableState::default();
    if !filtered.is_empty() {
        state.select(Some(app.selected));
    }

    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let text = match (app.state(), app.target()) {
        (State::Killing, Some(target)) => {
            format!("Killing {} (PID {})...", target.process_name(), target.pid())
        }
        (State::Confirm, _) => "←/→ choose | enter apply | y yes | esc cancel".to_string(),
        (State::Error, _) => "Press any key to quit".to_string(),
        _ => "↑/↓ navigate | enter select | type to filter | esc clear/quit".to_string(),
    };

    let footer = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(footer, area);
}

fn draw_confirm(f: &mut Frame, app: &App) {
    let Some(target) = app.target() else {
        return;
    };

    let (active, inactive) = (
        Style::default().bg(Color::Blue).fg(Color::White).bold(),
        Style::default().bg(Color::DarkGray).fg(Color::Gray),
    );
    let (yes_style, no_style) = if app.confirm_yes() {
        (active, inactive)
    } else {
        (inactive, active)
    };

    let text = vec![
        Line::from(Span::styled(
            "Kill process?",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::default(),
        Line::from(target.to_string()),
        Line::default(),
        Line::from(vec![
            Span::styled("  Yes  ", yes_style),
            Span::raw("   "),
            Span::styled("  No  ", no_style),
        ]),
    ];

    let area = centered(f.area(), 50, 9);
    let modal = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Gray)),
    );

    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}

fn draw_error(f: &mut Frame, app: &App) {
    let message = format!("Error: {}", app.error().unwrap_or("unknown error"));

    let area = centered(f.area(), 60, 7);
    let modal = Paragraph::new(message)
        .style(Style::default().fg(Color::LightRed).bold())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::LightRed)),
        );

    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}

/// A `width` x `height` rectangle centered in `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use tsunami_core::{PortBinding, Transport};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let mut app = App::new();
        app.set_bindings(vec![PortBinding::new(
            3000,
            42156,
            "node",
            "mike",
            Transport::Tcp,
            "*",
        )]);
        app
    }

    #[test]
    fn test_list_view() {
        let screen = render(&app());
        assert!(screen.contains("TSUNAMI"));
        assert!(screen.contains("PROCESS"));
        assert!(screen.contains("42156"));
        assert!(screen.contains("node"));
    }

    #[test]
    fn test_empty_view() {
        let screen = render(&App::new());
        assert!(screen.contains("No listening ports found"));
    }

    #[test]
    fn test_confirm_view() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let screen = render(&app);
        assert!(screen.contains("Kill process?"));
        assert!(screen.contains("node (PID 42156) on port 3000"));
        assert!(screen.contains("Yes"));
    }

    #[test]
    fn test_error_view() {
        let mut app = app();
        app.set_error("lsof not found");

        let screen = render(&app);
        assert!(screen.contains("Error: lsof not found"));
    }

    #[test]
    fn test_centered_fits_small_area() {
        let rect = centered(Rect::new(0, 0, 20, 5), 50, 9);
        assert_eq!(rect, Rect::new(0, 0, 20, 5));
    }
}
