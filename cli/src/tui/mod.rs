//! Interactive selector.
//!
//! Scans once at startup, then lets the user filter, pick and kill one
//! process. Rendering is in `ui`, state transitions in `app`.

mod app;
mod ui;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use tracing::debug;
use tsunami_core::{Resolver, TerminateConfig, Terminator};

use app::App;

pub async fn run(config: TerminateConfig) -> Result<()> {
    let resolver = Resolver::system();
    let terminator = Terminator::system().with_poll_interval(config.poll_interval);

    let mut app = App::new();
    match resolver.scan().await {
        Ok(bindings) => app.set_bindings(bindings),
        Err(e) => app.set_error(e.to_string()),
    }

    enable_raw_mode()?;
    let mut terminal = match enter_screen(io::stdout()) {
        Ok(terminal) => terminal,
        Err(e) => {
            // Raw mode is already on
            let _ = disable_raw_mode();
            let _ = leave_screen(&mut io::stdout());
            return Err(e.into());
        }
    };

    let result = run_loop(&mut terminal, &mut app, &terminator, config.wait).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    leave_screen(terminal.backend_mut())?;
    terminal.show_cursor()?;
    result?;

    if let Some(message) = app.message() {
        println!("{}", message);
    }
    Ok(())
}

fn enter_screen<W: Write>(mut out: W) -> io::Result<Terminal<CrosstermBackend<W>>> {
    execute!(out, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(out))
}

fn leave_screen<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, LeaveAlternateScreen)
}

async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    terminator: &Terminator,
    wait: Duration,
) -> Result<()> {
    while !app.should_quit() {
        terminal.draw(|f| ui::draw(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(binding) = app.handle_key(key) {
            // Show the "Killing" state while escalation runs
            terminal.draw(|f| ui::draw(f, app))?;

            debug!(pid = binding.pid(), port = binding.port(), "Killing selected process");
            let result = terminator
                .terminate_with_escalation(binding.pid(), wait)
                .await
                .map_err(|e| e.to_string());
            app.finish_kill(result);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenTerminal;

    impl Write for BrokenTerminal {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_enter_screen_failure_is_returned() {
        let err = enter_screen(BrokenTerminal).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_leave_screen_writes_escape() {
        let mut out = Vec::new();
        leave_screen(&mut out).unwrap();
        assert_eq!(out, b"\x1b[?1049l");
    }
}
