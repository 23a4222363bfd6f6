//! Interactive selector state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tsunami_core::{PortBinding, Termination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    List,
    Confirm,
    Killing,
    Error,
    Quit,
}

/// Selector state machine. Rendering lives in `ui`, I/O in `tui::run`.
#[derive(Debug)]
pub struct App {
    bindings: Vec<PortBinding>,
    filtered: Vec<PortBinding>,
    pub selected: usize,
    pub filter: String,
    state: State,
    target: Option<PortBinding>,
    confirm_yes: bool,
    error: Option<String>,
    message: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            filtered: Vec::new(),
            selected: 0,
            filter: String::new(),
            state: State::List,
            target: None,
            confirm_yes: true,
            error: None,
            message: None,
        }
    }

    pub fn set_bindings(&mut self, bindings: Vec<PortBinding>) {
        self.bindings = bindings;
        self.apply_filter();
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn should_quit(&self) -> bool {
        self.state == State::Quit
    }

    pub fn filtered_ports(&self) -> &[PortBinding] {
        &self.filtered
    }

    pub fn selected_binding(&self) -> Option<&PortBinding> {
        self.filtered.get(self.selected)
    }

    /// The binding being confirmed or killed.
    pub fn target(&self) -> Option<&PortBinding> {
        self.target.as_ref()
    }

    pub fn confirm_yes(&self) -> bool {
        self.confirm_yes
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Line to print after leaving the alternate screen.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.state = State::Error;
    }

    /// Handle a key press. Returns the binding to kill once confirmed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PortBinding> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.state = State::Quit;
            return None;
        }

        match self.state {
            State::List => {
                self.handle_list_key(key);
                None
            }
            State::Confirm => self.handle_confirm_key(key),
            State::Error => {
                self.state = State::Quit;
                None
            }
            State::Killing | State::Quit => None,
        }
    }

    /// Record the result of the kill started by `handle_key`.
    pub fn finish_kill(&mut self, result: Result<Termination, String>) {
        match result {
            Ok(_) => {
                self.message = self.target.as_ref().map(|t| format!("Killed {}", t));
                self.state = State::Quit;
            }
            Err(e) => self.set_error(e),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if self.filter.is_empty() {
                    self.state = State::Quit;
                } else {
                    self.filter.clear();
                    self.apply_filter();
                }
            }
            KeyCode::Backspace => {
                if self.filter.pop().is_some() {
                    self.apply_filter();
                }
            }
            KeyCode::Enter => {
                if let Some(binding) = self.selected_binding().cloned() {
                    self.target = Some(binding);
                    self.confirm_yes = true;
                    self.state = State::Confirm;
                }
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.filtered.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.filter.push(c);
                self.apply_filter();
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<PortBinding> {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h' | 'l') => {
                self.confirm_yes = !self.confirm_yes;
                None
            }
            KeyCode::Enter if self.confirm_yes => self.start_kill(),
            KeyCode::Char('y') => {
                self.confirm_yes = true;
                self.start_kill()
            }
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n' | 'q') => {
                self.cancel_confirm();
                None
            }
            _ => None,
        }
    }

    fn start_kill(&mut self) -> Option<PortBinding> {
        let target = self.target.clone()?;
        self.state = State::Killing;
        Some(target)
    }

    fn cancel_confirm(&mut self) {
        self.target = None;
        self.state = State::List;
    }

    fn apply_filter(&mut self) {
        self.filtered = self
            .bindings
            .iter()
            .filter(|b| b.matches_search(&self.filter))
            .cloned()
            .collect();

        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }
}
