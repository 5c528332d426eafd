//! Main TUI application state and logic

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, info};

use super::{
    components::{StatusDisplay, StatusMessage},
    events::AppEvent,
    page::{Focus, UsersPage},
    ui::centered_rect,
};
use crate::api::UsersApi;
use crate::config::Config;

const IDLE_HINT: &str =
    "Tab: switch focus | Enter: add | d: delete | r: refresh | ?: help | Esc: quit";

/// Main TUI application state
pub struct App {
    /// Application configuration
    pub config: Config,
    pub page: UsersPage,
    events: UnboundedReceiver<AppEvent>,
    pub focus: Focus,
    pub status: StatusDisplay,
    pub should_quit: bool,
    pub show_help_popup: bool,
}

impl App {
    /// Create the application. The initial users fetch starts here.
    pub fn new(config: Config, api: Arc<dyn UsersApi>) -> Self {
        let (tx, rx) = unbounded_channel();
        let status = StatusDisplay::new().with_auto_clear(config.status_timeout());

        Self {
            page: UsersPage::new(api, tx),
            events: rx,
            focus: Focus::Form,
            status,
            should_quit: false,
            show_help_popup: false,
            config,
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut input = EventStream::new();
        let mut ticker = tokio::time::interval(self.config.tick_rate());

        loop {
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                maybe_event = input.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) => self.handle_key_event(key),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                Some(event) = self.events.recv() => self.handle_app_event(event),
                _ = ticker.tick() => self.on_tick(),
            }

            if self.should_quit {
                info!("Quit requested");
                break;
            }
        }

        Ok(())
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        if let Some(message) = self.page.handle_event(event) {
            self.status.set_message(message);
        }
    }

    fn on_tick(&mut self) {
        if self.status.should_auto_clear() {
            self.status.clear();
        }
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.show_help_popup {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help_popup = false;
            }
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                return;
            }
            KeyCode::F(1) => {
                self.show_help_popup = true;
                return;
            }
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Form => self.handle_form_key(key),
            Focus::List => self.handle_list_key(key),
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Form => Focus::List,
            Focus::List => Focus::Form,
        };
        debug!("Focus: {:?}", self.focus);
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let field = &mut self.page.form.email;
        match key.code {
            KeyCode::Enter => {
                let email = field.value.clone();
                if self.page.submit_create() {
                    self.status
                        .set_message(StatusMessage::loading(format!("Creating user <{}>...", email)));
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                field.insert_char(c);
            }
            KeyCode::Backspace => field.delete_char(),
            KeyCode::Delete => field.delete_char_forward(),
            KeyCode::Left => field.move_cursor_left(),
            KeyCode::Right => field.move_cursor_right(),
            KeyCode::Home => field.move_cursor_to_start(),
            KeyCode::End => field.move_cursor_to_end(),
            KeyCode::Down => self.focus = Focus::List,
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let len = self.page.users().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.page.list.select_previous(len),
            KeyCode::Down | KeyCode::Char('j') => self.page.list.select_next(len),
            KeyCode::Home | KeyCode::Char('g') => self.page.list.select_first(len),
            KeyCode::End | KeyCode::Char('G') => self.page.list.select_last(len),
            KeyCode::Char('d') | KeyCode::Delete => {
                let email = self
                    .page
                    .list
                    .selected_user(self.page.users())
                    .map(|u| u.email.clone());
                if self.page.delete_selected() {
                    if let Some(email) = email {
                        self.status.set_message(StatusMessage::loading(format!(
                            "Deleting user <{}>...",
                            email
                        )));
                    }
                }
            }
            KeyCode::Char('r') => {
                self.page.refresh();
                self.status
                    .set_message(StatusMessage::loading("Refreshing users...".to_string()));
            }
            KeyCode::Char('a') => self.focus = Focus::Form,
            KeyCode::Char('?') => self.show_help_popup = true,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.page.render(f, chunks[0], self.focus);
        self.status.render(f, chunks[1], IDLE_HINT);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 60, area);

        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(help_text())
            .block(
                Block::default()
                    .title("Help - Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        f.render_widget(help_popup, popup_area);
    }
}

fn help_text() -> String {
    "Global:\n\
    Tab - Switch between form and list\n\
    Esc / Ctrl+C - Quit\n\
    F1 - Toggle this help\n\n\
    Form:\n\
    Type - Edit email\n\
    Enter - Add user\n\
    ↓ - Go to list\n\n\
    List:\n\
    ↑/↓, k/j - Move selection\n\
    d / Delete - Delete selected user\n\
    r - Refresh\n\
    a - Go to form\n\
    ? - Toggle this help\n\
    q - Quit"
        .to_string()
}
