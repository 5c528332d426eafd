//! Form for adding a user by email

use std::sync::Arc;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use super::{components::FormField, events::AppEvent, pending::PendingFlag, ui::Styles};
use crate::api::UsersApi;
use crate::models::NewUser;

/// Email input plus its submit button
#[derive(Debug)]
pub struct CreateForm {
    pub email: FormField,
    pending: PendingFlag,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateForm {
    pub fn new() -> Self {
        Self {
            email: FormField::new("New user").with_placeholder("email"),
            pending: PendingFlag::Idle,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Start creating a user from the current email text.
    ///
    /// The form is marked pending before the call is spawned. Returns
    /// `false` without touching the service when a create is already pending.
    pub fn submit(&mut self, api: &Arc<dyn UsersApi>, events: &UnboundedSender<AppEvent>) -> bool {
        if !self.pending.begin() {
            debug!("Create already pending, ignoring submit");
            return false;
        }
        self.email.set_disabled(true);

        let email = self.email.value.clone();
        let payload = NewUser::new(email.clone());
        info!("Creating user {} <{}>", payload.id, payload.email);

        let api = Arc::clone(api);
        let events = events.clone();
        tokio::spawn(async move {
            let result = api.create_user(payload).await;
            if events.send(AppEvent::UserCreated { email, result }).is_err() {
                debug!("UI gone before create settled");
            }
        });

        true
    }

    /// The create succeeded and fetch `refresh_seq` was started
    pub fn on_created(&mut self, refresh_seq: u64) {
        self.pending.await_refresh(refresh_seq);
        self.email.clear();
    }

    /// The create failed; re-enable the form and keep the typed email
    pub fn on_create_failed(&mut self) {
        self.pending.reset();
        self.email.set_disabled(false);
    }

    pub fn settle_refresh(&mut self, seq: u64) {
        if self.pending.settle_refresh(seq) {
            self.email.set_disabled(false);
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(12)])
            .split(area);

        self.email.render(f, chunks[0]);

        let (label, style) = if self.is_pending() {
            ("Adding…", Styles::inactive())
        } else {
            ("Add", Styles::success().add_modifier(Modifier::BOLD))
        };
        let button = Paragraph::new(label)
            .style(style)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Styles::inactive_border()),
            );
        f.render_widget(button, chunks[1]);
    }
}
