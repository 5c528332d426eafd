//! Users list and its per-row delete controls

use std::collections::HashMap;
use std::sync::Arc;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use super::{events::AppEvent, page::Snapshot, pending::PendingFlag, ui::Styles};
use crate::api::UsersApi;
use crate::models::User;

const DELETE_LABEL: &str = "[Delete]";
const DELETING_LABEL: &str = "[Deleting…]";
const HIGHLIGHT_SYMBOL: &str = "> ";

/// One rendered user: email on the left, delete control on the right
#[derive(Debug, Clone, Copy)]
pub struct UserRow<'a> {
    pub user: &'a User,
    pub pending: bool,
}

impl<'a> UserRow<'a> {
    pub fn to_list_item(self, width: usize) -> ListItem<'a> {
        let (label, button_style) = if self.pending {
            (DELETING_LABEL, Styles::inactive())
        } else {
            (DELETE_LABEL, Styles::delete_button())
        };
        let email_style = if self.pending {
            Styles::inactive()
        } else {
            Styles::default()
        };

        let gap = width
            .saturating_sub(self.user.email.width() + label.width())
            .max(1);

        ListItem::new(Line::from(vec![
            Span::styled(self.user.email.as_str(), email_style),
            Span::raw(" ".repeat(gap)),
            Span::styled(label, button_style),
        ]))
    }
}

/// Row pending flags keyed by user id, plus keyboard selection
#[derive(Debug, Default)]
pub struct UsersList {
    rows: HashMap<String, PendingFlag>,
    pub state: ListState,
}

impl UsersList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_row_pending(&self, id: &str) -> bool {
        self.rows.get(id).is_some_and(PendingFlag::is_pending)
    }

    /// Start deleting `id`. Returns `false` if that row is already pending.
    pub fn delete(
        &mut self,
        id: &str,
        api: &Arc<dyn UsersApi>,
        events: &UnboundedSender<AppEvent>,
    ) -> bool {
        let flag = self.rows.entry(id.to_string()).or_default();
        if !flag.begin() {
            debug!("Delete of {} already pending, ignoring", id);
            return false;
        }
        info!("Deleting user {}", id);

        let api = Arc::clone(api);
        let events = events.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = api.delete_user(&id).await;
            if events.send(AppEvent::UserDeleted { id, result }).is_err() {
                debug!("UI gone before delete settled");
            }
        });

        true
    }

    pub fn on_deleted(&mut self, id: &str, refresh_seq: u64) {
        if let Some(flag) = self.rows.get_mut(id) {
            flag.await_refresh(refresh_seq);
        }
    }

    pub fn on_delete_failed(&mut self, id: &str) {
        if let Some(flag) = self.rows.get_mut(id) {
            flag.reset();
        }
    }

    pub fn settle_refresh(&mut self, seq: u64) {
        for flag in self.rows.values_mut() {
            flag.settle_refresh(seq);
        }
        self.rows.retain(|_, flag| flag.is_pending());
    }

    /// Keep the selection inside a newly applied list
    pub fn sync(&mut self, users: &[User]) {
        let selected = if users.is_empty() {
            None
        } else {
            Some(self.state.selected().unwrap_or(0).min(users.len() - 1))
        };
        self.state.select(selected);
    }

    pub fn selected_user<'a>(&self, users: &'a [User]) -> Option<&'a User> {
        self.state.selected().and_then(|i| users.get(i))
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn select_first(&mut self, len: usize) {
        if len > 0 {
            self.state.select(Some(0));
        }
    }

    pub fn select_last(&mut self, len: usize) {
        if len > 0 {
            self.state.select(Some(len - 1));
        }
    }

    /// Render the list region: loading placeholder, error panel, or rows
    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        snapshot: &Snapshot,
        refreshing: bool,
        focused: bool,
    ) {
        let border_style = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        match snapshot {
            Snapshot::Loading => {
                let block = Block::default()
                    .title("Users")
                    .borders(Borders::ALL)
                    .border_style(border_style);
                let loading = Paragraph::new("Loading...")
                    .style(Styles::warning())
                    .block(block);
                f.render_widget(loading, area);
            }
            Snapshot::Failed(message) => {
                let block = Block::default()
                    .title("Users")
                    .borders(Borders::ALL)
                    .border_style(Styles::error());
                let text = format!("Failed to load users: {}\n\nPress r to retry", message);
                let panel = Paragraph::new(text)
                    .style(Styles::error())
                    .wrap(Wrap { trim: true })
                    .block(block);
                f.render_widget(panel, area);
            }
            Snapshot::Resolved(users) => {
                let title = if refreshing {
                    format!("Users ({}) ⟳ refreshing", users.len())
                } else {
                    format!("Users ({})", users.len())
                };
                let block = Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(border_style);

                if users.is_empty() {
                    let empty = Paragraph::new("No users yet")
                        .style(Styles::inactive())
                        .block(block);
                    f.render_widget(empty, area);
                    return;
                }

                let width = (area.width as usize)
                    .saturating_sub(2 + HIGHLIGHT_SYMBOL.width());
                let items: Vec<ListItem> = users
                    .iter()
                    .map(|user| {
                        UserRow {
                            user,
                            pending: self.is_row_pending(&user.id),
                        }
                        .to_list_item(width)
                    })
                    .collect();

                let highlight = if focused {
                    Styles::selected()
                } else {
                    Styles::default()
                };
                let list = List::new(items)
                    .block(block)
                    .highlight_style(highlight)
                    .highlight_symbol(HIGHLIGHT_SYMBOL);

                f.render_stateful_widget(list, area, &mut self.state);
            }
        }
    }
}
