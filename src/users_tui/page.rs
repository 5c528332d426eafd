//! The users page: snapshot ownership and routing of settled work

use std::sync::Arc;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use super::{
    components::StatusMessage, create_form::CreateForm, events::AppEvent, ui::Styles,
    users_list::UsersList,
};
use crate::api::{ApiError, UsersApi};
use crate::models::User;

/// The page's current view of the user collection
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// No fetch has resolved yet
    Loading,
    Resolved(Vec<User>),
    /// The latest applied fetch failed
    Failed(String),
}

/// Which control receives key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    List,
}

/// Owns the current snapshot and starts list fetches.
///
/// Every fetch gets a sequence number; only the response to the most
/// recently issued fetch is applied. Superseded fetches still run to
/// completion but their results are dropped.
pub struct PageController {
    api: Arc<dyn UsersApi>,
    events: UnboundedSender<AppEvent>,
    issued_seq: u64,
    applied_seq: u64,
    snapshot: Snapshot,
}

impl PageController {
    /// Create the controller and start the initial fetch right away
    pub fn new(api: Arc<dyn UsersApi>, events: UnboundedSender<AppEvent>) -> Self {
        let mut controller = Self {
            api,
            events,
            issued_seq: 0,
            applied_seq: 0,
            snapshot: Snapshot::Loading,
        };
        controller.refetch_users();
        controller
    }

    /// Start a fetch of the full list and return its sequence number
    pub fn refetch_users(&mut self) -> u64 {
        self.issued_seq += 1;
        let seq = self.issued_seq;
        debug!("Fetching users (seq {})", seq);

        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.fetch_users().await;
            if events.send(AppEvent::UsersFetched { seq, result }).is_err() {
                debug!("UI gone before fetch {} settled", seq);
            }
        });

        seq
    }

    /// Apply a settled fetch. Returns `false` if it was superseded.
    pub fn apply_fetch(&mut self, seq: u64, result: Result<Vec<User>, ApiError>) -> bool {
        if seq != self.issued_seq {
            debug!(
                "Discarding users fetch {} (latest is {})",
                seq, self.issued_seq
            );
            return false;
        }

        self.applied_seq = seq;
        self.snapshot = match result {
            Ok(users) => {
                info!("Loaded {} users", users.len());
                Snapshot::Resolved(users)
            }
            Err(e) => {
                error!("Failed to fetch users: {}", e);
                Snapshot::Failed(e.to_string())
            }
        };
        true
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Users of the current snapshot, empty unless resolved
    pub fn users(&self) -> &[User] {
        match &self.snapshot {
            Snapshot::Resolved(users) => users,
            _ => &[],
        }
    }

    /// A newer fetch than the displayed one is outstanding
    pub fn is_refreshing(&self) -> bool {
        self.applied_seq < self.issued_seq
    }

    pub fn latest_seq(&self) -> u64 {
        self.issued_seq
    }
}

/// Create form and users list wired to one page controller
pub struct UsersPage {
    api: Arc<dyn UsersApi>,
    events: UnboundedSender<AppEvent>,
    pub controller: PageController,
    pub form: CreateForm,
    pub list: UsersList,
}

impl UsersPage {
    pub fn new(api: Arc<dyn UsersApi>, events: UnboundedSender<AppEvent>) -> Self {
        let controller = PageController::new(Arc::clone(&api), events.clone());
        Self {
            api,
            events,
            controller,
            form: CreateForm::new(),
            list: UsersList::new(),
        }
    }

    pub fn users(&self) -> &[User] {
        self.controller.users()
    }

    pub fn submit_create(&mut self) -> bool {
        self.form.submit(&self.api, &self.events)
    }

    pub fn delete_user(&mut self, id: &str) -> bool {
        self.list.delete(id, &self.api, &self.events)
    }

    pub fn delete_selected(&mut self) -> bool {
        let id = match self.list.selected_user(self.controller.users()) {
            Some(user) => user.id.clone(),
            None => return false,
        };
        self.delete_user(&id)
    }

    pub fn refresh(&mut self) -> u64 {
        self.controller.refetch_users()
    }

    /// Route one settled background result into the page.
    /// Returns a message for the status bar, if any.
    pub fn handle_event(&mut self, event: AppEvent) -> Option<StatusMessage> {
        match event {
            AppEvent::UsersFetched { seq, result } => {
                let failure = result.as_ref().err().map(|e| e.to_string());
                if !self.controller.apply_fetch(seq, result) {
                    return None;
                }

                // controls wait until the list they changed is on screen
                self.form.settle_refresh(seq);
                self.list.settle_refresh(seq);
                self.list.sync(self.controller.users());
                failure.map(|e| StatusMessage::error(format!("Failed to load users: {}", e)))
            }
            AppEvent::UserCreated { email, result } => match result {
                Ok(()) => {
                    let seq = self.controller.refetch_users();
                    self.form.on_created(seq);
                    Some(StatusMessage::success(format!("Created user <{}>", email)))
                }
                Err(e) => {
                    warn!("Failed to create user <{}>: {}", email, e);
                    self.form.on_create_failed();
                    Some(StatusMessage::error(format!(
                        "Failed to create user <{}>: {}",
                        email, e
                    )))
                }
            },
            AppEvent::UserDeleted { id, result } => {
                let label = self
                    .users()
                    .iter()
                    .find(|u| u.id == id)
                    .map(|u| format!("<{}>", u.email))
                    .unwrap_or_else(|| id.clone());
                match result {
                    Ok(()) => {
                        let seq = self.controller.refetch_users();
                        self.list.on_deleted(&id, seq);
                        Some(StatusMessage::success(format!("Deleted user {}", label)))
                    }
                    Err(e) => {
                        warn!("Failed to delete user {}: {}", id, e);
                        self.list.on_delete_failed(&id);
                        Some(StatusMessage::error(format!(
                            "Failed to delete user {}: {}",
                            label, e
                        )))
                    }
                }
            }
        }
    }

    /// Draw title, create form and users list
    pub fn render(&mut self, f: &mut Frame, area: Rect, focus: Focus) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(3),
            ])
            .split(area);

        f.render_widget(Paragraph::new("Users").style(Styles::title()), chunks[0]);

        self.form.email.set_focus(focus == Focus::Form);
        self.form.render(f, chunks[1]);

        let refreshing = self.controller.is_refreshing();
        self.list.render(
            f,
            chunks[2],
            self.controller.snapshot(),
            refreshing,
            focus == Focus::List,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{server_error, user, Call, FakeUsersApi};
    use crate::users_tui::components::StatusType;
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn page_with(api: &Arc<FakeUsersApi>) -> (UsersPage, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = unbounded_channel();
        let api: Arc<dyn UsersApi> = api.clone();
        (UsersPage::new(api, tx), rx)
    }

    /// Handle the next settled background result
    async fn pump(
        page: &mut UsersPage,
        rx: &mut UnboundedReceiver<AppEvent>,
    ) -> Option<StatusMessage> {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("channel closed");
        page.handle_event(event)
    }

    fn type_email(page: &mut UsersPage, email: &str) {
        for c in email.chars() {
            page.form.email.insert_char(c);
        }
    }

    #[tokio::test]
    async fn test_initial_fetch_starts_at_construction() {
        let api = Arc::new(FakeUsersApi::with_users(vec![user("1", "a@b.com")]));
        let (mut page, mut rx) = page_with(&api);

        assert_eq!(page.controller.snapshot(), &Snapshot::Loading);
        assert_eq!(page.controller.latest_seq(), 1);

        pump(&mut page, &mut rx).await;

        assert_eq!(api.fetch_count(), 1);
        assert_eq!(page.users(), &[user("1", "a@b.com")]);
        assert!(!page.controller.is_refreshing());
    }

    #[tokio::test]
    async fn test_create_then_refetch_and_clear() {
        let api = Arc::new(FakeUsersApi::default());
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;
        assert!(page.users().is_empty());

        let refetch = api.gate_fetch();
        type_email(&mut page, "a@b.com");
        assert!(page.submit_create());
        assert!(page.form.is_pending());
        assert!(page.form.email.is_disabled);

        let status = pump(&mut page, &mut rx).await.unwrap();
        assert_eq!(status.status_type, StatusType::Success);
        assert_eq!(page.form.email.value, "");
        assert!(page.form.is_pending());

        refetch.send(Ok(vec![user("1", "a@b.com")])).unwrap();
        pump(&mut page, &mut rx).await;

        assert_eq!(page.users().len(), 1);
        assert_eq!(page.users()[0].email, "a@b.com");
        assert!(!page.form.is_pending());
        assert!(!page.form.email.is_disabled);

        let calls = api.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::Fetch);
        match &calls[1] {
            Call::Create(new_user) => {
                assert_eq!(new_user.email, "a@b.com");
                assert_eq!(new_user.name, None);
                assert!(uuid::Uuid::parse_str(&new_user.id).is_ok());
            }
            other => panic!("expected create, got {other:?}"),
        }
        assert_eq!(calls[2], Call::Fetch);
    }

    #[tokio::test]
    async fn test_refetch_waits_for_create_to_settle() {
        let api = Arc::new(FakeUsersApi::default());
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;

        let create = api.gate_mutation();
        type_email(&mut page, "slow@b.com");
        page.submit_create();

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(api.mutation_count(), 1);
        assert_eq!(api.fetch_count(), 1);
        assert!(rx.try_recv().is_err());

        create.send(Ok(())).unwrap();
        pump(&mut page, &mut rx).await;
        pump(&mut page, &mut rx).await;

        assert_eq!(api.fetch_count(), 2);
        assert_eq!(page.controller.latest_seq(), 2);
        assert_eq!(page.users()[0].email, "slow@b.com");
    }

    #[tokio::test]
    async fn test_double_submit_is_ignored_while_pending() {
        let api = Arc::new(FakeUsersApi::default());
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;

        let create = api.gate_mutation();
        type_email(&mut page, "a@b.com");
        assert!(page.submit_create());
        assert!(!page.submit_create());
        assert!(!page.submit_create());

        create.send(Ok(())).unwrap();
        pump(&mut page, &mut rx).await;
        // still pending until the follow-up fetch settles
        assert!(!page.submit_create());
        pump(&mut page, &mut rx).await;

        assert_eq!(api.mutation_count(), 1);
        assert_eq!(api.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_email_is_forwarded() {
        let api = Arc::new(FakeUsersApi::default());
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;

        assert!(page.submit_create());
        pump(&mut page, &mut rx).await;

        assert!(matches!(&api.calls()[1], Call::Create(u) if u.email.is_empty()));
    }

    #[tokio::test]
    async fn test_failed_create_reenables_form() {
        let api = Arc::new(FakeUsersApi::default());
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;

        api.fail_next_mutation("database down");
        type_email(&mut page, "a@b.com");
        assert!(page.submit_create());

        let status = pump(&mut page, &mut rx).await.unwrap();
        assert_eq!(status.status_type, StatusType::Error);
        assert!(status.message.contains("database down"));

        assert!(!page.form.is_pending());
        assert!(!page.form.email.is_disabled);
        assert_eq!(page.form.email.value, "a@b.com");
        assert_eq!(api.fetch_count(), 1);

        assert!(page.submit_create());
        pump(&mut page, &mut rx).await;
        pump(&mut page, &mut rx).await;
        assert_eq!(page.users().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_row_then_refetch() {
        let api = Arc::new(FakeUsersApi::with_users(vec![user("1", "a@b.com")]));
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;
        assert_eq!(page.list.state.selected(), Some(0));

        assert!(page.delete_selected());
        assert!(page.list.is_row_pending("1"));
        assert!(!page.delete_user("1"));

        let status = pump(&mut page, &mut rx).await.unwrap();
        assert!(status.message.contains("<a@b.com>"));
        assert!(page.list.is_row_pending("1"));

        pump(&mut page, &mut rx).await;
        assert!(page.users().is_empty());
        assert!(!page.list.is_row_pending("1"));
        assert_eq!(page.list.state.selected(), None);

        assert_eq!(
            api.calls(),
            vec![Call::Fetch, Call::Delete("1".to_string()), Call::Fetch]
        );
    }

    #[tokio::test]
    async fn test_failed_delete_reenables_row() {
        let api = Arc::new(FakeUsersApi::with_users(vec![user("1", "a@b.com")]));
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;

        api.fail_next_mutation("forbidden");
        assert!(page.delete_user("1"));
        let status = pump(&mut page, &mut rx).await.unwrap();

        assert_eq!(status.status_type, StatusType::Error);
        assert!(!page.list.is_row_pending("1"));
        assert_eq!(page.users().len(), 1);
        assert!(page.delete_user("1"));
    }

    #[tokio::test]
    async fn test_rows_pend_independently() {
        let api = Arc::new(FakeUsersApi::with_users(vec![
            user("1", "a@b.com"),
            user("2", "c@d.com"),
        ]));
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;

        let _hold = api.gate_mutation();
        assert!(page.delete_user("1"));
        assert!(!page.list.is_row_pending("2"));
        assert!(page.delete_user("2"));
        assert!(!page.form.is_pending());
    }

    #[tokio::test]
    async fn test_latest_refetch_wins() {
        let api = Arc::new(FakeUsersApi::default());
        let initial = api.gate_fetch();
        let second = api.gate_fetch();
        let third = api.gate_fetch();
        let (mut page, mut rx) = page_with(&api);

        page.refresh();
        page.refresh();
        assert!(page.controller.is_refreshing());

        third.send(Ok(vec![user("3", "third@x.com")])).unwrap();
        pump(&mut page, &mut rx).await;
        assert_eq!(page.users(), &[user("3", "third@x.com")]);
        assert!(!page.controller.is_refreshing());

        second.send(Ok(vec![user("2", "second@x.com")])).unwrap();
        initial.send(Ok(vec![user("1", "first@x.com")])).unwrap();
        pump(&mut page, &mut rx).await;
        pump(&mut page, &mut rx).await;

        assert_eq!(page.users(), &[user("3", "third@x.com")]);
        assert_eq!(api.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_previous_list_stays_while_refreshing() {
        let api = Arc::new(FakeUsersApi::with_users(vec![user("1", "a@b.com")]));
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;

        let refetch = api.gate_fetch();
        page.refresh();
        assert!(page.controller.is_refreshing());
        assert_eq!(page.users().len(), 1);

        refetch.send(Ok(Vec::new())).unwrap();
        pump(&mut page, &mut rx).await;
        assert!(page.users().is_empty());
    }

    #[tokio::test]
    async fn test_discarded_refresh_keeps_deleted_row_pending() {
        let api = Arc::new(FakeUsersApi::with_users(vec![user("1", "a@b.com")]));
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;

        let after_delete = api.gate_fetch();
        let manual = api.gate_fetch();
        assert!(page.delete_user("1"));
        pump(&mut page, &mut rx).await;
        page.refresh();

        after_delete.send(Ok(Vec::new())).unwrap();
        assert!(pump(&mut page, &mut rx).await.is_none());

        // the stale list is still shown, so the row must stay disabled
        assert_eq!(page.users(), &[user("1", "a@b.com")]);
        assert!(page.list.is_row_pending("1"));
        assert!(!page.delete_user("1"));

        manual.send(Ok(Vec::new())).unwrap();
        pump(&mut page, &mut rx).await;
        assert!(page.users().is_empty());
        assert!(!page.list.is_row_pending("1"));
        assert_eq!(
            api.calls(),
            vec![
                Call::Fetch,
                Call::Delete("1".to_string()),
                Call::Fetch,
                Call::Fetch
            ]
        );
    }

    #[tokio::test]
    async fn test_superseded_refresh_still_releases_form() {
        let api = Arc::new(FakeUsersApi::default());
        let (mut page, mut rx) = page_with(&api);
        pump(&mut page, &mut rx).await;

        let after_create = api.gate_fetch();
        let manual = api.gate_fetch();
        page.submit_create();
        pump(&mut page, &mut rx).await;
        page.refresh();

        manual.send(Ok(vec![user("9", "new@x.com")])).unwrap();
        pump(&mut page, &mut rx).await;
        assert!(!page.form.is_pending());

        after_create.send(Ok(Vec::new())).unwrap();
        pump(&mut page, &mut rx).await;
        assert_eq!(page.users().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_error_and_retry_recovers() {
        let api = Arc::new(FakeUsersApi::with_users(vec![user("1", "a@b.com")]));
        let failing = api.gate_fetch();
        let (mut page, mut rx) = page_with(&api);

        failing.send(Err(server_error("unavailable"))).unwrap();
        let status = pump(&mut page, &mut rx).await.unwrap();
        assert_eq!(status.status_type, StatusType::Error);
        assert!(matches!(page.controller.snapshot(), Snapshot::Failed(m) if m.contains("unavailable")));

        page.refresh();
        assert!(pump(&mut page, &mut rx).await.is_none());
        assert_eq!(page.users().len(), 1);
    }
}
