//! Users Terminal User Interface (TUI)
//!
//! A single page that lists users from the remote service, adds users by
//! email and deletes them, refetching the list after every change.

pub mod app;
pub mod components;
pub mod create_form;
pub mod events;
pub mod page;
pub mod pending;
pub mod ui;
pub mod users_list;

pub use app::App;
pub use events::AppEvent;
pub use page::{Focus, PageController, Snapshot, UsersPage};
