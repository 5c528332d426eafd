//! userdesk: terminal client for a remote user-management service

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod users_tui;
