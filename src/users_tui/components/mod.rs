//! Reusable UI components for the users TUI

pub mod form_field;
pub mod status_display;

pub use form_field::FormField;
pub use status_display::{StatusDisplay, StatusMessage, StatusType};
