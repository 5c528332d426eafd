//! Event handling for the users TUI

use crate::api::ApiError;
use crate::models::User;

/// Results of background work, delivered back to the UI task
#[derive(Debug)]
pub enum AppEvent {
    /// A list fetch finished; `seq` identifies which one
    UsersFetched {
        seq: u64,
        result: Result<Vec<User>, ApiError>,
    },
    /// A create call settled
    UserCreated {
        email: String,
        result: Result<(), ApiError>,
    },
    /// A delete call settled
    UserDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
}
