//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use neurolab_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: String,
    /// Whether the user may access the admin console.
    pub is_staff: bool,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
