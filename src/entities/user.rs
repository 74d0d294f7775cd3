//! Authenticated user profile

use serde::{Deserialize, Serialize};

/// Profile of the signed-in agent, as persisted under the `user` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,

    /// Display name
    pub name: String,

    pub email: String,

    /// Free-form role string from the gateway ("OPERARIO", "ADMIN", ...)
    pub role: String,
}
