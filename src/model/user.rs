use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Identity of the person authoring reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// The single signed-in user. There is no sign-in flow, so every review
/// is written under this identity.
pub static CURRENT_USER: Lazy<CurrentUser> =
    Lazy::new(|| CurrentUser::new("1", "Demo User", "demo@example.com"));
