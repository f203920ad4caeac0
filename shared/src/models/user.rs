//! Signed-in user identity

use serde::{Deserialize, Serialize};

/// Identity supplied by the authentication provider.
///
/// Passed explicitly to every per-user operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserContext {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }

    /// A context with an empty uid is a signed-out placeholder
    pub fn is_authenticated(&self) -> bool {
        !self.uid.trim().is_empty()
    }
}
