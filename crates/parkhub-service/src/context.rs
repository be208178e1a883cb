//! Identity of the actor behind the current action.

use parkhub_core::types::id::ActorId;

/// Characters stripped from display names so they can be embedded in
/// markup-formatted messages.
const MARKUP_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Who is acting, as reported by the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    /// Platform identity.
    pub actor_id: ActorId,
    /// Full name, when the platform knows it.
    pub full_name: Option<String>,
    /// Handle, when the platform knows it.
    pub username: Option<String>,
}

impl ActorContext {
    /// Context for an actor with only an id.
    pub fn new(actor_id: impl Into<ActorId>) -> Self {
        Self {
            actor_id: actor_id.into(),
            full_name: None,
            username: None,
        }
    }

    /// Set the full name.
    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    /// Set the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Name to show for this actor: full name, else username, else id,
    /// with markup characters removed.
    pub fn display_name(&self) -> String {
        [self.full_name.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .map(sanitize)
            .find(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.actor_id.to_string())
    }
}

/// Remove markup characters from `name`.
pub fn sanitize(name: &str) -> String {
    name.chars().filter(|c| !MARKUP_CHARS.contains(c)).collect()
}
