use std::sync::Arc;

use inflight_core::{ChatMessage, RoleTag, UserRole};
use tracing::debug;

use crate::error::ServiceResult;
use crate::store::RecordStore;

/// Append-only conversation log between roles
pub struct ChatService {
    store: Arc<dyn RecordStore>,
}

impl ChatService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn send(&self, sender: RoleTag, receiver: RoleTag, content: String) -> ServiceResult<()> {
        debug!(%sender, %receiver, "chat message");
        self.store.append_chat(ChatMessage {
            sender,
            receiver,
            content,
        })?;
        Ok(())
    }

    /// Messages exchanged between `a` and `b` in either direction, oldest
    /// first
    ///
    /// Each message keeps the role spelling its sender used.
    pub fn history(&self, a: UserRole, b: UserRole) -> ServiceResult<Vec<ChatMessage>> {
        Ok(self.store.chat_between(a, b)?)
    }
}
