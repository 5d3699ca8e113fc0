//! Connection registry: outbound senders and session tokens.
//!
//! Each connection gets one unbounded channel; a dedicated writer task
//! drains it onto the socket, so every connection's outbound stream is
//! serialized. The registry is the engine's [`OutboundSink`]: broadcast
//! fan-out is a map lookup and a channel send, never socket I/O on the
//! tick path.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;
use veldt_core::OutboundSink;
use veldt_types::{ActorId, ServerMessage};

/// Registry state behind one lock.
#[derive(Debug, Default)]
struct RegistryInner {
    /// Live outbound channels, keyed by actor.
    senders: BTreeMap<ActorId, mpsc::UnboundedSender<ServerMessage>>,
    /// Session tokens, keyed by actor name. Issued once per name and kept
    /// for the life of the process.
    tokens: BTreeMap<String, String>,
}

/// Shared connection registry.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: Mutex<RegistryInner>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an actor to an outbound channel, replacing any stale one.
    pub fn register(&self, actor: ActorId, sender: mpsc::UnboundedSender<ServerMessage>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.senders.insert(actor, sender);
    }

    /// Drop an actor's outbound channel.
    pub fn unregister(&self, actor: ActorId) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.senders.remove(&actor);
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .senders
            .len()
    }

    /// Check a presented token against the stored one for a name.
    ///
    /// A name with no stored token accepts anything (first auth); a
    /// stored token requires an exact match.
    pub fn token_matches(&self, name: &str, presented: Option<&str>) -> bool {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match inner.tokens.get(name) {
            None => true,
            Some(stored) => presented == Some(stored.as_str()),
        }
    }

    /// Return the token for a name, issuing a fresh one on first use.
    pub fn issue_token(&self, name: &str) -> String {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .tokens
            .entry(name.to_owned())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }
}

impl OutboundSink for ConnectionRegistry {
    fn send(&self, actor: ActorId, message: ServerMessage) {
        let sender = {
            let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.senders.get(&actor).cloned()
        };
        if let Some(sender) = sender {
            // A closed channel just means the client is gone; the
            // disconnect control will clean up shortly.
            let _ = sender.send(message);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn send_reaches_registered_actor_only() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let actor = ActorId::from_raw(1);
        registry.register(actor, tx);

        registry.send(actor, ServerMessage::AuthPrompt);
        registry.send(ActorId::from_raw(2), ServerMessage::AuthPrompt);

        assert!(matches!(rx.try_recv(), Ok(ServerMessage::AuthPrompt)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unregister_stops_delivery() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let actor = ActorId::from_raw(1);
        registry.register(actor, tx);
        registry.unregister(actor);
        registry.send(actor, ServerMessage::AuthPrompt);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn tokens_are_sticky_per_name() {
        let registry = ConnectionRegistry::new();
        assert!(registry.token_matches("Wren", None));
        let token = registry.issue_token("Wren");
        assert_eq!(registry.issue_token("Wren"), token);
        assert!(registry.token_matches("Wren", Some(&token)));
        assert!(!registry.token_matches("Wren", None));
        assert!(!registry.token_matches("Wren", Some("wrong")));
    }
}
