//! Per-connection session state machine: auth, role selection, actions.
//!
//! A session moves through three phases: awaiting auth, awaiting role
//! selection (new actors only), and active. Ingress is untrusted -- any
//! frame that does not fit the current phase or fails to parse is
//! silently dropped. World mutation happens only through the control and
//! action queues; the session never touches the world directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use veldt_core::{ControlReply, ControlRequest, EngineShared};
use veldt_types::{ActorId, ClientMessage, Role, ServerMessage};

use crate::registry::ConnectionRegistry;

/// How long a session waits for the tick loop to answer a control
/// request. Controls are processed at the next tick, so anything beyond
/// a few tick intervals means the engine is wedged.
const CONTROL_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// The phase a session is in.
#[derive(Debug)]
enum Phase {
    /// Waiting for an `auth` message.
    AwaitingAuth,
    /// Authenticated as a new name; waiting for `select_role`.
    AwaitingRole {
        /// The authenticated name.
        name: String,
        /// The actor id reserved for it.
        actor_id: ActorId,
    },
    /// Fully joined; actions flow to the queue.
    Active {
        /// The bound actor.
        actor_id: ActorId,
    },
}

/// One client connection's session.
#[derive(Debug)]
pub struct Session {
    registry: Arc<ConnectionRegistry>,
    shared: Arc<EngineShared>,
    outbound: mpsc::UnboundedSender<ServerMessage>,
    phase: Phase,
}

impl Session {
    /// Create a session in the awaiting-auth phase.
    pub const fn new(
        registry: Arc<ConnectionRegistry>,
        shared: Arc<EngineShared>,
        outbound: mpsc::UnboundedSender<ServerMessage>,
    ) -> Self {
        Self {
            registry,
            shared,
            outbound,
            phase: Phase::AwaitingAuth,
        }
    }

    /// The actor bound to this session, once active.
    pub const fn actor_id(&self) -> Option<ActorId> {
        match self.phase {
            Phase::Active { actor_id } => Some(actor_id),
            Phase::AwaitingAuth | Phase::AwaitingRole { .. } => None,
        }
    }

    /// Handle one inbound text frame.
    pub async fn on_text(&mut self, text: &str) {
        // Malformed JSON is dropped without a response.
        let Ok(payload) = serde_json::from_str::<serde_json::Value>(text) else {
            tracing::trace!("Dropped non-JSON frame");
            return;
        };
        let kind = payload.get("type").and_then(|value| value.as_str());
        match kind {
            Some("ping") => {
                self.send(ServerMessage::Pong {
                    server_tick: self.shared.tick(),
                });
            }
            Some("auth") => self.on_auth(&payload).await,
            Some("select_role") => self.on_select_role(&payload).await,
            Some("action") => self.on_action(&payload),
            _ => {
                tracing::trace!(?kind, "Dropped frame with unknown type");
            }
        }
    }

    /// Handle an `auth` frame.
    async fn on_auth(&mut self, payload: &serde_json::Value) {
        if !matches!(self.phase, Phase::AwaitingAuth) {
            return;
        }
        let Ok(ClientMessage::Auth { name, token }) =
            serde_json::from_value::<ClientMessage>(payload.clone())
        else {
            return;
        };
        if name.trim().is_empty() {
            self.send(ServerMessage::AuthError {
                reason: "Name cannot be empty".to_owned(),
            });
            return;
        }
        if !self.registry.token_matches(&name, token.as_deref()) {
            self.send(ServerMessage::AuthError {
                reason: "Invalid token".to_owned(),
            });
            return;
        }

        let Some(reply) = self
            .control_round_trip(|reply| ControlRequest::Reserve {
                name: name.clone(),
                reply,
            })
            .await
        else {
            self.send(ServerMessage::AuthError {
                reason: "Server busy".to_owned(),
            });
            return;
        };

        match reply {
            ControlReply::Reserved { actor_id } => {
                let token = self.registry.issue_token(&name);
                self.send(ServerMessage::AuthSuccess {
                    agent_id: actor_id,
                    token: Some(token),
                });
                self.send(ServerMessage::RolePrompt {
                    available_roles: vec![Role::Merchant, Role::Fighter, Role::Monster],
                });
                self.phase = Phase::AwaitingRole { name, actor_id };
            }
            ControlReply::Resumed {
                actor_id,
                role,
                position,
            } => {
                self.registry.register(actor_id, self.outbound.clone());
                let token = self.registry.issue_token(&name);
                self.send(ServerMessage::AuthSuccess {
                    agent_id: actor_id,
                    token: Some(token),
                });
                self.send(ServerMessage::RoleConfirmed {
                    role,
                    agent_id: actor_id,
                    spawn_position: position,
                });
                self.phase = Phase::Active { actor_id };
            }
            ControlReply::NameTaken => {
                self.send(ServerMessage::AuthError {
                    reason: "Name already in use".to_owned(),
                });
            }
            ControlReply::Joined { .. } => {
                tracing::warn!("Unexpected join reply to a reserve request");
            }
        }
    }

    /// Handle a `select_role` frame.
    async fn on_select_role(&mut self, payload: &serde_json::Value) {
        let Phase::AwaitingRole { name, actor_id } = &self.phase else {
            return;
        };
        let name = name.clone();
        let actor_id = *actor_id;
        let Ok(ClientMessage::SelectRole { role }) =
            serde_json::from_value::<ClientMessage>(payload.clone())
        else {
            return;
        };

        let Some(reply) = self
            .control_round_trip(|reply| ControlRequest::Join {
                actor_id,
                name: name.clone(),
                role,
                reply,
            })
            .await
        else {
            self.send(ServerMessage::AuthError {
                reason: "Server busy".to_owned(),
            });
            return;
        };

        match reply {
            ControlReply::Joined {
                actor_id,
                role,
                spawn_position,
            }
            | ControlReply::Resumed {
                actor_id,
                role,
                position: spawn_position,
            } => {
                self.registry.register(actor_id, self.outbound.clone());
                self.send(ServerMessage::RoleConfirmed {
                    role,
                    agent_id: actor_id,
                    spawn_position,
                });
                self.phase = Phase::Active { actor_id };
            }
            ControlReply::NameTaken => {
                self.send(ServerMessage::AuthError {
                    reason: "Name already in use".to_owned(),
                });
                self.phase = Phase::AwaitingAuth;
            }
            ControlReply::Reserved { .. } => {
                tracing::warn!("Unexpected reserve reply to a join request");
            }
        }
    }

    /// Forward an action frame to the queue. The queue does the parsing
    /// and silently drops whatever does not narrow.
    fn on_action(&self, payload: &serde_json::Value) {
        let Phase::Active { actor_id } = self.phase else {
            return;
        };
        let _ = self.shared.actions.enqueue_payload(actor_id, payload);
    }

    /// Tear the session down on socket close.
    pub fn on_disconnect(&mut self) {
        if let Phase::Active { actor_id } = self.phase {
            self.registry.unregister(actor_id);
            self.shared
                .controls
                .push(ControlRequest::Disconnect { actor_id });
        }
    }

    /// Push a control request and await the tick loop's reply.
    async fn control_round_trip(
        &self,
        make: impl FnOnce(oneshot::Sender<ControlReply>) -> ControlRequest,
    ) -> Option<ControlReply> {
        let (tx, rx) = oneshot::channel();
        self.shared.controls.push(make(tx));
        match tokio::time::timeout(CONTROL_REPLY_TIMEOUT, rx).await {
            Ok(Ok(reply)) => Some(reply),
            Ok(Err(_)) | Err(_) => None,
        }
    }

    /// Queue a message onto this connection's serialized outbound stream.
    fn send(&self, message: ServerMessage) {
        let _ = self.outbound.send(message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use veldt_world::WorldState;

    use super::*;

    /// Drive the tick loop in the background so control round-trips get
    /// answered, the way the real runner does.
    fn spawn_engine(shared: Arc<EngineShared>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut world = WorldState::new(42);
            loop {
                tokio::time::sleep(Duration::from_millis(5)).await;
                let controls = shared.controls.drain();
                let actions = shared.actions.drain();
                let _ = veldt_core::run_tick(&mut world, controls, actions);
                world.clear_tick_buffers();
            }
        })
    }

    fn make_session() -> (
        Session,
        mpsc::UnboundedReceiver<ServerMessage>,
        tokio::task::JoinHandle<()>,
    ) {
        let shared = Arc::new(EngineShared::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let engine = spawn_engine(Arc::clone(&shared));
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(registry, shared, tx), rx, engine)
    }

    #[tokio::test]
    async fn new_actor_walks_the_full_handshake() {
        let (mut session, mut rx, engine) = make_session();

        session.on_text(r#"{"type":"auth","name":"Wren"}"#).await;
        let first = rx.recv().await.unwrap();
        let token = match first {
            ServerMessage::AuthSuccess { token, .. } => token.unwrap(),
            other => panic!("expected auth_success, got {other:?}"),
        };
        assert!(!token.is_empty());
        assert!(matches!(
            rx.recv().await.unwrap(),
            ServerMessage::RolePrompt { .. }
        ));

        session
            .on_text(r#"{"type":"select_role","role":"merchant"}"#)
            .await;
        match rx.recv().await.unwrap() {
            ServerMessage::RoleConfirmed {
                role,
                spawn_position,
                ..
            } => {
                assert_eq!(role, Role::Merchant);
                assert!((spawn_position.x - 500.0).abs() < 1e-9);
            }
            other => panic!("expected role_confirmed, got {other:?}"),
        }
        assert!(session.actor_id().is_some());
        engine.abort();
    }

    #[tokio::test]
    async fn actions_before_auth_are_dropped() {
        let (mut session, mut rx, engine) = make_session();
        session
            .on_text(r#"{"type":"action","action":"idle","tick":1}"#)
            .await;
        assert!(rx.try_recv().is_err());
        assert!(session.actor_id().is_none());
        engine.abort();
    }

    #[tokio::test]
    async fn ping_answers_with_the_server_tick() {
        let (mut session, mut rx, engine) = make_session();
        session.on_text(r#"{"type":"ping"}"#).await;
        assert!(matches!(
            rx.recv().await.unwrap(),
            ServerMessage::Pong { .. }
        ));
        engine.abort();
    }

    #[tokio::test]
    async fn garbage_frames_are_silently_dropped() {
        let (mut session, mut rx, engine) = make_session();
        session.on_text("not json at all").await;
        session.on_text(r#"{"type":"mystery"}"#).await;
        assert!(rx.try_recv().is_err());
        engine.abort();
    }
}
