/// Typing presence: debounced local signal, polled remote status.
/// Best-effort throughout; failures are logged and never block messaging.
use crate::session::Session;
use crate::transport::ChatTransport;
use crate::utils::debounce::Debouncer;
use crate::view::ChatView;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct TypingCoordinator {
    transport: Arc<dyn ChatTransport>,
    view: Arc<dyn ChatView>,
    session: Arc<Session>,
    is_typing: Arc<AtomicBool>,
    debouncer: Debouncer,
}

impl TypingCoordinator {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        view: Arc<dyn ChatView>,
        session: Arc<Session>,
        debounce: Duration,
    ) -> Self {
        Self {
            transport,
            view,
            session,
            is_typing: Arc::new(AtomicBool::new(false)),
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Input event from the composer. The first keystroke emits the start
    /// signal immediately; the trailing debounce emits the stop signal, and
    /// every further keystroke pushes the deadline out.
    pub async fn notify_input(&self) {
        let (peer_id, _generation) = match self.session.dispatch_tag().await {
            Some(tag) => tag,
            None => return,
        };

        if !self.is_typing.swap(true, Ordering::SeqCst) {
            let transport = self.transport.clone();
            let peer = peer_id.clone();
            tokio::spawn(async move {
                if let Err(e) = transport.emit_typing(&peer, true).await {
                    debug!("typing start emit to {} failed: {}", peer, e);
                }
            });
        }

        let transport = self.transport.clone();
        let is_typing = self.is_typing.clone();
        self.debouncer.call(async move {
            is_typing.store(false, Ordering::SeqCst);
            if let Err(e) = transport.emit_typing(&peer_id, false).await {
                debug!("typing stop emit to {} failed: {}", peer_id, e);
            }
        });
    }

    /// Remote observation, driven by the synchronizer tick. Stateless and
    /// idempotent per call; stale arrivals are dropped by generation.
    pub async fn query_tick(&self) {
        let (peer_id, generation) = match self.session.dispatch_tag().await {
            Some(tag) => tag,
            None => return,
        };
        match self.transport.typing_status(&peer_id).await {
            Ok(status) => {
                if self.session.generation().await != generation {
                    return;
                }
                self.view.typing_indicator(&peer_id, status.is_typing);
            }
            Err(e) => debug!("typing status query for {} failed: {}", peer_id, e),
        }
    }

    /// Conversation switch: forget local state, drop any scheduled stop
    /// signal. Remote status is never cached across switches.
    pub fn reset(&self) {
        self.debouncer.cancel();
        self.is_typing.store(false, Ordering::SeqCst);
    }
}
