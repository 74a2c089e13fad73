use std::sync::Arc;

use crate::auth::Actor;
use crate::receipt::ReceiptIssuanceFlow;
use crate::session::{SessionScope, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<ReceiptIssuanceFlow>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(flow: ReceiptIssuanceFlow, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            flow: Arc::new(flow),
            sessions,
        }
    }

    /// Session handle for the actor's login session.
    pub fn session_for(&self, actor: &Actor) -> SessionScope {
        SessionScope::new(actor.session_id.clone(), self.sessions.clone())
    }
}
