use std::sync::Arc;

use {
    parlo_core::DeliverySender, parlo_orchestrator::Orchestrator, parlo_whatsapp::WhatsAppConfig,
};

/// Shared handler state.
///
/// The sender is held separately from the orchestrator so the passthrough
/// send endpoint can reach it without going through event classification.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub sender: Arc<dyn DeliverySender>,
    pub whatsapp: Arc<WhatsAppConfig>,
}
