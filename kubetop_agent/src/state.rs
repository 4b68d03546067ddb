//! Shared agent state handed to every HTTP/websocket handler.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crate::bus::Bus;

#[derive(Clone)]
pub struct AppState {
    pub bus: Arc<Bus>,
    // Connected websocket subscribers across all topics
    pub client_count: Arc<AtomicUsize>,
    pub auth_token: Option<String>,
}

impl AppState {
    pub fn new(bus: Arc<Bus>, auth_token: Option<String>) -> Self {
        Self {
            bus,
            client_count: Arc::new(AtomicUsize::new(0)),
            auth_token,
        }
    }
}
