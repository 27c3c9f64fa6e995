//! Application state.

use std::sync::Arc;

use rxboard_core::announce::Announcer;
use rxboard_core::{Broadcaster, LookupService};

/// State of the display board application.
#[derive(Clone)]
pub struct DisplayState {
    pub broadcaster: Arc<Broadcaster>,
    /// Text-to-speech for `/play-sound`; disabled when `None`.
    pub announcer: Option<Arc<Announcer>>,
}

impl DisplayState {
    pub fn new(broadcaster: Arc<Broadcaster>, announcer: Option<Announcer>) -> Self {
        Self {
            broadcaster,
            announcer: announcer.map(Arc::new),
        }
    }
}

/// State of the lookup application. Shares nothing with the display board.
#[derive(Clone)]
pub struct LookupState {
    pub lookup: Arc<LookupService>,
}

impl LookupState {
    pub fn new(lookup: LookupService) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }
}
