use std::sync::Arc;

use podcastai_core::{Config, PodcastOrchestrator};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PodcastOrchestrator>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(orchestrator: PodcastOrchestrator, config: Arc<Config>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config,
        }
    }
}
