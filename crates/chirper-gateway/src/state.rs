use std::sync::Arc;

use chirper_core::ChirpRepository;

#[derive(Clone)]
pub struct AppState {
    chirps: Arc<dyn ChirpRepository>,
}

impl AppState {
    pub fn new(chirps: Arc<dyn ChirpRepository>) -> Self {
        Self { chirps }
    }

    pub fn chirps(&self) -> &dyn ChirpRepository {
        self.chirps.as_ref()
    }
}
