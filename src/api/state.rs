use derive_new::new;

use crate::store::VideoStore;

/// Shared state handed to every request handler.
#[derive(Debug, Clone, new)]
pub struct App {
    pub store: VideoStore,
}

impl App {
    pub fn store(&self) -> &VideoStore {
        &self.store
    }
}
