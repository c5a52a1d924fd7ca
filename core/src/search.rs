/// Debounced peer-directory search feeding the new-conversation picker.
use crate::transport::ChatTransport;
use crate::utils::debounce::Debouncer;
use crate::view::ChatView;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub struct UserSearch {
    transport: Arc<dyn ChatTransport>,
    view: Arc<dyn ChatView>,
    debouncer: Debouncer,
    min_len: usize,
}

impl UserSearch {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        view: Arc<dyn ChatView>,
        debounce: Duration,
        min_len: usize,
    ) -> Self {
        Self {
            transport,
            view,
            debouncer: Debouncer::new(debounce),
            min_len,
        }
    }

    /// Input event from the search box. Queries below the minimum length
    /// reset the result list without touching the network.
    pub fn input(&self, query: &str) {
        let query = query.trim().to_string();
        if query.chars().count() < self.min_len {
            self.debouncer.cancel();
            self.view.search_results(&[]);
            return;
        }
        let transport = self.transport.clone();
        let view = self.view.clone();
        self.debouncer.call(async move {
            match transport.search_users(&query).await {
                Ok(users) => view.search_results(&users),
                Err(e) => warn!("user search for {:?} failed: {}", query, e),
            }
        });
    }
}
