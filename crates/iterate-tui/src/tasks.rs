//! Runs queued backend requests off the UI thread.

use crate::app::{App, BackendResponse};
use iterate_bridge::JournalBackend;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// In-flight backend calls for one app.
pub struct BackendTasks {
    backend: Arc<dyn JournalBackend>,
    handles: Vec<JoinHandle<BackendResponse>>,
}

impl BackendTasks {
    pub fn new(backend: Arc<dyn JournalBackend>) -> Self {
        Self {
            backend,
            handles: Vec::new(),
        }
    }

    /// Spawn everything the app has queued.
    pub fn spawn_pending(&mut self, app: &mut App) {
        while let Some(request) = app.take_request() {
            debug!(command = request.name(), "dispatching backend request");
            let backend = Arc::clone(&self.backend);
            self.handles
                .push(tokio::spawn(async move { request.dispatch(backend).await }));
        }
    }

    /// Feed finished calls back into the app without blocking.
    pub async fn collect_finished(&mut self, app: &mut App) {
        let mut completed = Vec::new();
        for (i, handle) in self.handles.iter().enumerate() {
            if handle.is_finished() {
                completed.push(i);
            }
        }
        for i in completed.into_iter().rev() {
            match self.handles.remove(i).await {
                Ok(response) => app.handle_response(response),
                Err(e) => error!(error = %e, "backend task failed"),
            }
        }
    }

    /// Number of calls still in flight.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Abort whatever is still running.
    pub fn abort_all(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Route;
    use crate::event::Action;
    use crate::test_utils::create_test_app;
    use iterate_bridge::ScriptedBackend;
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawn_and_collect() {
        let backend = Arc::new(ScriptedBackend::new().with_journal_path("/j/a.db"));
        let mut tasks = BackendTasks::new(backend);
        let mut app = create_test_app();

        app.handle_action(Action::OpenJournal);
        tasks.spawn_pending(&mut app);
        assert_eq!(tasks.len(), 1);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while !tasks.is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
            tasks.collect_finished(&mut app).await;
        }

        assert!(tasks.is_empty());
        assert_eq!(app.route, Route::UnlockJournal);
        assert_eq!(app.selected_journal.as_deref(), Some("/j/a.db"));
    }
}
