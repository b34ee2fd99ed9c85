use std::sync::Arc;

use nimbus_dryrun::Transport;
use nimbus_reconciler::{FileObjectStore, ReconcilerConfig};

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ReconcilerConfig>,
    pub store: Arc<FileObjectStore>,
    /// Real upstream transport. Dry runs wrap it; real passes use it as is.
    pub transport: Arc<dyn Transport>,
}
