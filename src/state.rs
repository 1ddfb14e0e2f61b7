use taglist_backend::store::DocumentStore;

/// Shared application state / 共享应用状态
///
/// The store carries its own locking, so handlers share a plain
/// `Arc<AppState>` with no outer lock.
pub struct AppState {
    pub store: DocumentStore,
}
