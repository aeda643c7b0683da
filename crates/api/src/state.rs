use crate::auth::AuthService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the service only holds an `Arc` and its fixed config.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
}
