//! Shared application state.

use bistro_db::Database;

/// State handed to every handler. Cheap to clone; the pool inside
/// `Database` is reference-counted.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
