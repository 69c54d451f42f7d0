pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod stats;

use config::Config;
use db::Database;

/// Shared per-process state handed to every request handler.
pub struct AppState {
    pub db: Database,
    pub config: Config,
}
