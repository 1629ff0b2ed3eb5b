//! Typed access to the external PadelUp booking service.

pub mod account;
pub mod config;
pub mod gateway;
pub mod http;
pub mod records;
pub mod session;

pub mod mock;

use std::sync::Arc;

use eyre::Result;

pub use account::SessionClient;
pub use config::ClientConfig;
pub use gateway::PadelApi;
pub use http::HttpPadelApi;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};

/// Builds the HTTP-backed service handle from configuration.
pub fn connect(config: ClientConfig) -> Result<Arc<dyn PadelApi>> {
    Ok(Arc::new(HttpPadelApi::new(config)?))
}

/// The session store named by the configuration: a JSON file when
/// `session_file` is set, memory otherwise.
pub fn session_store(config: &ClientConfig) -> Box<dyn SessionStore> {
    match &config.session_file {
        Some(path) => Box::new(FileSessionStore::new(path.clone())),
        None => Box::new(MemorySessionStore::new()),
    }
}

