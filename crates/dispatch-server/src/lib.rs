pub mod error;
pub mod handlers;
pub mod logging;
pub mod scheduler;
pub mod server;
pub mod state;
pub mod store;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use error::ServerError;
pub use server::{app_config, run_server};
pub use state::AppState;
pub use store::{AgentRecord, AgentStore, StoreError};
