use std::sync::Arc;

use config::Config;
use gateway::ChatGateway;
use party::registry::SharedRegistry;
use routes::auction::CatalogClient;

pub mod common;
pub mod config;
pub mod error;
pub mod gateway;
pub mod party;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    /// All live party state; the only shared mutable resource.
    pub registry: SharedRegistry,
    pub gateway: Arc<dyn ChatGateway>,
    pub catalog: CatalogClient,
    pub config: Config,
}
