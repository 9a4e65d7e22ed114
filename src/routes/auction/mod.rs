mod handler;
pub mod model;

pub use handler::{search_history, search_items};
pub use model::CatalogClient;
