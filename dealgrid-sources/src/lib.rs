pub mod amazon;
pub mod dummyjson;
pub mod ebay;
pub mod price;
pub mod registry;

pub use registry::{SourceClient, SourceRegistry};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Could not refresh OAuth token: {0}")]
    Auth(String),
}
