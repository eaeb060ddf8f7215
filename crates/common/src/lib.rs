pub mod config;
pub mod error;
pub mod provider;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use provider::CandleProvider;
pub use store::RecommendationStore;
pub use types::*;
