pub mod http;
pub mod symbol;

pub use http::HttpCandleProvider;
pub use symbol::provider_symbol;
