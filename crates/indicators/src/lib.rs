pub mod engine;
pub mod series;

pub use engine::compute_indicators;
