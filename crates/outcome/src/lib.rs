pub mod classifier;
pub mod runner;

pub use classifier::{classify, EXPIRY_DAYS};
pub use runner::{EvaluationRunner, RunnerConfig, MAX_BATCH_SIZE};
