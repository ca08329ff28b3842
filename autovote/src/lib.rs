pub mod batch;
pub mod error;
pub mod log_sink;
pub mod scheduler;
pub mod token_store;
pub mod utils;
pub mod validators;
pub mod vote;

pub use error::{Error, Result};
