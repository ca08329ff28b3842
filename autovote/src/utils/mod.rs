mod datetime;
mod id;
mod truncate;

pub use datetime::*;
pub use id::*;
pub use truncate::*;
