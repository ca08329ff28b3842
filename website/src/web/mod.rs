pub mod error;
pub mod health;
pub mod index;
pub mod logs;
pub mod response;
pub mod routes;
pub mod runs;
pub mod security_headers;
pub mod tokens;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub use error::*;
pub use health::*;
pub use index::*;
pub use logs::*;
pub use response::*;
pub use routes::*;
pub use runs::*;
pub use tokens::*;
