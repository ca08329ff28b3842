pub mod health;
pub mod logs;
pub mod runs;
pub mod token;
pub mod tokens;
