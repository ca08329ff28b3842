pub mod forms;
pub mod params;
pub mod template;

pub use forms::*;
pub use params::*;
pub use template::*;
