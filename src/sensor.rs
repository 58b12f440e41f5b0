mod config;
mod reading;
mod registry;
mod status;
mod store;

pub use config::*;
pub use reading::*;
pub use registry::*;
pub use status::*;
pub use store::*;
