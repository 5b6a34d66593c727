pub mod config;
pub mod error;
pub mod price;
pub mod types;

pub use config::Config;
pub use error::RivalScopeError;
pub use price::*;
pub use types::*;
