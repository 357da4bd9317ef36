pub mod discord_client;
pub mod error;
pub mod rate_limiter;
pub mod request_manager;

pub use discord_client::*;
pub use error::*;
pub use rate_limiter::*;
pub use request_manager::*;

pub use api_types;
pub use reqwest;
pub use reqwest::Method;

pub type Result<T> = core::result::Result<T, RestError>;
