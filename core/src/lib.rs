pub mod cache_manager;
pub mod config;
pub mod crypto;
pub mod error;
pub mod facade;
pub mod models;
pub mod oauth_orchestrator;
pub mod state_manager;
pub mod store;
pub mod token_service;

pub use cache_manager::CacheManager;
pub use config::Config;
pub use crypto::Crypto;
pub use error::{CoreError, Result};
pub use facade::{AuthStatus, AuthenticatedUser, MessageStream, RpcFacade};
pub use oauth_orchestrator::OAuthOrchestrator;
pub use state_manager::StateManager;
pub use store::Store;
pub use token_service::TokenService;

pub use gateway;
pub use rest;

pub mod transport;
