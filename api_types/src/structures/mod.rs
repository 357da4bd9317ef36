pub mod channel;
pub mod gateway;
pub mod guild;
pub mod message;
pub mod oauth;
pub mod user;

mod traits;

pub use channel::*;
pub use gateway::*;
pub use guild::*;
pub use message::*;
pub use oauth::*;
pub use user::*;
