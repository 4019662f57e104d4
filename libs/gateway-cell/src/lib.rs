pub mod client;
pub mod token;

pub use client::{ApiGateway, AvatarResponse};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
