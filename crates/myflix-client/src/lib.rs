pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod models;
pub mod normalize;
pub mod session;
pub mod validation;

pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use session::SessionStore;
