// Client library for the Gamechanger team-manager REST API.

mod client;
pub mod config;
mod error;
pub mod models;

pub use client::GameChangerClient;
pub use config::Credentials;
pub use error::ApiError;
