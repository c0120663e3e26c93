pub mod config;
pub mod error;
pub mod payload;
pub mod security;
pub mod server;
pub mod store;
pub mod verifier;
