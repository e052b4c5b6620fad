//! Postal relay adapter

mod client;
mod config;
mod wire;

pub use client::PostalClient;
pub use config::PostalConfig;
