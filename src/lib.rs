pub mod bridge;
pub mod commands;
pub mod config;
pub mod core;
pub mod observability;
pub mod spectral;
