pub mod autostart;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod notifier;
pub mod protocol;
pub mod service;
pub mod socket;
