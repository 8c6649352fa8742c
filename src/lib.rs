//! Provision a runnable Minecraft server.
//!
//! A run fetches the release catalog, lets the operator pick a stable
//! release, downloads its server, launches it once (tuned flags first,
//! minimal flags as fallback), accepts the EULA and writes a launch script
//! for the flag set that worked.

pub mod config;
pub mod error;
pub mod meta;
pub mod models;
pub mod provision;
pub mod ui;
