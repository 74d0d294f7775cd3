//! CLI command implementations

pub mod auth;
pub mod client;
pub mod completions;
pub mod init;
pub mod order;
pub mod report;
