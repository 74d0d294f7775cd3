//! Telconova: client and work order management for telecom field agents
//!
//! Clients and work orders live as JSON documents in a project-local store
//! (`.telconova/store/`). Agents authenticate against a remote gateway; all
//! other operations are local.

pub mod cli;
pub mod core;
pub mod entities;
