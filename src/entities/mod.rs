//! Entity type definitions
//!
//! - [`Client`] - Subscribers registered by agents
//! - [`WorkOrder`] - Service orders opened against a client
//! - [`UserProfile`] - The authenticated agent

pub mod client;
pub mod user;
pub mod work_order;

pub use client::{Client, ClientDraft};
pub use user::UserProfile;
pub use work_order::{Activity, NewWorkOrder, OrderChange, OrderStatus, Priority, WorkOrder};
