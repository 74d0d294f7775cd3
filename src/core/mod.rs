//! Core module - storage, registries, queries and the auth session

pub mod auth;
pub mod config;
pub mod entity;
pub mod identity;
pub mod project;
pub mod query;
pub mod registry;
pub mod report;
pub mod seed;
pub mod store;
pub mod validation;

pub use auth::{AuthError, AuthGateway, HttpAuthGateway, PayloadError, Session, SessionError};
pub use config::Config;
pub use entity::Record;
pub use identity::{OrderNumber, OrderNumberError};
pub use project::{Project, ProjectError};
pub use query::{OrderFilter, OrderPage, OrderQuery, PageInfo, PAGE_SIZE};
pub use registry::{ClientRegistry, RegistryError, WorkOrderRegistry};
pub use store::{EntityStore, FileBackend, KeyValueBackend, MemoryBackend, StoreError};
pub use validation::{FormError, ValidationResult};
