//! Record trait - common interface for stored entity collections

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// A record type persisted as one list under a fixed store key
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Store key holding the full list of this record type
    const KEY: &'static str;

    /// Unique identifier within the collection
    fn id(&self) -> &str;

    /// Refresh the modification timestamp
    fn touch(&mut self, now: DateTime<Utc>);
}
